#![no_main]
use libfuzzer_sys::fuzz_target;
use nexuslite_paginate::{AggregateOptions, MemoryStore};

fuzz_target!(|data: &[u8]| {
    if data.len() > 8192 { return; }
    let Ok(s) = std::str::from_utf8(data) else { return };
    let Ok(stages) = nexuslite_paginate::utils::json::parse_json_to_stages(s) else { return };
    let store = MemoryStore::with_docs(vec![
        bson::doc! { "a": 1, "b": "x", "c": { "d": [1, 2] } },
        bson::doc! { "a": 2.5, "b": null },
        bson::doc! {},
    ])
    .with_stage_limit(2);
    let _ = store.run(&stages, &AggregateOptions::new());
});
