#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 8192 { return; }
    let Ok(s) = std::str::from_utf8(data) else { return };
    let Ok(spec) = nexuslite_paginate::utils::json::parse_json_to_bson_document(s) else { return };
    if let Ok(f) = nexuslite_paginate::store::parse_filter(&spec) {
        let _ = nexuslite_paginate::store::eval_filter(&spec, &f);
    }
});
