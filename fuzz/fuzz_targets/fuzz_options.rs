#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use nexuslite_paginate::options::resolve;
use nexuslite_paginate::{PageMeta, PaginateDefaults, PaginateOptions};

#[derive(Debug, Arbitrary)]
struct Input {
    limit: Option<String>,
    page: Option<String>,
    offset: Option<i64>,
    pagination: Option<bool>,
    count: u64,
}

fuzz_target!(|input: Input| {
    let mut opts = PaginateOptions::new();
    opts.limit = input.limit.map(bson::Bson::String);
    opts.page = input.page.map(bson::Bson::String);
    opts.offset = input.offset.map(bson::Bson::Int64);
    opts.pagination = input.pagination;
    let r = resolve(&opts, &PaginateDefaults::default());
    assert!(r.limit > 0 && r.page > 0);
    let m = PageMeta::compute(input.count, r.limit, r.page, r.addressing, r.pagination);
    assert!(m.total_pages >= 1);
    assert_eq!(m.prev_page.is_some(), m.has_prev_page);
    assert_eq!(m.next_page.is_some(), m.has_next_page);
});
