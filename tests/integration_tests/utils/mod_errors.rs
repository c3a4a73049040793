use nexuslite_paginate::PaginateError;
use nexuslite_paginate::utils::json::parse_json_to_stages;

#[test]
fn json_errors_convert() {
    let err = parse_json_to_stages("{not json").unwrap_err();
    assert!(matches!(err, PaginateError::Json(_)));
    assert!(err.to_string().starts_with("Serde JSON"));
}

#[test]
fn io_errors_convert() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err: PaginateError = io.into();
    assert!(matches!(err, PaginateError::Io(ref m) if m == "gone"));
}

#[test]
fn memory_limit_message_names_the_stage() {
    let err = PaginateError::MemoryLimit { stage: "$sort".into(), docs: 12, limit: 10 };
    let msg = err.to_string();
    assert!(msg.contains("$sort") && msg.contains("12") && msg.contains("allowDiskUse"));
}
