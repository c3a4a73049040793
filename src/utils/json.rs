use crate::errors::PaginateError;
use bson::{Bson, Document};

/// Convert a serde_json::Value that must be an object into a bson::Document.
pub fn json_value_to_bson_document(val: &serde_json::Value) -> Result<Document, PaginateError> {
    let obj = val
        .as_object()
        .ok_or_else(|| PaginateError::InvalidPipeline("expected JSON object".into()))?;
    Document::try_from(obj.clone()).map_err(|e| PaginateError::InvalidPipeline(e.to_string()))
}

/// Parse a JSON string into a bson::Document. The JSON must be a top-level object.
pub fn parse_json_to_bson_document(json: &str) -> Result<Document, PaginateError> {
    let val: serde_json::Value = serde_json::from_str(json)?;
    json_value_to_bson_document(&val)
}

/// Parse a JSON stage list. A top-level object is a single stage; an array holds one object per
/// stage.
pub fn parse_json_to_stages(json: &str) -> Result<Vec<Document>, PaginateError> {
    let val: serde_json::Value = serde_json::from_str(json)?;
    match &val {
        serde_json::Value::Array(items) => items.iter().map(json_value_to_bson_document).collect(),
        serde_json::Value::Object(_) => Ok(vec![json_value_to_bson_document(&val)?]),
        other => Err(PaginateError::InvalidPipeline(format!("expected stage object or array, got {other}"))),
    }
}

/// Render a BSON value as relaxed extended JSON.
#[must_use]
pub fn bson_to_json(v: Bson) -> serde_json::Value {
    v.into_relaxed_extjson()
}
