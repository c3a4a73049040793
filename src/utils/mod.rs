//! Utility modules: numeric parsing, JSON/BSON helpers, developer log capture.
pub mod devlog;
pub mod json;
pub mod num;
