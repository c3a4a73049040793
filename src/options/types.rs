use bson::Bson;
use serde::{Deserialize, Deserializer, Serialize};

use super::labels::LabelOverrides;
use crate::store::AggregateOptions;

/// Built-in page size, used when `limit` is absent, non-positive or unparsable.
pub const DEFAULT_LIMIT: u64 = 10;

/// Per-call pagination options. Every field is optional; unset fields fall back to the
/// paginator's [`PaginateDefaults`] and then to the built-in defaults.
///
/// `limit`, `page` and `offset` are kept as raw BSON so callers can hand over whatever their
/// request layer produced (`3`, `"3"`, `3.0`); they are parsed leniently at resolution time.
/// An explicit `null` for `page` or `offset` still counts as present and selects that mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginateOptions {
    pub limit: Option<Bson>,
    #[serde(deserialize_with = "deserialize_present", skip_serializing_if = "Option::is_none")]
    pub page: Option<Bson>,
    #[serde(deserialize_with = "deserialize_present", skip_serializing_if = "Option::is_none")]
    pub offset: Option<Bson>,
    pub pagination: Option<bool>,
    pub use_facet: Option<bool>,
    pub aggregate_options: Option<AggregateOptions>,
    pub custom_labels: LabelOverrides,
    pub debug: Option<bool>,
}

fn deserialize_present<'de, D>(d: D) -> Result<Option<Bson>, D::Error>
where
    D: Deserializer<'de>,
{
    Bson::deserialize(d).map(Some)
}

impl PaginateOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: impl Into<Bson>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    pub fn page(mut self, page: impl Into<Bson>) -> Self {
        self.page = Some(page.into());
        self
    }

    pub fn offset(mut self, offset: impl Into<Bson>) -> Self {
        self.offset = Some(offset.into());
        self
    }

    pub fn pagination(mut self, enabled: bool) -> Self {
        self.pagination = Some(enabled);
        self
    }

    pub fn use_facet(mut self, enabled: bool) -> Self {
        self.use_facet = Some(enabled);
        self
    }

    pub fn aggregate_options(mut self, opts: AggregateOptions) -> Self {
        self.aggregate_options = Some(opts);
        self
    }

    pub fn custom_labels(mut self, labels: LabelOverrides) -> Self {
        self.custom_labels = labels;
        self
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = Some(enabled);
        self
    }
}

/// Library-level defaults, set once when a [`crate::Paginator`] is built and read on every call.
///
/// Carries no `page` or `offset`: the addressing mode of a call is decided by that call's own
/// options alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginateDefaults {
    pub limit: Option<Bson>,
    pub pagination: Option<bool>,
    pub use_facet: Option<bool>,
    pub aggregate_options: Option<AggregateOptions>,
    pub custom_labels: LabelOverrides,
    pub debug: Option<bool>,
}
