use bson::Bson;

use super::labels::CustomLabels;
use super::types::{DEFAULT_LIMIT, PaginateDefaults, PaginateOptions};
use crate::store::AggregateOptions;
use crate::utils::num::bson_to_i64_lenient;

/// How the requested page was addressed by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    /// `page` was supplied.
    Page(u64),
    /// `offset` was supplied without `page`.
    Offset(u64),
    /// Neither was supplied: first page.
    Default,
}

impl AddressingMode {
    #[must_use]
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::Offset(o) => Some(*o),
            Self::Default => Some(0),
            Self::Page(_) => None,
        }
    }
}

/// Fully populated options for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    pub limit: u64,
    pub page: u64,
    pub skip: u64,
    pub addressing: AddressingMode,
    pub pagination: bool,
    pub use_facet: bool,
    pub aggregate_options: AggregateOptions,
    pub labels: CustomLabels,
    pub debug: bool,
}

fn positive_or(v: Option<&Bson>, fallback: u64) -> u64 {
    v.and_then(bson_to_i64_lenient)
        .and_then(|n| u64::try_from(n).ok())
        .filter(|n| *n > 0)
        .unwrap_or(fallback)
}

fn non_negative_or_zero(v: &Bson) -> u64 {
    bson_to_i64_lenient(v).and_then(|n| u64::try_from(n).ok()).unwrap_or(0)
}

/// Merge built-in defaults, library defaults and per-call options, then derive the addressing
/// mode and skip count.
#[must_use]
pub fn resolve(options: &PaginateOptions, defaults: &PaginateDefaults) -> ResolvedOptions {
    let limit = positive_or(options.limit.as_ref().or(defaults.limit.as_ref()), DEFAULT_LIMIT);
    let mut page = positive_or(options.page.as_ref(), 1);

    let (addressing, skip) = if options.page.is_some() {
        (AddressingMode::Page(page), (page - 1).saturating_mul(limit))
    } else if let Some(raw) = &options.offset {
        let offset = non_negative_or_zero(raw);
        (AddressingMode::Offset(offset), offset)
    } else {
        page = 1;
        (AddressingMode::Default, 0)
    };

    let mut labels = CustomLabels::default();
    defaults.custom_labels.apply_to(&mut labels);
    options.custom_labels.apply_to(&mut labels);

    let aggregate_options = options
        .aggregate_options
        .clone()
        .or_else(|| defaults.aggregate_options.clone())
        .unwrap_or_default();

    ResolvedOptions {
        limit,
        page,
        skip,
        addressing,
        pagination: options.pagination.or(defaults.pagination).unwrap_or(true),
        use_facet: options.use_facet.or(defaults.use_facet).unwrap_or(true),
        aggregate_options,
        labels,
        debug: options.debug.or(defaults.debug).unwrap_or(false),
    }
}
