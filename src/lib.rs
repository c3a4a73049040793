//! Paginated results over aggregation pipelines.
//!
//! A call takes three pipeline fragments (conditions, sort, shaping) and pagination options,
//! composes a documents pipeline and a count pipeline, runs them against an
//! [`AggregateStore`](store::AggregateStore) and returns a [`ResultEnvelope`] carrying the page
//! and its metadata.
//!
//! ```
//! use bson::doc;
//! use nexuslite_paginate::{MemoryStore, PaginateOptions, Paginator};
//!
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! rt.block_on(async {
//!     let store = MemoryStore::with_docs((1..=23).map(|i| doc! { "n": i }).collect());
//!     let paginator = Paginator::new(store);
//!     let page = paginator
//!         .paginate(doc! { "$match": {} }, doc! { "$sort": { "n": 1 } }, None::<bson::Document>, &PaginateOptions::new().page(3_i64))
//!         .await
//!         .unwrap();
//!     assert_eq!(page.meta.total_pages, 3);
//!     assert_eq!(page.docs.len(), 3);
//! });
//! ```

pub mod errors;
pub mod logger;
pub mod options;
pub mod paginate;
pub mod pipeline;
pub mod store;
pub mod utils;

pub use errors::PaginateError;
pub use options::{
    AddressingMode, CustomLabels, LabelOverrides, PaginateDefaults, PaginateOptions,
    ResolvedOptions,
};
pub use paginate::{PageMeta, PaginationPlan, Paginator, ResultEnvelope, Strategy};
pub use pipeline::{COUNT_KEY, ComposedPipelines, PipelineFragment};
pub use store::{AggregateOptions, AggregateStore, MemoryStore};

/// Initializes logging from `log4rs.yaml`.
///
/// Call once at startup; see [`logger`] for programmatic configuration.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    logger::init()?;
    Ok(())
}
