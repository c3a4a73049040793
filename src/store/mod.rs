//! The aggregation capability the paginator runs against.

mod eval;
mod memory;

pub use eval::{Filter, SortSpec, compare_bson, eval_filter, parse_filter, parse_sort};
pub use memory::MemoryStore;

use std::collections::HashMap;
use std::future::Future;

use bson::{Bson, Document, doc};
use serde::{Deserialize, Serialize};

/// Results of a faceted call, keyed by branch name.
pub type FacetResults = HashMap<String, Vec<Document>>;

/// Execution options handed to the store untouched (collation, read preference, `allowDiskUse`,
/// `maxTimeMS`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateOptions(pub Document);

impl AggregateOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn allow_disk_use(self, allow: bool) -> Self {
        self.set("allowDiskUse", allow)
    }

    pub fn collation(self, collation: Document) -> Self {
        self.set("collation", collation)
    }

    pub fn max_time_ms(self, ms: i64) -> Self {
        self.set("maxTimeMS", ms)
    }

    #[must_use]
    pub fn allows_disk_use(&self) -> bool {
        self.0.get_bool("allowDiskUse").unwrap_or(false)
    }

    #[must_use]
    pub fn as_document(&self) -> &Document {
        &self.0
    }
}

impl From<Document> for AggregateOptions {
    fn from(d: Document) -> Self {
        Self(d)
    }
}

/// A store that can run aggregation pipelines.
///
/// Only [`aggregate`](Self::aggregate) is required. The default
/// [`faceted_aggregate`](Self::faceted_aggregate) wraps the branches in a single `$facet` stage
/// and splits the one row that comes back; stores with a native multi-branch call can override
/// it.
pub trait AggregateStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Run `pipeline` and return its output documents.
    fn aggregate(
        &self,
        pipeline: Vec<Document>,
        options: &AggregateOptions,
    ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send;

    /// Run several named pipelines as sibling branches of one request.
    fn faceted_aggregate(
        &self,
        facets: Vec<(String, Vec<Document>)>,
        options: &AggregateOptions,
    ) -> impl Future<Output = Result<FacetResults, Self::Error>> + Send {
        let names: Vec<String> = facets.iter().map(|(n, _)| n.clone()).collect();
        let mut spec = Document::new();
        for (name, stages) in facets {
            spec.insert(name, stages.into_iter().map(Bson::Document).collect::<Vec<_>>());
        }
        let pipeline = vec![doc! { "$facet": spec }];
        async move {
            let rows = self.aggregate(pipeline, options).await?;
            Ok(split_facet_row(rows.into_iter().next(), &names))
        }
    }
}

fn split_facet_row(row: Option<Document>, names: &[String]) -> FacetResults {
    let mut row = row.unwrap_or_default();
    names
        .iter()
        .map(|name| {
            let docs = match row.remove(name) {
                Some(Bson::Array(items)) => items
                    .into_iter()
                    .filter_map(|b| match b {
                        Bson::Document(d) => Some(d),
                        _ => None,
                    })
                    .collect(),
                _ => Vec::new(),
            };
            (name.clone(), docs)
        })
        .collect()
}
