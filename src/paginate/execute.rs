use bson::Document;

use crate::pipeline::ComposedPipelines;
use crate::store::{AggregateOptions, AggregateStore};

pub(crate) const DOCS_FACET: &str = "docs";
pub(crate) const COUNT_FACET: &str = "count";

/// How the documents and count pipelines reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One faceted call; both results come from the same snapshot.
    Facet,
    /// Two independent calls awaited together.
    Parallel,
}

impl Strategy {
    #[must_use]
    pub fn from_use_facet(use_facet: bool) -> Self {
        if use_facet { Self::Facet } else { Self::Parallel }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Facet => "facet",
            Self::Parallel => "parallel",
        }
    }
}

/// Raw store output before assembly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResults {
    pub docs: Vec<Document>,
    pub count_rows: Vec<Document>,
}

pub(crate) async fn execute<S: AggregateStore>(
    store: &S,
    pipelines: ComposedPipelines,
    strategy: Strategy,
    options: &AggregateOptions,
) -> Result<RawResults, S::Error> {
    let ComposedPipelines { documents, count } = pipelines;
    match strategy {
        Strategy::Facet => {
            let facets = vec![(DOCS_FACET.to_string(), documents), (COUNT_FACET.to_string(), count)];
            let mut out = store.faceted_aggregate(facets, options).await?;
            Ok(RawResults {
                docs: out.remove(DOCS_FACET).unwrap_or_default(),
                count_rows: out.remove(COUNT_FACET).unwrap_or_default(),
            })
        }
        Strategy::Parallel => {
            let (docs, count_rows) =
                tokio::try_join!(store.aggregate(documents, options), store.aggregate(count, options))?;
            Ok(RawResults { docs, count_rows })
        }
    }
}
