//! Pipeline fragments and the documents/count pipeline composer.

use bson::{Bson, Document, doc};

use crate::utils::num::u64_to_bson;

/// Field written by the count stage and read back by the result assembler.
pub const COUNT_KEY: &str = "countDocuments";

/// An ordered list of stage descriptors.
///
/// Any input shape is accepted: a document is a one-stage fragment, an array keeps its document
/// elements, and anything else is an empty fragment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineFragment(Vec<Document>);

impl PipelineFragment {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn stages(&self) -> &[Document] {
        &self.0
    }

    #[must_use]
    pub fn into_stages(self) -> Vec<Document> {
        self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Document>> for PipelineFragment {
    fn from(stages: Vec<Document>) -> Self {
        Self(stages)
    }
}

impl From<Document> for PipelineFragment {
    fn from(stage: Document) -> Self {
        Self(vec![stage])
    }
}

impl From<&[Document]> for PipelineFragment {
    fn from(stages: &[Document]) -> Self {
        Self(stages.to_vec())
    }
}

impl From<Bson> for PipelineFragment {
    fn from(v: Bson) -> Self {
        match v {
            Bson::Document(d) => Self(vec![d]),
            Bson::Array(items) => {
                let total = items.len();
                let stages: Vec<Document> = items
                    .into_iter()
                    .filter_map(|b| match b {
                        Bson::Document(d) => Some(d),
                        _ => None,
                    })
                    .collect();
                if stages.len() != total {
                    log::warn!("dropped {} non-document stage(s) from fragment", total - stages.len());
                }
                Self(stages)
            }
            _ => Self::default(),
        }
    }
}

impl<T: Into<PipelineFragment>> From<Option<T>> for PipelineFragment {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or_default()
    }
}

/// The two executable pipelines derived from one paginate call.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedPipelines {
    pub documents: Vec<Document>,
    pub count: Vec<Document>,
}

/// `conditions ++ sort ++ [$skip, $limit] ++ shaping` and `conditions ++ [$count]`.
///
/// The skip/limit pair is only inserted when `paginate` is set.
#[must_use]
pub fn compose(
    conditions: &PipelineFragment,
    sort: &PipelineFragment,
    shaping: &PipelineFragment,
    skip: u64,
    limit: u64,
    paginate: bool,
) -> ComposedPipelines {
    let mut documents =
        Vec::with_capacity(conditions.0.len() + sort.0.len() + shaping.0.len() + 2);
    documents.extend_from_slice(&conditions.0);
    documents.extend_from_slice(&sort.0);
    if paginate {
        documents.push(doc! { "$skip": u64_to_bson(skip) });
        documents.push(doc! { "$limit": u64_to_bson(limit) });
    }
    documents.extend_from_slice(&shaping.0);

    let mut count = Vec::with_capacity(conditions.0.len() + 1);
    count.extend_from_slice(&conditions.0);
    count.push(doc! { "$count": COUNT_KEY });

    ComposedPipelines { documents, count }
}
