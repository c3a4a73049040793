use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bson::{Bson, Document};
use parking_lot::RwLock;

use super::eval::{compare_docs, eval_filter, parse_filter, parse_sort};
use super::{AggregateOptions, AggregateStore};
use crate::errors::PaginateError;
use crate::utils::num::{bson_to_i64_lenient, u64_to_bson, u64_to_usize_saturating, usize_to_u64};

/// An in-memory document collection with a small aggregation engine.
///
/// Supported stages: `$match`, `$sort`, `$skip`, `$limit`, `$count`, `$project` and `$facet`.
/// Each `aggregate` call works on one read snapshot of the documents.
#[derive(Clone)]
pub struct MemoryStore {
    docs: Arc<RwLock<Vec<Document>>>,
    calls: Arc<AtomicU64>,
    stage_limit: Option<usize>,
    facet_enabled: bool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            docs: Arc::new(RwLock::new(Vec::new())),
            calls: Arc::new(AtomicU64::new(0)),
            stage_limit: None,
            facet_enabled: true,
        }
    }

    #[must_use]
    pub fn with_docs(docs: Vec<Document>) -> Self {
        let store = Self::new();
        *store.docs.write() = docs;
        store
    }

    /// Fail `$sort` and `$facet` stages whose input exceeds `limit` documents unless the call
    /// passes `allowDiskUse: true`.
    #[must_use]
    pub fn with_stage_limit(mut self, limit: usize) -> Self {
        self.stage_limit = Some(limit);
        self
    }

    /// Reject `$facet`, like a store without multi-branch aggregation.
    #[must_use]
    pub fn without_facet(mut self) -> Self {
        self.facet_enabled = false;
        self
    }

    pub fn insert(&self, doc: Document) {
        self.docs.write().push(doc);
    }

    pub fn insert_many(&self, docs: impl IntoIterator<Item = Document>) {
        self.docs.write().extend(docs);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    /// Number of `aggregate` calls served so far.
    #[must_use]
    pub fn aggregate_calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Run `pipeline` synchronously over a snapshot of the collection.
    pub fn run(
        &self,
        pipeline: &[Document],
        options: &AggregateOptions,
    ) -> Result<Vec<Document>, PaginateError> {
        let snapshot = self.docs.read().clone();
        self.run_stages(snapshot, pipeline, options)
    }

    fn run_stages(
        &self,
        mut docs: Vec<Document>,
        pipeline: &[Document],
        options: &AggregateOptions,
    ) -> Result<Vec<Document>, PaginateError> {
        for stage in pipeline {
            let mut entries = stage.iter();
            let (Some((name, arg)), None) = (entries.next(), entries.next()) else {
                return Err(PaginateError::InvalidStage(format!(
                    "a stage must have exactly one field, got {}",
                    stage.len()
                )));
            };
            docs = match name.as_str() {
                "$match" => {
                    let filter = parse_filter(stage_doc(name, arg)?)?;
                    docs.retain(|d| eval_filter(d, &filter));
                    docs
                }
                "$sort" => {
                    let spec = parse_sort(stage_doc(name, arg)?)?;
                    self.check_memory(name, docs.len(), options)?;
                    docs.sort_by(|a, b| compare_docs(a, b, &spec));
                    docs
                }
                "$skip" => {
                    let n = stage_count(name, arg)?;
                    docs.into_iter().skip(n).collect()
                }
                "$limit" => {
                    let n = stage_count(name, arg)?;
                    if n == 0 {
                        return Err(PaginateError::InvalidStage("$limit must be positive".into()));
                    }
                    docs.truncate(n);
                    docs
                }
                "$count" => {
                    let Bson::String(field) = arg else {
                        return Err(PaginateError::InvalidStage("$count expects a field name".into()));
                    };
                    if field.is_empty() || field.starts_with('$') || field.contains('.') {
                        return Err(PaginateError::InvalidStage(format!("invalid $count field {field:?}")));
                    }
                    // No input documents means no output row.
                    if docs.is_empty() {
                        Vec::new()
                    } else {
                        let n = usize_to_u64(docs.len());
                        let mut row = Document::new();
                        row.insert(field.clone(), i32::try_from(n).map_or_else(|_| u64_to_bson(n), Bson::Int32));
                        vec![row]
                    }
                }
                "$project" => project(docs, stage_doc(name, arg)?)?,
                "$facet" => {
                    if !self.facet_enabled {
                        return Err(PaginateError::FacetUnsupported);
                    }
                    self.check_memory(name, docs.len(), options)?;
                    let mut row = Document::new();
                    for (branch, sub) in stage_doc(name, arg)? {
                        let Bson::Array(stages) = sub else {
                            return Err(PaginateError::InvalidStage(format!("$facet branch {branch} must be an array")));
                        };
                        let stages = stages
                            .iter()
                            .map(|s| match s {
                                Bson::Document(d) if d.contains_key("$facet") => Err(
                                    PaginateError::InvalidStage("$facet is not allowed inside $facet".into()),
                                ),
                                Bson::Document(d) => Ok(d.clone()),
                                _ => Err(PaginateError::InvalidStage(format!("$facet branch {branch} holds a non-document stage"))),
                            })
                            .collect::<Result<Vec<_>, _>>()?;
                        let out = self.run_stages(docs.clone(), &stages, options)?;
                        row.insert(branch.clone(), out.into_iter().map(Bson::Document).collect::<Vec<_>>());
                    }
                    vec![row]
                }
                other => return Err(PaginateError::InvalidStage(format!("unrecognized stage {other}"))),
            };
        }
        Ok(docs)
    }

    fn check_memory(
        &self,
        stage: &str,
        docs: usize,
        options: &AggregateOptions,
    ) -> Result<(), PaginateError> {
        match self.stage_limit {
            Some(limit) if docs > limit && !options.allows_disk_use() => {
                log::warn!("{stage} over stage limit: {docs} > {limit}");
                Err(PaginateError::MemoryLimit { stage: stage.to_string(), docs, limit })
            }
            _ => Ok(()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("docs", &self.len())
            .field("calls", &self.aggregate_calls())
            .field("stage_limit", &self.stage_limit)
            .field("facet_enabled", &self.facet_enabled)
            .finish()
    }
}

fn stage_doc<'a>(name: &str, arg: &'a Bson) -> Result<&'a Document, PaginateError> {
    match arg {
        Bson::Document(d) => Ok(d),
        other => Err(PaginateError::InvalidStage(format!("{name} expects a document, got {other}"))),
    }
}

fn stage_count(name: &str, arg: &Bson) -> Result<usize, PaginateError> {
    let n = match arg {
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) => bson_to_i64_lenient(arg),
        _ => None,
    };
    match n.and_then(|n| u64::try_from(n).ok()) {
        Some(n) => Ok(u64_to_usize_saturating(n)),
        None => Err(PaginateError::InvalidStage(format!("{name} expects a non-negative number, got {arg}"))),
    }
}

fn project(docs: Vec<Document>, spec: &Document) -> Result<Vec<Document>, PaginateError> {
    let mut include_id = true;
    let mut fields: Vec<(&str, bool)> = Vec::with_capacity(spec.len());
    for (k, v) in spec {
        let keep = match v {
            Bson::Boolean(b) => *b,
            Bson::Int32(i) => *i != 0,
            Bson::Int64(i) => *i != 0,
            Bson::Double(f) => *f != 0.0,
            other => {
                return Err(PaginateError::InvalidStage(format!(
                    "$project only supports inclusion/exclusion, got {k}: {other}"
                )));
            }
        };
        if k == "_id" {
            include_id = keep;
        } else {
            fields.push((k.as_str(), keep));
        }
    }
    let inclusive = fields.first().map(|(_, keep)| *keep);
    if fields.iter().any(|(_, keep)| Some(*keep) != inclusive) {
        return Err(PaginateError::InvalidStage("$project cannot mix inclusion and exclusion".into()));
    }
    Ok(docs
        .into_iter()
        .map(|d| match inclusive {
            Some(true) => {
                let mut out = Document::new();
                if include_id && let Some(id) = d.get("_id") {
                    out.insert("_id", id.clone());
                }
                for (f, _) in &fields {
                    if let Some(v) = d.get(*f) {
                        out.insert(*f, v.clone());
                    }
                }
                out
            }
            _ => {
                let mut out = d;
                for (f, _) in &fields {
                    out.remove(*f);
                }
                if !include_id {
                    out.remove("_id");
                }
                out
            }
        })
        .collect())
}

impl AggregateStore for MemoryStore {
    type Error = PaginateError;

    fn aggregate(
        &self,
        pipeline: Vec<Document>,
        options: &AggregateOptions,
    ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let result = self.run(&pipeline, options);
        async move {
            // Let a sibling query start before this one resolves.
            tokio::task::yield_now().await;
            result
        }
    }
}
