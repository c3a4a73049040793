// Shared fixtures for integration tests
#![allow(dead_code)]

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bson::{Document, doc};
use nexuslite_paginate::{AggregateOptions, AggregateStore, MemoryStore};

/// `n` documents `{ _id: i, n: i, even: i % 2 == 0 }` for i in 1..=n.
pub fn numbered(n: i64) -> MemoryStore {
    MemoryStore::with_docs((1..=n).map(|i| doc! { "_id": i, "n": i, "even": i % 2 == 0 }).collect())
}

pub fn ns(docs: &[Document]) -> Vec<i64> {
    docs.iter().map(|d| d.get_i64("n").unwrap()).collect()
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("store unavailable: {0}")]
pub struct StoreDown(pub String);

/// Fails every call whose pipeline contains `fail_on`; otherwise delegates to an inner store.
#[derive(Clone)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_on: &'static str,
    pub calls: Arc<AtomicU64>,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore, fail_on: &'static str) -> Self {
        Self { inner, fail_on, calls: Arc::new(AtomicU64::new(0)) }
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

fn mentions(stage: &Document, key: &str) -> bool {
    stage.contains_key(key)
        || stage.values().any(|v| match v {
            bson::Bson::Document(d) => mentions(d, key),
            bson::Bson::Array(items) => items.iter().any(|b| matches!(b, bson::Bson::Document(d) if mentions(d, key))),
            _ => false,
        })
}

impl AggregateStore for FlakyStore {
    type Error = StoreDown;

    fn aggregate(
        &self,
        pipeline: Vec<Document>,
        options: &AggregateOptions,
    ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = if pipeline.iter().any(|s| mentions(s, self.fail_on)) {
            Err(StoreDown(format!("{} rejected", self.fail_on)))
        } else {
            self.inner.run(&pipeline, options).map_err(|e| StoreDown(e.to_string()))
        };
        async move { result }
    }
}
