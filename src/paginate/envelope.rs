use bson::{Bson, Document};
use serde::{Serialize, Serializer};

use super::execute::RawResults;
use crate::options::{AddressingMode, CustomLabels, ResolvedOptions};
use crate::pipeline::COUNT_KEY;
use crate::utils::num::{bson_to_count, ceil_div, u64_to_bson};

/// Key of the raw offset in the metadata; not relabelled.
pub const OFFSET_KEY: &str = "offset";

/// Page metadata of one result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMeta {
    pub total_docs: u64,
    pub limit: u64,
    pub page: u64,
    pub total_pages: u64,
    /// 1-based position of the first returned document.
    pub paging_counter: u64,
    pub has_prev_page: bool,
    pub has_next_page: bool,
    pub prev_page: Option<u64>,
    pub next_page: Option<u64>,
    /// Set unless the call was addressed by page; 0 when neither page nor offset was given.
    pub offset: Option<u64>,
}

impl PageMeta {
    /// Page metadata for `count` matching documents.
    ///
    /// With pagination off the whole result is one page: `limit` becomes `count` and `page` 1.
    /// Offset and default addressing derive `page` and `pagingCounter` from the offset.
    /// A zero limit (pagination off, nothing matched) yields a single page.
    #[must_use]
    pub fn compute(count: u64, limit: u64, page: u64, addressing: AddressingMode, pagination: bool) -> Self {
        let (limit, mut page) = if pagination { (limit, page) } else { (count, 1) };
        let total_pages = ceil_div(count, limit).unwrap_or(0).max(1);

        let mut meta = Self {
            total_docs: count,
            limit,
            page,
            total_pages,
            paging_counter: page.saturating_sub(1).saturating_mul(limit).saturating_add(1),
            has_prev_page: false,
            has_next_page: false,
            prev_page: None,
            next_page: None,
            offset: None,
        };

        if let Some(offset) = addressing.offset() {
            page = ceil_div(offset.saturating_add(1), limit).unwrap_or(1);
            meta.offset = Some(offset);
            meta.page = page;
            meta.paging_counter = offset.saturating_add(1);
        }

        if page > 1 {
            meta.has_prev_page = true;
            meta.prev_page = Some(page - 1);
        }
        if page < total_pages {
            meta.has_next_page = true;
            meta.next_page = Some(page + 1);
        }
        meta
    }

    /// Metadata fields under their configured names, in envelope order.
    #[must_use]
    pub fn to_document(&self, labels: &CustomLabels) -> Document {
        let mut d = Document::new();
        d.insert(labels.total_docs.as_str(), u64_to_bson(self.total_docs));
        d.insert(labels.limit.as_str(), u64_to_bson(self.limit));
        d.insert(labels.page.as_str(), u64_to_bson(self.page));
        d.insert(labels.total_pages.as_str(), u64_to_bson(self.total_pages));
        d.insert(labels.paging_counter.as_str(), u64_to_bson(self.paging_counter));
        d.insert(labels.has_prev_page.as_str(), self.has_prev_page);
        d.insert(labels.has_next_page.as_str(), self.has_next_page);
        if let Some(o) = self.offset {
            d.insert(OFFSET_KEY, u64_to_bson(o));
        }
        if let Some(p) = self.prev_page {
            d.insert(labels.prev_page.as_str(), u64_to_bson(p));
        }
        if let Some(n) = self.next_page {
            d.insert(labels.next_page.as_str(), u64_to_bson(n));
        }
        d
    }
}

/// The page of documents plus its metadata, rendered with the call's labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultEnvelope {
    pub docs: Vec<Document>,
    pub meta: PageMeta,
    pub labels: CustomLabels,
}

impl ResultEnvelope {
    /// Render to a single document: metadata nested under the meta label when one is set,
    /// otherwise flattened ahead of the docs field.
    #[must_use]
    pub fn to_document(&self) -> Document {
        let docs: Vec<Bson> = self.docs.iter().cloned().map(Bson::Document).collect();
        let meta = self.meta.to_document(&self.labels);
        match &self.labels.meta {
            Some(meta_label) => {
                let mut out = Document::new();
                out.insert(self.labels.docs.as_str(), docs);
                out.insert(meta_label.as_str(), meta);
                out
            }
            None => {
                let mut out = meta;
                // The docs field wins over a metadata field of the same name.
                out.remove(&self.labels.docs);
                out.insert(self.labels.docs.as_str(), docs);
                out
            }
        }
    }

    #[must_use]
    pub fn into_document(self) -> Document {
        self.to_document()
    }
}

impl Serialize for ResultEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

/// The count carried by the count pipeline's first row; 0 when no row came back.
#[must_use]
pub fn extract_count(rows: &[Document]) -> u64 {
    match rows.first() {
        None => 0,
        Some(row) => match row.get(COUNT_KEY).and_then(bson_to_count) {
            Some(n) => n,
            None => {
                log::warn!("count row without a usable {COUNT_KEY} field: {row}");
                0
            }
        },
    }
}

pub(crate) fn assemble(raw: RawResults, resolved: &ResolvedOptions) -> ResultEnvelope {
    let count = extract_count(&raw.count_rows);
    let meta = PageMeta::compute(count, resolved.limit, resolved.page, resolved.addressing, resolved.pagination);
    ResultEnvelope { docs: raw.docs, meta, labels: resolved.labels.clone() }
}
