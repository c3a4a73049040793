use serde::{Deserialize, Deserializer, Serialize};

/// Output field names of a result envelope.
///
/// `meta: None` flattens the metadata next to the docs field; `Some(name)` nests it under `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomLabels {
    pub total_docs: String,
    pub docs: String,
    pub limit: String,
    pub page: String,
    pub total_pages: String,
    pub next_page: String,
    pub prev_page: String,
    pub paging_counter: String,
    pub has_prev_page: String,
    pub has_next_page: String,
    pub meta: Option<String>,
}

impl Default for CustomLabels {
    fn default() -> Self {
        Self {
            total_docs: "totalDocs".into(),
            docs: "docs".into(),
            limit: "limit".into(),
            page: "page".into(),
            total_pages: "totalPages".into(),
            next_page: "nextPage".into(),
            prev_page: "prevPage".into(),
            paging_counter: "pagingCounter".into(),
            has_prev_page: "hasPrevPage".into(),
            has_next_page: "hasNextPage".into(),
            meta: None,
        }
    }
}

/// Per-layer label overrides. Unset fields fall through to the layer below.
///
/// `meta` is doubly optional: `None` leaves the lower layer alone, `Some(None)` (an explicit
/// `null` on the wire) turns nesting off, `Some(Some(name))` nests under `name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabelOverrides {
    pub total_docs: Option<String>,
    pub docs: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
    pub total_pages: Option<String>,
    pub next_page: Option<String>,
    pub prev_page: Option<String>,
    pub paging_counter: Option<String>,
    pub has_prev_page: Option<String>,
    pub has_next_page: Option<String>,
    #[serde(deserialize_with = "deserialize_explicit", skip_serializing_if = "Option::is_none")]
    pub meta: Option<Option<String>>,
}

fn deserialize_explicit<'de, D>(d: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(d).map(Some)
}

impl LabelOverrides {
    pub fn docs(mut self, name: impl Into<String>) -> Self {
        self.docs = Some(name.into());
        self
    }

    pub fn total_docs(mut self, name: impl Into<String>) -> Self {
        self.total_docs = Some(name.into());
        self
    }

    /// Nest metadata under `name`.
    pub fn meta(mut self, name: impl Into<String>) -> Self {
        self.meta = Some(Some(name.into()));
        self
    }

    /// Flatten metadata, overriding any nesting set by a lower layer.
    pub fn flatten(mut self) -> Self {
        self.meta = Some(None);
        self
    }

    /// Apply this layer on top of `base`. Empty names are rejected with a warning and the base
    /// name is kept.
    pub fn apply_to(&self, base: &mut CustomLabels) {
        let fields: [(&str, &Option<String>, &mut String); 10] = [
            ("totalDocs", &self.total_docs, &mut base.total_docs),
            ("docs", &self.docs, &mut base.docs),
            ("limit", &self.limit, &mut base.limit),
            ("page", &self.page, &mut base.page),
            ("totalPages", &self.total_pages, &mut base.total_pages),
            ("nextPage", &self.next_page, &mut base.next_page),
            ("prevPage", &self.prev_page, &mut base.prev_page),
            ("pagingCounter", &self.paging_counter, &mut base.paging_counter),
            ("hasPrevPage", &self.has_prev_page, &mut base.has_prev_page),
            ("hasNextPage", &self.has_next_page, &mut base.has_next_page),
        ];
        for (field, over, slot) in fields {
            match over.as_deref() {
                Some("") => log::warn!("ignoring empty custom label for {field}"),
                Some(name) => *slot = name.to_string(),
                None => {}
            }
        }
        match &self.meta {
            Some(Some(name)) if name.is_empty() => {
                log::warn!("ignoring empty custom label for meta");
            }
            Some(meta) => base.meta.clone_from(meta),
            None => {}
        }
    }
}
