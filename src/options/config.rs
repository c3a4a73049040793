//! Loading [`PaginateDefaults`] from TOML files and the environment.
//!
//! Precedence: environment > config file > built-in defaults.
//!
//! ```toml
//! limit = 25
//! use_facet = false
//!
//! [custom_labels]
//! docs = "items"
//! meta = "paging"
//!
//! [aggregate_options]
//! allowDiskUse = true
//! ```

use std::path::Path;

use bson::Bson;
use serde::Deserialize;

use super::labels::LabelOverrides;
use super::types::PaginateDefaults;
use crate::errors::PaginateError;
use crate::store::AggregateOptions;

pub const ENV_LIMIT: &str = "NEXUS_PAGINATE_LIMIT";
pub const ENV_PAGINATION: &str = "NEXUS_PAGINATE_PAGINATION";
pub const ENV_USE_FACET: &str = "NEXUS_PAGINATE_USE_FACET";
pub const ENV_DEBUG: &str = "NEXUS_PAGINATE_DEBUG";
pub const ENV_META_LABEL: &str = "NEXUS_PAGINATE_META_LABEL";
pub const ENV_DOCS_LABEL: &str = "NEXUS_PAGINATE_DOCS_LABEL";

// Top-level keys are snake_case; `[custom_labels]` keys are the camelCase label fields.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    limit: Option<i64>,
    pagination: Option<bool>,
    use_facet: Option<bool>,
    debug: Option<bool>,
    custom_labels: Option<LabelOverrides>,
    aggregate_options: Option<AggregateOptions>,
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, PaginateError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(PaginateError::Config(format!("{key}: expected a boolean, got {other:?}"))),
    }
}

impl PaginateDefaults {
    /// Parse defaults from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self, PaginateError> {
        let file: FileConfig = toml::from_str(s)?;
        Ok(Self {
            limit: file.limit.map(Bson::Int64),
            pagination: file.pagination,
            use_facet: file.use_facet,
            aggregate_options: file.aggregate_options,
            custom_labels: file.custom_labels.unwrap_or_default(),
            debug: file.debug,
        })
    }

    /// Read defaults from a TOML file.
    pub fn from_path(path: &Path) -> Result<Self, PaginateError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| PaginateError::Config(format!("{}: {e}", path.display())))?;
        let cfg = Self::from_toml_str(&text)?;
        log::info!("loaded paginate defaults from {}", path.display());
        Ok(cfg)
    }

    /// Overlay values found through `lookup` (normally `std::env::var`).
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), PaginateError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_LIMIT) {
            let n = raw
                .trim()
                .parse::<i64>()
                .map_err(|e| PaginateError::Config(format!("{ENV_LIMIT}: {e}")))?;
            self.limit = Some(Bson::Int64(n));
        }
        if let Some(raw) = lookup(ENV_PAGINATION) {
            self.pagination = Some(parse_bool(ENV_PAGINATION, &raw)?);
        }
        if let Some(raw) = lookup(ENV_USE_FACET) {
            self.use_facet = Some(parse_bool(ENV_USE_FACET, &raw)?);
        }
        if let Some(raw) = lookup(ENV_DEBUG) {
            self.debug = Some(parse_bool(ENV_DEBUG, &raw)?);
        }
        if let Some(raw) = lookup(ENV_META_LABEL) {
            // An empty value flattens metadata.
            self.custom_labels.meta = Some(Some(raw).filter(|s| !s.is_empty()));
        }
        if let Some(raw) = lookup(ENV_DOCS_LABEL) {
            self.custom_labels.docs = Some(raw);
        }
        Ok(())
    }

    /// Overlay `NEXUS_PAGINATE_*` environment variables.
    pub fn apply_env(&mut self) -> Result<(), PaginateError> {
        self.apply_env_with(|k| std::env::var(k).ok())
    }

    /// Built-in defaults, then the optional file, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, PaginateError> {
        let mut cfg = match path {
            Some(p) => Self::from_path(p)?,
            None => Self::default(),
        };
        cfg.apply_env()?;
        Ok(cfg)
    }
}
