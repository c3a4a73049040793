use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaginateError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid pipeline stage: {0}")]
    InvalidStage(String),

    #[error("Invalid pipeline: {0}")]
    InvalidPipeline(String),

    #[error("Stage {stage} exceeded memory limit: {docs} documents > {limit}; pass allowDiskUse")]
    MemoryLimit { stage: String, docs: usize, limit: usize },

    #[error("faceted aggregation is not supported by this store")]
    FacetUnsupported,
}

impl From<std::io::Error> for PaginateError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
