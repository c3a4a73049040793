//! Option resolution: per-call options layered over library defaults and built-in defaults.

pub mod config;
mod labels;
mod resolve;
mod types;

pub use labels::{CustomLabels, LabelOverrides};
pub use resolve::{AddressingMode, ResolvedOptions, resolve};
pub use types::{DEFAULT_LIMIT, PaginateDefaults, PaginateOptions};
