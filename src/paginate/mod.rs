//! Strategy selection, store execution and result assembly.

mod envelope;
mod execute;
mod paginator;

pub use envelope::{OFFSET_KEY, PageMeta, ResultEnvelope, extract_count};
pub use execute::{RawResults, Strategy};
pub use paginator::{PaginationPlan, Paginator, plan};
