pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod observability;
pub mod pipeline;
pub mod types;

pub use pipeline::processing::filter::{matches, DateRangePreset, FilterCriteria};
pub use pipeline::processing::images::{resolve_any, resolve_one};
pub use pipeline::processing::normalize::{DefaultNormalizer, Normalizer};
pub use pipeline::{DashboardView, Dataset};
pub use types::{ComplianceFlag, NormalizedRecord, RawRecord};
