// Data pipeline: feed ingestion, record processing, and the dashboard snapshot

pub mod dashboard;
pub mod ingestion;
pub mod processing;

pub use dashboard::{DashboardView, Dataset, RecordImages};
