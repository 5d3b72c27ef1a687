//! Metrics for the CCP monitor.
//!
//! Recording goes through the `metrics` facade, so calls are no-ops until
//! [`init`] installs the Prometheus recorder. Names live in [`MetricName`] to
//! avoid magic strings at call sites.

use std::fmt;
use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

use crate::error::{MonitorError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Feed metrics
    FeedFetchSuccess,
    FeedFetchError,
    FeedFetchDuration,
    FeedRecordsReceived,

    // Normalize metrics
    NormalizeRecordsProcessed,
    NormalizeDatesKeptRaw,
    NormalizeTimesKeptRaw,
    NormalizeBatchSize,

    // Dashboard metrics
    DashboardBuilds,
    DashboardRecordsMatched,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::FeedFetchSuccess => "ccp_feed_fetch_success_total",
            MetricName::FeedFetchError => "ccp_feed_fetch_error_total",
            MetricName::FeedFetchDuration => "ccp_feed_fetch_duration_seconds",
            MetricName::FeedRecordsReceived => "ccp_feed_records_received",

            MetricName::NormalizeRecordsProcessed => "ccp_normalize_records_processed_total",
            MetricName::NormalizeDatesKeptRaw => "ccp_normalize_dates_kept_raw_total",
            MetricName::NormalizeTimesKeptRaw => "ccp_normalize_times_kept_raw_total",
            MetricName::NormalizeBatchSize => "ccp_normalize_batch_size",

            MetricName::DashboardBuilds => "ccp_dashboard_builds_total",
            MetricName::DashboardRecordsMatched => "ccp_dashboard_records_matched",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            FeedFetchSuccess,
            FeedFetchError,
            FeedFetchDuration,
            FeedRecordsReceived,
            NormalizeRecordsProcessed,
            NormalizeDatesKeptRaw,
            NormalizeTimesKeptRaw,
            NormalizeBatchSize,
            DashboardBuilds,
            DashboardRecordsMatched,
        ]
        .into_iter()
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Calling it twice is harmless.
pub fn init() -> Result<()> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MonitorError::Config(format!("Failed to install Prometheus recorder: {}", e)))?;
    let _ = METRICS_HANDLE.set(handle);
    info!("Metrics system initialized");
    Ok(())
}

/// Prometheus text exposition of everything recorded so far
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(|handle| handle.render())
}

pub mod feed {
    use super::MetricName;

    pub fn fetch_success(source: &str) {
        metrics::counter!(MetricName::FeedFetchSuccess.as_str(), "source" => source.to_string()).increment(1);
    }

    pub fn fetch_error(source: &str) {
        metrics::counter!(MetricName::FeedFetchError.as_str(), "source" => source.to_string()).increment(1);
    }

    pub fn fetch_duration(secs: f64) {
        metrics::histogram!(MetricName::FeedFetchDuration.as_str()).record(secs);
    }

    pub fn records_received(count: usize) {
        metrics::histogram!(MetricName::FeedRecordsReceived.as_str()).record(count as f64);
    }
}

pub mod normalize {
    use super::MetricName;

    pub fn record_normalized() {
        metrics::counter!(MetricName::NormalizeRecordsProcessed.as_str()).increment(1);
    }

    pub fn date_kept_raw() {
        metrics::counter!(MetricName::NormalizeDatesKeptRaw.as_str()).increment(1);
    }

    pub fn time_kept_raw() {
        metrics::counter!(MetricName::NormalizeTimesKeptRaw.as_str()).increment(1);
    }

    pub fn batch_processed(size: usize) {
        metrics::histogram!(MetricName::NormalizeBatchSize.as_str()).record(size as f64);
    }
}

pub mod dashboard {
    use super::MetricName;

    pub fn built(matched: usize) {
        metrics::counter!(MetricName::DashboardBuilds.as_str()).increment(1);
        metrics::histogram!(MetricName::DashboardRecordsMatched.as_str()).record(matched as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_metric_names_are_unique_and_prefixed() {
        let names: Vec<&str> = MetricName::all_metrics().map(|m| m.as_str()).collect();
        let unique: HashSet<&str> = names.iter().copied().collect();
        assert_eq!(names.len(), unique.len());
        assert!(names.iter().all(|n| n.starts_with("ccp_")));
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        feed::fetch_success("file");
        normalize::batch_processed(3);
        dashboard::built(1);
    }
}
