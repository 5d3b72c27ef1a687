use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::Thresholds;
use crate::error::Result;
use crate::observability::metrics;
use crate::pipeline::ingestion::{into_rows, FeedSource};
use crate::pipeline::processing::aggregate::{
    category_risk_ranking, compliance_counts, failure_trend, kpi_summary, shift_breakdown, CategoryRisk,
    ComplianceCounts, FilterOptions, KpiSummary, ShiftBreakdown, TrendPoint,
};
use crate::pipeline::processing::filter::FilterCriteria;
use crate::pipeline::processing::images::{resolve_all, resolve_any};
use crate::pipeline::processing::normalize::Normalizer;
use crate::pipeline::processing::table::{failed_incidents, table_page, SortConfig, TablePage};
use crate::types::{NormalizedRecord, RawRecord};

/// One loaded copy of the feed. A refresh builds a new `Dataset`; nothing is
/// merged into an old one.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Rows as received, kept for whole-row image scans
    pub raw: Vec<RawRecord>,
    /// Normalized rows, index-aligned with `raw`
    pub records: Vec<NormalizedRecord>,
    pub loaded_at: DateTime<Utc>,
}

impl Dataset {
    pub fn from_rows(rows: Vec<RawRecord>, normalizer: &dyn Normalizer) -> Self {
        let records = normalizer.normalize_batch(&rows);
        Self {
            raw: rows,
            records,
            loaded_at: Utc::now(),
        }
    }

    /// Fetch the full feed and normalize every row
    #[instrument(skip(source, normalizer), fields(feed = %source.name()))]
    pub async fn load(source: &dyn FeedSource, normalizer: &dyn Normalizer) -> Result<Self> {
        let t_fetch = std::time::Instant::now();
        let response = match source.fetch().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Feed fetch failed: {}", e);
                metrics::feed::fetch_error(source.name());
                return Err(e);
            }
        };
        metrics::feed::fetch_duration(t_fetch.elapsed().as_secs_f64());

        let rows = match into_rows(response) {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Feed returned unusable payload: {}", e);
                metrics::feed::fetch_error(source.name());
                return Err(e);
            }
        };
        metrics::feed::fetch_success(source.name());
        metrics::feed::records_received(rows.len());
        info!("✅ Fetched {} rows", rows.len());

        Ok(Self::from_rows(rows, normalizer))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Selector options, always taken from the unfiltered data
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions::from_records(&self.records)
    }

    pub fn filtered(&self, criteria: &FilterCriteria) -> Vec<NormalizedRecord> {
        criteria.apply(&self.records)
    }

    /// Resolved image links for every row matching `criteria`. With
    /// `scan_whole_row` the raw row is searched instead of the image column.
    pub fn image_links(&self, criteria: &FilterCriteria, scan_whole_row: bool) -> Vec<RecordImages> {
        self.raw
            .iter()
            .zip(&self.records)
            .enumerate()
            .filter(|(_, (_, record))| criteria.matches(record))
            .map(|(row, (raw, record))| RecordImages {
                row,
                date: record.date.clone(),
                particulars: record.particulars.clone(),
                urls: if scan_whole_row {
                    resolve_any(raw)
                } else {
                    resolve_all(&record.image_ref)
                },
            })
            .collect()
    }

    /// Sorted, paginated slice of the filtered records
    pub fn table(&self, criteria: &FilterCriteria, sort: SortConfig, page: usize, thresholds: &Thresholds) -> TablePage {
        table_page(&self.filtered(criteria), sort, page, thresholds.page_size)
    }
}

/// Image links found for one row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordImages {
    /// Position of the row in the feed
    pub row: usize,
    pub date: String,
    pub particulars: String,
    pub urls: Vec<String>,
}

/// Everything the dashboard shows for one filter selection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub criteria: FilterCriteria,
    pub active_filters: usize,
    pub options: FilterOptions,
    pub kpis: KpiSummary,
    pub compliance: ComplianceCounts,
    pub category_risk: Vec<CategoryRisk>,
    pub trend: Vec<TrendPoint>,
    pub shifts: Vec<ShiftBreakdown>,
    pub failed: Vec<NormalizedRecord>,
}

impl DashboardView {
    /// Recompute every panel from the dataset and criteria
    #[instrument(skip_all, fields(rows = dataset.len(), active_filters = criteria.active_count()))]
    pub fn build(dataset: &Dataset, criteria: &FilterCriteria, thresholds: &Thresholds) -> Self {
        let filtered = dataset.filtered(criteria);
        metrics::dashboard::built(filtered.len());
        info!("Building dashboard over {} of {} rows", filtered.len(), dataset.len());

        Self {
            criteria: criteria.clone(),
            active_filters: criteria.active_count(),
            options: dataset.filter_options(),
            kpis: kpi_summary(&filtered, thresholds),
            compliance: compliance_counts(&filtered),
            category_risk: category_risk_ranking(&filtered, thresholds),
            trend: failure_trend(&filtered),
            shifts: shift_breakdown(&filtered),
            failed: failed_incidents(&filtered),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::normalize::DefaultNormalizer;
    use crate::types::ComplianceFlag;
    use serde_json::{json, Value};

    fn rows(values: Vec<Value>) -> Vec<RawRecord> {
        values.into_iter().map(|v| v.as_object().cloned().unwrap()).collect()
    }

    fn sample() -> Dataset {
        Dataset::from_rows(
            rows(vec![
                json!({ "Date": "2024-03-10", "Shift": "A", "Category": "Cold", "Dropdown": "Yes", "Images": "https://drive.google.com/file/d/F1/view" }),
                json!({ "Date": "2024-03-11", "Shift": "B", "Category": "Cold", "Dropdown": "No", "Remarks": "https://cdn.example.com/r.png" }),
                json!({ "Date": "2024-03-12", "Shift": "A", "Category": "Pest", "Dropdown": "No" }),
            ]),
            &DefaultNormalizer::new(),
        )
    }

    #[test]
    fn test_view_over_filtered_subset() {
        let dataset = sample();
        let criteria = FilterCriteria {
            shift: Some("A".to_string()),
            ..Default::default()
        };
        let view = DashboardView::build(&dataset, &criteria, &Thresholds::default());

        assert_eq!(view.kpis.total, 2);
        assert_eq!(view.compliance, ComplianceCounts { pass: 1, fail: 1 });
        assert_eq!(view.category_risk[0].category, "Pest");
        assert_eq!(view.failed.len(), 1);
        assert_eq!(view.failed[0].compliance, Some(ComplianceFlag::Fail));
        assert_eq!(view.active_filters, 1);
        // options come from the whole dataset
        assert_eq!(view.options.shifts, vec!["A", "B"]);
    }

    #[test]
    fn test_image_links_column_and_scan() {
        let dataset = sample();
        let all = FilterCriteria::default();

        let from_column = dataset.image_links(&all, false);
        assert_eq!(from_column[0].urls, vec!["https://docs.google.com/uc?export=view&id=F1"]);
        // the remarks link was picked up as the image cell by the normalizer's scan
        assert_eq!(from_column[1].urls, vec!["https://cdn.example.com/r.png"]);
        assert!(from_column[2].urls.is_empty());

        let scanned = dataset.image_links(&all, true);
        assert_eq!(scanned[1].urls, vec!["https://cdn.example.com/r.png"]);
        assert_eq!(scanned.len(), 3);
    }

    #[test]
    fn test_table_uses_page_size() {
        let dataset = sample();
        let thresholds = Thresholds {
            page_size: 2,
            ..Default::default()
        };
        let page = dataset.table(&FilterCriteria::default(), SortConfig::default(), 1, &thresholds);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.records[0].date, "2024-03-12");
    }

    #[test]
    fn test_empty_dataset_view() {
        let dataset = Dataset::from_rows(Vec::new(), &DefaultNormalizer::new());
        let view = DashboardView::build(&dataset, &FilterCriteria::default(), &Thresholds::default());
        assert!(dataset.is_empty());
        assert_eq!(view.kpis.total, 0);
        assert!(view.category_risk.is_empty());
        assert!(view.trend.is_empty());
        assert!(view.failed.is_empty());
    }
}
