//! Summary statistics for the dashboard.
//!
//! Everything here is a pure function of the (already filtered) record slice
//! and is recomputed from scratch on every call. Empty input yields zero
//! counts and empty series rather than errors.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::config::Thresholds;
use crate::types::{NormalizedRecord, RecordField};

/// Distinct non-empty values of `field`, in first-occurrence order
pub fn unique_values(records: &[NormalizedRecord], field: RecordField) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for record in records {
        let value = record.value(field);
        if !value.is_empty() && !seen.iter().any(|s| s == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

/// Selector options for the filter panel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub shifts: Vec<String>,
    pub categories: Vec<String>,
    pub creators: Vec<String>,
}

impl FilterOptions {
    pub fn from_records(records: &[NormalizedRecord]) -> Self {
        Self {
            shifts: unique_values(records, RecordField::Shift),
            categories: unique_values(records, RecordField::Category),
            creators: unique_values(records, RecordField::CreatedBy),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceCounts {
    pub pass: usize,
    pub fail: usize,
}

pub fn compliance_counts(records: &[NormalizedRecord]) -> ComplianceCounts {
    records.iter().fold(ComplianceCounts::default(), |mut counts, record| {
        if record.is_pass() {
            counts.pass += 1;
        } else if record.is_fail() {
            counts.fail += 1;
        }
        counts
    })
}

/// Severity band of a category's compliance percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Critical,
    Caution,
    Healthy,
}

impl RiskTier {
    pub fn for_compliance(percent: f64, thresholds: &Thresholds) -> Self {
        if percent < thresholds.critical_compliance_percent {
            RiskTier::Critical
        } else if percent < thresholds.caution_compliance_percent {
            RiskTier::Caution
        } else {
            RiskTier::Healthy
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRisk {
    pub category: String,
    pub total: usize,
    pub failed: usize,
    pub compliance_percent: f64,
    pub tier: RiskTier,
}

/// Categories ranked by failure count, highest first. Ties keep the order in
/// which the categories first appear. Rows without a category are not ranked.
pub fn category_risk_ranking(records: &[NormalizedRecord], thresholds: &Thresholds) -> Vec<CategoryRisk> {
    let mut order: Vec<&str> = Vec::new();
    let mut tallies: HashMap<&str, (usize, usize)> = HashMap::new();

    for record in records.iter().filter(|r| !r.category.is_empty()) {
        let entry = tallies.entry(record.category.as_str()).or_insert_with(|| {
            order.push(record.category.as_str());
            (0, 0)
        });
        entry.0 += 1;
        if record.is_fail() {
            entry.1 += 1;
        }
    }

    let mut ranking: Vec<CategoryRisk> = order
        .into_iter()
        .map(|category| {
            let (total, failed) = tallies.get(category).copied().unwrap_or_default();
            let compliance_percent = compliance_percent(total, failed);
            CategoryRisk {
                category: category.to_string(),
                total,
                failed,
                compliance_percent,
                tier: RiskTier::for_compliance(compliance_percent, thresholds),
            }
        })
        .collect();

    // sort_by is stable, so equal counts keep first-seen order
    ranking.sort_by(|a, b| b.failed.cmp(&a.failed));
    ranking
}

fn compliance_percent(total: usize, failed: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (total - failed) as f64 / total as f64 * 100.0
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub failures: usize,
}

/// Failures per date, ascending by date. Dates compare as text, which is
/// chronological for normalized `YYYY-MM-DD` values.
pub fn failure_trend(records: &[NormalizedRecord]) -> Vec<TrendPoint> {
    let mut by_date: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records.iter().filter(|r| !r.date.is_empty()) {
        let failures = by_date.entry(record.date.as_str()).or_insert(0);
        if record.is_fail() {
            *failures += 1;
        }
    }
    by_date
        .into_iter()
        .map(|(date, failures)| TrendPoint {
            date: date.to_string(),
            failures,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftBreakdown {
    pub shift: String,
    pub pass: usize,
    pub fail: usize,
}

/// Pass/fail counts per shift, in first-seen shift order
pub fn shift_breakdown(records: &[NormalizedRecord]) -> Vec<ShiftBreakdown> {
    let mut breakdown: Vec<ShiftBreakdown> = Vec::new();
    for record in records.iter().filter(|r| !r.shift.is_empty()) {
        let index = match breakdown.iter().position(|b| b.shift == record.shift) {
            Some(index) => index,
            None => {
                breakdown.push(ShiftBreakdown {
                    shift: record.shift.clone(),
                    pass: 0,
                    fail: 0,
                });
                breakdown.len() - 1
            }
        };
        if record.is_pass() {
            breakdown[index].pass += 1;
        } else if record.is_fail() {
            breakdown[index].fail += 1;
        }
    }
    breakdown
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub total: usize,
    pub compliant: usize,
    pub non_compliant: usize,
    /// Failures relative to passes, as a percentage rounded to one decimal
    pub risk_percentage: f64,
    pub is_critical: bool,
}

/// Headline numbers for the KPI cards.
///
/// `risk_percentage` is `non_compliant / compliant * 100`, not a share of the
/// total, so it exceeds 100 once failures outnumber passes. It is 0 when
/// nothing passed.
pub fn kpi_summary(records: &[NormalizedRecord], thresholds: &Thresholds) -> KpiSummary {
    let counts = compliance_counts(records);
    let risk_percentage = if counts.pass == 0 {
        0.0
    } else {
        round_one_decimal(counts.fail as f64 / counts.pass as f64 * 100.0)
    };

    KpiSummary {
        total: records.len(),
        compliant: counts.pass,
        non_compliant: counts.fail,
        risk_percentage,
        is_critical: risk_percentage > thresholds.critical_risk_percent,
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ComplianceFlag;

    fn rec(category: &str, shift: &str, date: &str, flag: Option<ComplianceFlag>) -> NormalizedRecord {
        NormalizedRecord {
            category: category.to_string(),
            shift: shift.to_string(),
            date: date.to_string(),
            compliance: flag,
            ..Default::default()
        }
    }

    fn batch(category: &str, total: usize, failed: usize) -> Vec<NormalizedRecord> {
        (0..total)
            .map(|i| {
                let flag = if i < failed { ComplianceFlag::Fail } else { ComplianceFlag::Pass };
                rec(category, "A", "2024-03-10", Some(flag))
            })
            .collect()
    }

    #[test]
    fn test_unlabelled_rows_form_no_bucket() {
        let records = vec![
            rec("", "", "", Some(ComplianceFlag::Fail)),
            rec("Cold", "Night", "2024-03-10", Some(ComplianceFlag::Pass)),
            rec("", "Night", "", Some(ComplianceFlag::Fail)),
        ];

        let ranking = category_risk_ranking(&records, &Thresholds::default());
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].category, "Cold");
        assert_eq!(ranking[0].failed, 0);

        assert_eq!(
            failure_trend(&records),
            vec![TrendPoint {
                date: "2024-03-10".to_string(),
                failures: 0
            }]
        );

        assert_eq!(
            shift_breakdown(&records),
            vec![ShiftBreakdown {
                shift: "Night".to_string(),
                pass: 1,
                fail: 1
            }]
        );

        // still counted in the totals
        let kpis = kpi_summary(&records, &Thresholds::default());
        assert_eq!(kpis.total, 3);
        assert_eq!(kpis.non_compliant, 2);
    }

    #[test]
    fn test_unique_values_first_occurrence_order() {
        let records = vec![
            rec("X", "Night", "", None),
            rec("Y", "", "", None),
            rec("X", "Morning", "", None),
            rec("", "Night", "", None),
        ];
        assert_eq!(unique_values(&records, RecordField::Shift), vec!["Night", "Morning"]);
        assert_eq!(unique_values(&records, RecordField::Category), vec!["X", "Y"]);
        assert!(unique_values(&records, RecordField::CreatedBy).is_empty());
    }

    #[test]
    fn test_compliance_counts_ignore_unflagged() {
        let records = vec![
            rec("X", "A", "", Some(ComplianceFlag::Pass)),
            rec("X", "A", "", Some(ComplianceFlag::Fail)),
            rec("X", "A", "", None),
        ];
        assert_eq!(compliance_counts(&records), ComplianceCounts { pass: 1, fail: 1 });
    }

    #[test]
    fn test_category_ranking_order_and_tiers() {
        let mut records = batch("A", 5, 2);
        records.extend(batch("B", 5, 0));
        records.extend(batch("C", 4, 3));

        let ranking = category_risk_ranking(&records, &Thresholds::default());
        let order: Vec<&str> = ranking.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);

        assert_eq!(ranking[0].compliance_percent, 25.0);
        assert_eq!(ranking[0].tier, RiskTier::Critical);
        assert_eq!(ranking[1].compliance_percent, 60.0);
        assert_eq!(ranking[1].tier, RiskTier::Critical);
        assert_eq!(ranking[2].compliance_percent, 100.0);
        assert_eq!(ranking[2].tier, RiskTier::Healthy);
    }

    #[test]
    fn test_category_ranking_ties_keep_first_seen() {
        let mut records = batch("Late", 3, 1);
        records.extend(batch("Early", 2, 1));
        records.insert(0, rec("Zero", "A", "", Some(ComplianceFlag::Pass)));

        let order: Vec<String> = category_risk_ranking(&records, &Thresholds::default())
            .into_iter()
            .map(|r| r.category)
            .collect();
        assert_eq!(order, vec!["Late", "Early", "Zero"]);
    }

    #[test]
    fn test_caution_tier() {
        // 18 of 20 compliant = 90%
        let records = batch("Pest", 20, 2);
        let ranking = category_risk_ranking(&records, &Thresholds::default());
        assert_eq!(ranking[0].tier, RiskTier::Caution);
    }

    #[test]
    fn test_failure_trend_sorted_by_date() {
        let records = vec![
            rec("X", "A", "2024-03-12", Some(ComplianceFlag::Fail)),
            rec("X", "A", "2024-03-10", Some(ComplianceFlag::Pass)),
            rec("X", "A", "2024-03-12", Some(ComplianceFlag::Fail)),
            rec("X", "A", "2024-03-11", Some(ComplianceFlag::Fail)),
        ];
        assert_eq!(
            failure_trend(&records),
            vec![
                TrendPoint { date: "2024-03-10".to_string(), failures: 0 },
                TrendPoint { date: "2024-03-11".to_string(), failures: 1 },
                TrendPoint { date: "2024-03-12".to_string(), failures: 2 },
            ]
        );
    }

    #[test]
    fn test_shift_breakdown() {
        let records = vec![
            rec("X", "Night", "", Some(ComplianceFlag::Fail)),
            rec("X", "Morning", "", Some(ComplianceFlag::Pass)),
            rec("X", "Night", "", Some(ComplianceFlag::Pass)),
            rec("X", "Night", "", Some(ComplianceFlag::Fail)),
        ];
        assert_eq!(
            shift_breakdown(&records),
            vec![
                ShiftBreakdown { shift: "Night".to_string(), pass: 1, fail: 2 },
                ShiftBreakdown { shift: "Morning".to_string(), pass: 1, fail: 0 },
            ]
        );
    }

    #[test]
    fn test_kpi_risk_relative_to_compliant() {
        let records = batch("A", 10, 2);
        let kpi = kpi_summary(&records, &Thresholds::default());
        assert_eq!(kpi.total, 10);
        assert_eq!(kpi.compliant, 8);
        assert_eq!(kpi.non_compliant, 2);
        assert_eq!(kpi.risk_percentage, 25.0);
        assert!(kpi.is_critical);
    }

    #[test]
    fn test_kpi_guards_zero_compliant() {
        let records = batch("A", 3, 3);
        let kpi = kpi_summary(&records, &Thresholds::default());
        assert_eq!(kpi.risk_percentage, 0.0);
        assert!(!kpi.is_critical);
    }

    #[test]
    fn test_empty_collection_identities() {
        let thresholds = Thresholds::default();
        assert_eq!(compliance_counts(&[]), ComplianceCounts::default());
        assert!(category_risk_ranking(&[], &thresholds).is_empty());
        assert!(failure_trend(&[]).is_empty());
        assert!(shift_breakdown(&[]).is_empty());
        assert_eq!(FilterOptions::from_records(&[]), FilterOptions::default());
        let kpi = kpi_summary(&[], &thresholds);
        assert_eq!((kpi.total, kpi.compliant, kpi.non_compliant), (0, 0, 0));
        assert!(!kpi.is_critical);
    }
}
