use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::constants::ISO_DATE_FORMAT;
use crate::types::{ComplianceFlag, NormalizedRecord};

/// User-selected constraints on the record set. Every option is independent;
/// `None` (or an empty label) imposes no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    /// Inclusive lower bound on the record date
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on the record date
    pub end_date: Option<NaiveDate>,
    pub shift: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "complianceFlag")]
    pub compliance: Option<ComplianceFlag>,
    pub created_by: Option<String>,
}

impl FilterCriteria {
    /// Apply a quick date-range preset relative to `today`
    pub fn with_preset(mut self, preset: DateRangePreset, today: NaiveDate) -> Self {
        let (start, end) = preset.bounds(today);
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    /// Number of options currently constraining the result
    pub fn active_count(&self) -> usize {
        [
            self.start_date.is_some(),
            self.end_date.is_some(),
            label(&self.shift).is_some(),
            label(&self.category).is_some(),
            self.compliance.is_some(),
            label(&self.created_by).is_some(),
        ]
        .iter()
        .filter(|active| **active)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Reset every option
    pub fn clear(&mut self) {
        *self = FilterCriteria::default();
    }

    /// True when the record satisfies every active option.
    ///
    /// Dates compare as `YYYY-MM-DD` strings, which sort chronologically. A
    /// record whose date could not be parsed compares by its raw text.
    pub fn matches(&self, record: &NormalizedRecord) -> bool {
        if let Some(start) = self.start_date {
            if record.date.as_str() < start.format(ISO_DATE_FORMAT).to_string().as_str() {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if record.date.as_str() > end.format(ISO_DATE_FORMAT).to_string().as_str() {
                return false;
            }
        }
        if let Some(shift) = label(&self.shift) {
            if record.shift != shift {
                return false;
            }
        }
        if let Some(category) = label(&self.category) {
            if record.category != category {
                return false;
            }
        }
        if let Some(flag) = self.compliance {
            if record.compliance != Some(flag) {
                return false;
            }
        }
        if let Some(created_by) = label(&self.created_by) {
            if record.created_by != created_by {
                return false;
            }
        }
        true
    }

    /// Records satisfying the criteria, in their original order
    pub fn apply(&self, records: &[NormalizedRecord]) -> Vec<NormalizedRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Free-function form of [`FilterCriteria::matches`]
pub fn matches(record: &NormalizedRecord, criteria: &FilterCriteria) -> bool {
    criteria.matches(record)
}

fn label(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Quick date ranges offered next to the date pickers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRangePreset {
    Today,
    Yesterday,
    /// Today and the six days before it
    Last7Days,
}

impl DateRangePreset {
    pub fn bounds(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            DateRangePreset::Today => (today, today),
            DateRangePreset::Yesterday => {
                let yesterday = today - Duration::days(1);
                (yesterday, yesterday)
            }
            DateRangePreset::Last7Days => (today - Duration::days(6), today),
        }
    }
}

impl FromStr for DateRangePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "today" => Ok(DateRangePreset::Today),
            "yesterday" => Ok(DateRangePreset::Yesterday),
            "last7" | "last7days" | "week" => Ok(DateRangePreset::Last7Days),
            _ => Err(format!("unknown date range '{}' (expected today, yesterday or last7)", s)),
        }
    }
}
