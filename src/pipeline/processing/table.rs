use serde::{Deserialize, Serialize};

use crate::types::{NormalizedRecord, RecordField};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Column and direction the record table is sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub field: RecordField,
    pub direction: SortDirection,
}

impl Default for SortConfig {
    /// Newest first
    fn default() -> Self {
        Self {
            field: RecordField::Date,
            direction: SortDirection::Desc,
        }
    }
}

impl SortConfig {
    /// Clicking a header: the same column flips ascending to descending,
    /// anything else starts ascending.
    pub fn request(&self, field: RecordField) -> Self {
        let direction = if self.field == field && self.direction == SortDirection::Asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        Self { field, direction }
    }
}

/// Sort by the text of one column. Stable, so equal values keep feed order.
pub fn sort_records(records: &[NormalizedRecord], sort: SortConfig) -> Vec<NormalizedRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = a.value(sort.field).cmp(b.value(sort.field));
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    sorted
}

/// One page of the record table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePage {
    /// 1-based page number actually shown
    pub page: usize,
    pub total_pages: usize,
    pub total_records: usize,
    pub records: Vec<NormalizedRecord>,
}

/// Slice `records` into pages of `page_size` and return `page` (1-based),
/// clamped into the valid range. An empty table has zero pages and shows
/// page 1 with no rows.
pub fn paginate(records: &[NormalizedRecord], page: usize, page_size: usize) -> TablePage {
    let page_size = page_size.max(1);
    let total_pages = records.len().div_ceil(page_size);
    let page = page.clamp(1, total_pages.max(1));
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(records.len());

    TablePage {
        page,
        total_pages,
        total_records: records.len(),
        records: records.get(start..end).map(|s| s.to_vec()).unwrap_or_default(),
    }
}

/// Sort then paginate, the way the record table is displayed
pub fn table_page(records: &[NormalizedRecord], sort: SortConfig, page: usize, page_size: usize) -> TablePage {
    paginate(&sort_records(records, sort), page, page_size)
}

/// Failed checks, in collection order, for the incident list
pub fn failed_incidents(records: &[NormalizedRecord]) -> Vec<NormalizedRecord> {
    records.iter().filter(|r| r.is_fail()).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ComplianceFlag;

    fn rec(date: &str, shift: &str, flag: Option<ComplianceFlag>) -> NormalizedRecord {
        NormalizedRecord {
            date: date.to_string(),
            shift: shift.to_string(),
            compliance: flag,
            ..Default::default()
        }
    }

    fn numbered(n: usize) -> Vec<NormalizedRecord> {
        (1..=n).map(|i| rec(&format!("2024-03-{:02}", i), "A", None)).collect()
    }

    #[test]
    fn test_default_sort_is_newest_first() {
        let records = vec![rec("2024-03-01", "A", None), rec("2024-03-03", "A", None), rec("2024-03-02", "A", None)];
        let dates: Vec<String> = sort_records(&records, SortConfig::default()).into_iter().map(|r| r.date).collect();
        assert_eq!(dates, vec!["2024-03-03", "2024-03-02", "2024-03-01"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let records = vec![rec("1", "B", None), rec("2", "A", None), rec("3", "B", None)];
        let sort = SortConfig { field: RecordField::Shift, direction: SortDirection::Asc };
        let dates: Vec<String> = sort_records(&records, sort).into_iter().map(|r| r.date).collect();
        assert_eq!(dates, vec!["2", "1", "3"]);
    }

    #[test]
    fn test_request_sort_toggles() {
        let sort = SortConfig::default().request(RecordField::Shift);
        assert_eq!(sort.direction, SortDirection::Asc);
        let sort = sort.request(RecordField::Shift);
        assert_eq!(sort.direction, SortDirection::Desc);
        let sort = sort.request(RecordField::Shift);
        assert_eq!(sort.direction, SortDirection::Asc);
        assert_eq!(SortDirection::Asc.toggled(), SortDirection::Desc);
    }

    #[test]
    fn test_paginate_pages_and_clamps() {
        let records = numbered(23);
        let first = paginate(&records, 1, 10);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.records.len(), 10);
        assert_eq!(first.records[0].date, "2024-03-01");

        let last = paginate(&records, 3, 10);
        assert_eq!(last.records.len(), 3);

        let beyond = paginate(&records, 9, 10);
        assert_eq!(beyond.page, 3);

        let zero = paginate(&records, 0, 10);
        assert_eq!(zero.page, 1);
    }

    #[test]
    fn test_paginate_empty() {
        let page = paginate(&[], 1, 10);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.page, 1);
        assert!(page.records.is_empty());
    }

    #[test]
    fn test_failed_incidents() {
        let records = vec![
            rec("1", "A", Some(ComplianceFlag::Fail)),
            rec("2", "A", Some(ComplianceFlag::Pass)),
            rec("3", "A", None),
            rec("4", "A", Some(ComplianceFlag::Fail)),
        ];
        let dates: Vec<String> = failed_incidents(&records).into_iter().map(|r| r.date).collect();
        assert_eq!(dates, vec!["1", "4"]);
    }
}
