pub mod datetime;

use chrono::{FixedOffset, Offset, Utc};
use tracing::{debug, warn};

use crate::config::NormalizeConfig;
use crate::constants::{
    CATEGORY_KEYS, COMPLIANCE_KEYS, CREATED_BY_KEYS, DATE_KEYS, DESCRIPTION_KEYS, IMAGE_KEYS, PARTICULARS_KEYS,
    REMARKS_KEYS, SHIFT_KEYS, TIME_KEYS,
};
use crate::observability::metrics;
use crate::pipeline::processing::field_resolver::{contains_absolute_url, FieldResolver};
use crate::types::{ComplianceFlag, NormalizedRecord, RawRecord};

use self::datetime::{normalize_date, normalize_time};

/// Trait for turning raw sheet rows into canonical records
pub trait Normalizer {
    /// Produce exactly one record per row. Never fails: missing fields become
    /// empty strings and unparseable dates/times keep their raw text.
    fn normalize(&self, raw: &RawRecord) -> NormalizedRecord;

    /// Normalize a whole feed payload, preserving row order
    fn normalize_batch(&self, rows: &[RawRecord]) -> Vec<NormalizedRecord> {
        let records: Vec<NormalizedRecord> = rows.iter().map(|row| self.normalize(row)).collect();
        metrics::normalize::batch_processed(records.len());
        records
    }
}

/// Default normalizer using the column alias lists from `constants`
#[derive(Debug, Clone)]
pub struct DefaultNormalizer {
    /// Offset used when rendering timestamps as `HH:mm`
    pub time_offset: FixedOffset,
}

impl DefaultNormalizer {
    pub fn new() -> Self {
        Self { time_offset: utc() }
    }

    pub fn with_config(config: &NormalizeConfig) -> Self {
        let time_offset = config
            .time_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                warn!(
                    "Invalid time offset of {} minutes, rendering times in UTC",
                    config.time_offset_minutes
                );
                utc()
            });
        Self { time_offset }
    }
}

impl Default for DefaultNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer for DefaultNormalizer {
    fn normalize(&self, raw: &RawRecord) -> NormalizedRecord {
        let fields = FieldResolver::new(raw);

        let raw_date = fields.get_untrimmed(DATE_KEYS).unwrap_or_default();
        let date = if raw_date.is_empty() {
            raw_date
        } else {
            let (date, parsed) = normalize_date(&raw_date);
            if !parsed {
                warn!("Date parsing failed, keeping raw value: {}", raw_date);
                metrics::normalize::date_kept_raw();
            }
            date
        };

        let raw_time = fields.get_untrimmed(TIME_KEYS).unwrap_or_default();
        let time = if raw_time.is_empty() {
            raw_time
        } else {
            let (time, parsed) = normalize_time(&raw_time, &self.time_offset);
            if !parsed {
                warn!("Time parsing failed, keeping raw value: {}", raw_time);
                metrics::normalize::time_kept_raw();
            }
            time
        };

        let compliance = fields
            .get(COMPLIANCE_KEYS)
            .and_then(|marker| ComplianceFlag::from_marker(&marker));
        if compliance.is_none() {
            debug!("Row has no recognizable compliance marker");
        }

        metrics::normalize::record_normalized();

        NormalizedRecord {
            date,
            time,
            shift: fields.get_or_empty(SHIFT_KEYS),
            category: fields.get_or_empty(CATEGORY_KEYS),
            particulars: fields.get_or_empty(PARTICULARS_KEYS),
            description: fields.get_or_empty(DESCRIPTION_KEYS),
            compliance,
            remarks: fields.get_or_empty(REMARKS_KEYS),
            created_by: fields.get_or_empty(CREATED_BY_KEYS),
            image_ref: fields
                .get_or_scan(IMAGE_KEYS, contains_absolute_url)
                .unwrap_or_default(),
        }
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}
