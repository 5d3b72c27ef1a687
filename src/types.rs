use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One sheet row as delivered by the feed. Keys are column headers and are not
/// trusted to be stable in name or case.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Outcome of a single control-point check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplianceFlag {
    Pass,
    Fail,
}

impl ComplianceFlag {
    /// Interpret the form's compliance marker. `Yes`/`No` is what the sheet
    /// records; `Pass`/`Fail` is accepted so normalized output re-reads cleanly.
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker.trim().to_ascii_lowercase().as_str() {
            "yes" | "pass" => Some(ComplianceFlag::Pass),
            "no" | "fail" => Some(ComplianceFlag::Fail),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceFlag::Pass => "Pass",
            ComplianceFlag::Fail => "Fail",
        }
    }
}

impl fmt::Display for ComplianceFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplianceFlag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComplianceFlag::from_marker(s).ok_or_else(|| format!("unknown compliance status '{}' (expected pass/fail/yes/no)", s))
    }
}

/// Canonical shape of a check record after ingestion
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecord {
    /// `YYYY-MM-DD` when parseable, otherwise the raw value
    pub date: String,
    /// `HH:mm` when parseable, otherwise the raw value
    pub time: String,
    pub shift: String,
    pub category: String,
    pub particulars: String,
    pub description: String,
    /// `None` when the row carries no recognizable Yes/No marker
    #[serde(rename = "complianceFlag")]
    pub compliance: Option<ComplianceFlag>,
    pub remarks: String,
    pub created_by: String,
    /// Unparsed image cell; resolved on demand by `pipeline::processing::images`
    pub image_ref: String,
}

impl NormalizedRecord {
    pub fn is_pass(&self) -> bool {
        self.compliance == Some(ComplianceFlag::Pass)
    }

    pub fn is_fail(&self) -> bool {
        self.compliance == Some(ComplianceFlag::Fail)
    }

    /// Text value of a column, as shown in tables and used for sorting
    pub fn value(&self, field: RecordField) -> &str {
        match field {
            RecordField::Date => &self.date,
            RecordField::Time => &self.time,
            RecordField::Shift => &self.shift,
            RecordField::Category => &self.category,
            RecordField::Particulars => &self.particulars,
            RecordField::Description => &self.description,
            RecordField::Compliance => self.compliance.map(|c| c.as_str()).unwrap_or(""),
            RecordField::Remarks => &self.remarks,
            RecordField::CreatedBy => &self.created_by,
            RecordField::ImageRef => &self.image_ref,
        }
    }
}

/// Columns of a normalized record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordField {
    Date,
    Time,
    Shift,
    Category,
    Particulars,
    Description,
    Compliance,
    Remarks,
    CreatedBy,
    ImageRef,
}

impl FromStr for RecordField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s.chars().filter(|c| c.is_ascii_alphanumeric()).collect::<String>().to_ascii_lowercase();
        match key.as_str() {
            "date" => Ok(RecordField::Date),
            "time" => Ok(RecordField::Time),
            "shift" => Ok(RecordField::Shift),
            "category" => Ok(RecordField::Category),
            "particulars" => Ok(RecordField::Particulars),
            "description" => Ok(RecordField::Description),
            "compliance" | "complianceflag" | "status" => Ok(RecordField::Compliance),
            "remarks" => Ok(RecordField::Remarks),
            "createdby" | "user" => Ok(RecordField::CreatedBy),
            "imageref" | "images" | "proof" => Ok(RecordField::ImageRef),
            _ => Err(format!("unknown column '{}'", s)),
        }
    }
}

/// Envelope returned by the sheet endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Vec<RawRecord>,
}
