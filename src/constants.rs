/// Column header aliases for each canonical field, tried in order. The first
/// entry is the header the form currently produces.
pub const DATE_KEYS: &[&str] = &["Date", "date", "DATE", "Entry Date"];
pub const TIME_KEYS: &[&str] = &["Time", "time", "TIME", "Entry Time"];
pub const SHIFT_KEYS: &[&str] = &["Shift", "shift", "SHIFT"];
pub const CATEGORY_KEYS: &[&str] = &["Category", "category", "CATEGORY"];
pub const PARTICULARS_KEYS: &[&str] = &["Particulars", "particulars", "Particular"];
pub const DESCRIPTION_KEYS: &[&str] = &["Description", "description", "Details"];
// "Dropdown" is the form's name for the Yes/No compliance answer
pub const COMPLIANCE_KEYS: &[&str] = &["Dropdown", "dropdown", "Status", "status", "Compliance", "Compliant"];
pub const REMARKS_KEYS: &[&str] = &["Remarks", "remarks", "Remark", "Comments"];
pub const CREATED_BY_KEYS: &[&str] = &["Created By", "created by", "CreatedBy", "createdBy", "Created by", "User"];

/// Fields most likely to hold an image link, checked before scanning the whole row.
pub const IMAGE_KEYS: &[&str] = &[
    "Images",
    "Image",
    "Proof",
    "URL",
    "images",
    "image",
    "proof",
    "url",
    "View Image",
    "View URL",
];

/// Direct-view form for Google Drive files
pub const DRIVE_DIRECT_VIEW_PREFIX: &str = "https://docs.google.com/uc?export=view&id=";

/// Feed envelope status meaning the payload is usable
pub const FEED_STATUS_SUCCESS: &str = "success";

/// KPI risk above this percentage is flagged critical
pub const CRITICAL_RISK_PERCENT: f64 = 10.0;
/// Category compliance below this percentage is critical
pub const CRITICAL_COMPLIANCE_PERCENT: f64 = 80.0;
/// Category compliance below this percentage (and not critical) needs caution
pub const CAUTION_COMPLIANCE_PERCENT: f64 = 95.0;

pub const DEFAULT_PAGE_SIZE: usize = 10;

pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_OF_DAY_FORMAT: &str = "%H:%M";
