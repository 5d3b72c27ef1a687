//! Turns messy image cells into URLs a browser can load directly.
//!
//! Sheet cells hold anything from a bare link to a `HYPERLINK()` formula or a
//! comma-joined list of uploads. Google Drive sharing links are rewritten to
//! the direct-view endpoint; other absolute links (object storage, CDNs) pass
//! through untouched.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::constants::{DRIVE_DIRECT_VIEW_PREFIX, IMAGE_KEYS};
use crate::types::RawRecord;

/// First absolute link, stopping at quotes, commas, whitespace and closing brackets
static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)https?://[^"'\s,)}\]]+"#).expect("valid url regex"));

/// Drive sharing link layouts, each capturing the file id
static DRIVE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"drive\.google\.com/file/d/([^/?#&]+)",
        r"drive\.google\.com/open\?id=([^&#]+)",
        r"drive\.google\.com/uc\?id=([^&#]+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid drive regex"))
    .collect()
});

/// Splits a cell that may hold several links
static TOKEN_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,\s]+").expect("valid separator regex"));

/// Resolve a single raw value to a directly fetchable URL.
///
/// Returns `None` when the value contains no absolute http(s) link.
pub fn resolve_one(raw: &str) -> Option<String> {
    let located = URL_PATTERN.find(raw)?.as_str().trim();

    for pattern in DRIVE_PATTERNS.iter() {
        if let Some(id) = pattern.captures(located).and_then(|c| c.get(1)) {
            return Some(format!("{}{}", DRIVE_DIRECT_VIEW_PREFIX, id.as_str()));
        }
    }

    if located.to_ascii_lowercase().starts_with("http") {
        Some(located.to_string())
    } else {
        None
    }
}

/// Resolve every link in a cell, in order, without duplicates
pub fn resolve_all(raw: &str) -> Vec<String> {
    let mut found = Vec::new();
    collect_links(raw, &mut found);
    found
}

/// Resolve image links for a row when the image column is unknown.
///
/// Runs the default extractor chain: priority headers first, then a scan of
/// every column.
pub fn resolve_any(record: &RawRecord) -> Vec<String> {
    ImageResolver::default().resolve(record)
}

/// One strategy for finding image links in a raw row
pub trait ImageExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Distinct resolved links, in discovery order. Empty when nothing matched.
    fn extract(&self, record: &RawRecord) -> Vec<String>;
}

/// Looks only at headers that conventionally hold uploads
#[derive(Debug, Clone)]
pub struct PriorityKeyExtractor {
    keys: &'static [&'static str],
}

impl PriorityKeyExtractor {
    pub fn new(keys: &'static [&'static str]) -> Self {
        Self { keys }
    }
}

impl Default for PriorityKeyExtractor {
    fn default() -> Self {
        Self::new(IMAGE_KEYS)
    }
}

impl ImageExtractor for PriorityKeyExtractor {
    fn name(&self) -> &'static str {
        "priority_keys"
    }

    fn extract(&self, record: &RawRecord) -> Vec<String> {
        let mut found = Vec::new();
        for key in self.keys {
            if let Some(text) = record.get(*key).and_then(|v| v.as_str()) {
                collect_links(text, &mut found);
            }
        }
        found
    }
}

/// Checks every string column, in sheet order
#[derive(Debug, Clone, Default)]
pub struct ScanAllFieldsExtractor;

impl ImageExtractor for ScanAllFieldsExtractor {
    fn name(&self) -> &'static str {
        "scan_all_fields"
    }

    fn extract(&self, record: &RawRecord) -> Vec<String> {
        let mut found = Vec::new();
        for text in record.values().filter_map(|v| v.as_str()) {
            collect_links(text, &mut found);
        }
        found
    }
}

/// Ordered fallback chain of extractors; the first one that finds anything wins
pub struct ImageResolver {
    extractors: Vec<Box<dyn ImageExtractor>>,
}

impl ImageResolver {
    pub fn new(extractors: Vec<Box<dyn ImageExtractor>>) -> Self {
        Self { extractors }
    }

    pub fn resolve(&self, record: &RawRecord) -> Vec<String> {
        for extractor in &self.extractors {
            let found = extractor.extract(record);
            if !found.is_empty() {
                debug!(strategy = extractor.name(), count = found.len(), "Found image links");
                return found;
            }
        }
        Vec::new()
    }
}

impl Default for ImageResolver {
    fn default() -> Self {
        Self::new(vec![
            Box::new(PriorityKeyExtractor::default()),
            Box::new(ScanAllFieldsExtractor),
        ])
    }
}

fn collect_links(text: &str, found: &mut Vec<String>) {
    if !text.to_ascii_lowercase().contains("http") {
        return;
    }
    for token in TOKEN_SEPARATOR.split(text).filter(|t| !t.is_empty()) {
        if !token.to_ascii_lowercase().contains("http") {
            continue;
        }
        if let Some(url) = resolve_one(token) {
            if !found.contains(&url) {
                found.push(url);
            }
        }
    }
}
