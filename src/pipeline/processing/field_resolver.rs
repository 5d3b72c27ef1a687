use serde_json::Value;

use crate::types::RawRecord;

/// Looks up logical fields in a raw sheet row whose headers drift over time.
///
/// Lookup order for a field:
/// 1. exact header match over the candidate aliases, in order
/// 2. case-insensitive, whitespace-trimmed header match over the same aliases
/// 3. (only with [`FieldResolver::get_or_scan`]) every column in sheet order,
///    returning the first value the caller's predicate accepts
///
/// Empty values never count as a match, so a blank `Date` column falls through
/// to `date` when both exist.
#[derive(Debug, Clone, Copy)]
pub struct FieldResolver<'a> {
    record: &'a RawRecord,
}

impl<'a> FieldResolver<'a> {
    pub fn new(record: &'a RawRecord) -> Self {
        Self { record }
    }

    /// First non-empty value among the candidate headers
    pub fn get(&self, candidates: &[&str]) -> Option<String> {
        self.lookup(candidates, value_as_text)
    }

    /// Like [`get`](Self::get), but the cell text is returned exactly as sent,
    /// surrounding whitespace included
    pub fn get_untrimmed(&self, candidates: &[&str]) -> Option<String> {
        self.lookup(candidates, value_as_raw_text)
    }

    /// Like [`get`](Self::get), but returns an empty string when nothing matches
    pub fn get_or_empty(&self, candidates: &[&str]) -> String {
        self.get(candidates).unwrap_or_default()
    }

    /// Candidate lookup with a last-resort scan of every column.
    ///
    /// The scan can pick up an unrelated column that happens to satisfy the
    /// predicate; callers choose predicates narrow enough to make that rare.
    pub fn get_or_scan<P>(&self, candidates: &[&str], predicate: P) -> Option<String>
    where
        P: Fn(&str) -> bool,
    {
        self.get(candidates).or_else(|| self.scan(predicate))
    }

    fn lookup(&self, candidates: &[&str], render: fn(&Value) -> Option<String>) -> Option<String> {
        self.exact(candidates, render)
            .or_else(|| self.case_insensitive(candidates, render))
    }

    fn exact(&self, candidates: &[&str], render: fn(&Value) -> Option<String>) -> Option<String> {
        candidates
            .iter()
            .filter_map(|key| self.record.get(*key))
            .find_map(render)
    }

    fn case_insensitive(&self, candidates: &[&str], render: fn(&Value) -> Option<String>) -> Option<String> {
        candidates.iter().find_map(|candidate| {
            let wanted = candidate.trim();
            self.record
                .iter()
                .filter(|(key, _)| key.trim().eq_ignore_ascii_case(wanted))
                .find_map(|(_, value)| render(value))
        })
    }

    fn scan<P>(&self, predicate: P) -> Option<String>
    where
        P: Fn(&str) -> bool,
    {
        self.record
            .values()
            .filter_map(value_as_text)
            .find(|text| predicate(text))
    }
}

/// Render a scalar cell as trimmed text. Nulls, blanks, arrays and objects
/// are not values.
pub fn value_as_text(value: &Value) -> Option<String> {
    value_as_raw_text(value).map(|text| text.trim().to_string())
}

/// Scalar cell text without trimming. Whitespace-only strings still count as
/// blank.
pub fn value_as_raw_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Predicate for [`FieldResolver::get_or_scan`]: the value contains an
/// absolute http(s) link somewhere.
pub fn contains_absolute_url(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("http://") || lower.contains("https://")
}
