//! Record id allocation and parsing.

use serde_json::Value;

use crate::collections::Record;

pub const ID_FIELD: &str = "id";

/// The integer `id` of a record, if it carries one.
pub fn record_id(record: &Record) -> Option<u64> {
    record.get(ID_FIELD).and_then(Value::as_u64)
}

/// `max(id) + 1`, or `1` when no record carries an id. Gaps left by deletes
/// are never reused. `None` once the highest id is `u64::MAX`.
pub fn next_id(records: &[Record]) -> Option<u64> {
    match records.iter().filter_map(record_id).max() {
        Some(max) => max.checked_add(1),
        None => Some(1),
    }
}

/// Lenient integer parsing for ids taken from a URL path segment.
///
/// Leading whitespace and a `+` sign are skipped and the leading run of
/// digits is used, so `"12abc"` is `12`. Anything without leading digits,
/// negative values and overflow give `None`.
pub fn parse_id(raw: &str) -> Option<u64> {
    let trimmed = raw.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    unsigned[..end].parse().ok()
}

/// Anything a record id can be looked up by.
pub trait IntoRecordId {
    fn into_record_id(self) -> Option<u64>;
}

impl IntoRecordId for u64 {
    fn into_record_id(self) -> Option<u64> { Some(self) }
}

impl IntoRecordId for &str {
    fn into_record_id(self) -> Option<u64> { parse_id(self) }
}
