//! Timestamp parsing and formatting for date-valued document fields.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Layouts the Management API and hand-written payloads use, tried in order
/// after RFC 3339.
const NAIVE_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parses a timestamp string. Offsets are normalized to UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_utc());
    }

    NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Formats `timestamp` with a strftime `format`.
///
/// Returns `None` when the format string contains an invalid specifier, since
/// chrono would otherwise panic while rendering it.
pub(crate) fn format_timestamp(timestamp: &NaiveDateTime, format: &str) -> Option<String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return None;
    }
    Some(timestamp.format_with_items(items.into_iter()).to_string())
}

/// Parses `raw` and re-renders it with `format`.
pub(crate) fn reformat(raw: &str, format: &str) -> Option<String> {
    parse_timestamp(raw).and_then(|timestamp| format_timestamp(&timestamp, format))
}
