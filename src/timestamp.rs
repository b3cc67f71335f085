//! Strict parsing of upstream publication timestamps.
//!
//! Only full, zoned date-times in the ISO-8601 profile are accepted:
//! `2025-08-02T08:00:00Z`, `2025-08-02T10:00:00.123+02:00`, `2025-08-02T08:00Z`
//! (seconds may be left out), and the zoned form with a trailing region id,
//! `2025-08-02T10:00:00+02:00[Europe/Paris]`.  Anything else is unparseable
//! and yields `None`; there is no lenient fallback and no defaulting to the
//! epoch.

use chrono::{DateTime, FixedOffset, Utc};
use tracing::trace;

/// Parse a publication timestamp into a comparable UTC instant.
///
/// `None` input, the empty string, a missing offset, a date and time not
/// joined by `T`, or any malformed component all return `None`.  Never panics.
pub fn parse(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    let parsed = strip_region_id(raw)
        .filter(|s| has_time_designator(s))
        .and_then(parse_offset_date_time)
        .map(|dt| dt.with_timezone(&Utc));
    if parsed.is_none() {
        trace!(raw, "unparseable timestamp");
    }
    parsed
}

/// Drop a `[Region/City]` suffix.  The offset before it still has to be
/// present, so `2025-08-02T10:00:00[Europe/Paris]` stays unparseable.  An
/// empty or unopened bracket rejects the whole value.
fn strip_region_id(raw: &str) -> Option<&str> {
    let Some(inner) = raw.strip_suffix(']') else {
        return Some(raw);
    };
    let open = inner.rfind('[')?;
    if open + 1 == inner.len() {
        return None;
    }
    Some(&raw[..open])
}

/// `chrono`'s RFC 3339 parser also takes a space between date and time.
fn has_time_designator(s: &str) -> bool {
    s.as_bytes()
        .get(10)
        .is_some_and(|b| b.eq_ignore_ascii_case(&b'T'))
}

fn parse_offset_date_time(s: &str) -> Option<DateTime<FixedOffset>> {
    let mut normalized = s.to_ascii_uppercase();
    if let Some(head) = normalized.strip_suffix('Z') {
        normalized = format!("{head}+00:00");
    }
    DateTime::parse_from_rfc3339(&normalized)
        // Seconds are optional in ISO-8601 but not in RFC 3339.
        .or_else(|_| DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M%:z"))
        .ok()
}
