use std::sync::OnceLock;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use regex::Regex;
use tracing::warn;

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

// ── Timestamp parsing ─────────────────────────────────────────────────────────

/// Parse an ISO 8601 / RFC 3339 timestamp string into a UTC [`DateTime`].
///
/// Handles the `Z` suffix, fixed offsets and naive date-times (read as UTC).
/// Returns `None` for empty strings or unrecognised formats.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let normalised = if let Some(stripped) = s.strip_suffix('Z') {
        format!("{}+00:00", stripped)
    } else {
        s.to_string()
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
        return Some(dt.with_timezone(&Utc));
    }

    const FMTS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ];
    for fmt in FMTS {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    warn!("could not parse timestamp \"{}\"", s);
    None
}

/// Render a timestamp the way upload records store it
/// (`2024-05-01T10:20:30.123Z`).
pub fn to_record_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ── Snapshot identifiers ──────────────────────────────────────────────────────

/// Derive a snapshot id from an upload time.
///
/// The record timestamp with `:` and `.` replaced by `-` and the trailing `Z`
/// removed, e.g. `2024-05-01T10-20-30-123`.
pub fn snapshot_id_for(ts: DateTime<Utc>) -> String {
    let stamp = to_record_timestamp(ts).replace([':', '.'], "-");
    stamp.strip_suffix('Z').unwrap_or(&stamp).to_string()
}

/// Whether `id` only uses the characters snapshot ids are built from
/// (digits, `T`, `:` and `-`).
pub fn is_valid_snapshot_id(id: &str) -> bool {
    static SNAPSHOT_ID: OnceLock<Regex> = OnceLock::new();
    SNAPSHOT_ID
        .get_or_init(|| Regex::new(r"^[0-9T:-]+$").expect("valid snapshot id regex"))
        .is_match(id)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
