use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Parse a user-supplied `--from`/`--to` date.
///
/// Accepts `YYYY-MM-DDTHH:MM:SSZ`, `YYYY-MM-DDTHH:MM:SS` or `YYYY-MM-DD`
/// (midnight UTC). Anything else is a usage error.
pub fn parse_iso_date(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%SZ") {
        return Ok(Utc.from_utc_datetime(&dt));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&dt));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }
    bail!("Cannot parse date: {:?} (expected YYYY-MM-DDTHH:MM:SSZ or YYYY-MM-DD)", s)
}

/// Parse a stored ISO 8601 timestamp, e.g. `2026-02-12T03:52:07.396Z`.
///
/// Fractional seconds and explicit offsets are handled; a naive timestamp is
/// taken as UTC. Returns `None` on anything unparseable - missing timestamps
/// are normal in this data, never an error.
pub fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    if ts.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Format a timestamp as ISO 8601 UTC without fractional seconds.
pub fn dt_to_iso(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Format a Unix-millisecond timestamp as ISO 8601 UTC.
///
/// Out-of-range values yield an empty string.
pub fn ms_to_iso(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms).map(|dt| dt_to_iso(&dt)).unwrap_or_default()
}

/// Extract Unix milliseconds from a JSON value that should be a number.
///
/// OpenCode writes `time.created` as an integer, but floats occur in older
/// session files. Non-numeric values map to `None`.
pub fn json_millis(value: Option<&serde_json::Value>) -> Option<i64> {
    let number = value?.as_number()?;
    number.as_i64().or_else(|| number.as_f64().map(|f| f as i64))
}
