use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::CoreError;

/// Parse an RFC3339 timestamp belonging to the record `id`.
pub fn parse_ts(id: &str, value: &str) -> Result<OffsetDateTime, CoreError> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map_err(|e| CoreError::invalid_timestamp(id, value, e))
}

pub fn format_ts(ts: OffsetDateTime) -> String {
    ts.format(&Rfc3339)
        .expect("RFC3339 formatting should not fail")
}

pub fn now_rfc3339() -> String {
    format_ts(OffsetDateTime::now_utc())
}

/// "2025-01-08T09:20:00Z" -> "2025-01-08 09:20"
pub fn short_ts(ts: &str) -> String {
    if ts.len() >= 16 {
        format!("{} {}", &ts[..10], &ts[11..16])
    } else {
        ts.to_string()
    }
}
