//! Vendor timestamps: offset-less local times and the 1900 "no value" sentinel.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone};
use std::fmt::Display;

/// Format used by the vendor for inbound timestamps (local time, no offset).
pub const VENDOR_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a vendor timestamp. Accepts the offset-less vendor form (optionally with
/// fractional seconds) and falls back to RFC3339, keeping the local wall-clock time.
pub fn parse_vendor_timestamp(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|e| DateTime::parse_from_rfc3339(raw).map(|dt| dt.naive_local()).map_err(|_| e))
}

/// The vendor reports "no value" as 1900-01-01T00:00:00.
pub fn is_unset(ts: &NaiveDateTime) -> bool {
    ts.date() <= NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Drop the vendor's "no value" sentinel.
pub fn unless_unset(ts: Option<NaiveDateTime>) -> Option<NaiveDateTime> {
    ts.filter(|t| !is_unset(t))
}

/// RFC3339 with offset at second precision, e.g. `2024-03-01T18:30:00+01:00`.
pub fn format_rfc3339<Tz>(ts: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    ts.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Serde adapter for optional vendor timestamps. Null, missing and empty strings decode as `None`.
pub mod vendor_timestamp {
    use super::{VENDOR_TIMESTAMP_FORMAT, parse_vendor_timestamp};
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.format(VENDOR_TIMESTAMP_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if !raw.trim().is_empty() => parse_vendor_timestamp(&raw)
                .map(Some)
                .map_err(|e| serde::de::Error::custom(format!("invalid timestamp {raw:?}: {e}"))),
            _ => Ok(None),
        }
    }
}
