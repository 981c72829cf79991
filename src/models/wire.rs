//! Lenient field decoders for the messaging API. The backend serializes ids
//! and counters as numbers or numeric strings depending on the driver, and
//! read flags as booleans or 0/1.

use chrono::{ DateTime, NaiveDateTime, Utc };
use serde::de::{ self, Deserializer };
use serde::Deserialize;

const SQL_DATETIME: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Scalar {
    fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(n) => Some(*n),
            Scalar::Text(s) => s.trim().parse().ok(),
            Scalar::Bool(_) => None,
        }
    }
}

pub fn id<'de, D>(deserializer: D) -> Result<i64, D::Error> where D: Deserializer<'de> {
    let raw = Scalar::deserialize(deserializer)?;
    raw.as_i64().ok_or_else(|| de::Error::custom("expected a numeric id"))
}

pub fn optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where D: Deserializer<'de>
{
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(raw) =>
            raw
                .as_i64()
                .map(Some)
                .ok_or_else(|| de::Error::custom("expected a numeric id or null")),
    }
}

pub fn count<'de, D>(deserializer: D) -> Result<u32, D::Error> where D: Deserializer<'de> {
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(0),
        Some(raw) => {
            let n = raw.as_i64().ok_or_else(|| de::Error::custom("expected a count"))?;
            u32::try_from(n).map_err(|_| de::Error::custom(format!("count out of range: {}", n)))
        }
    }
}

pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error> where D: Deserializer<'de> {
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(false),
        Some(Scalar::Bool(b)) => Ok(b),
        Some(raw) =>
            raw
                .as_i64()
                .map(|n| n != 0)
                .ok_or_else(|| de::Error::custom("expected a boolean flag")),
    }
}

pub fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where D: Deserializer<'de>
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: '{}'", raw)))
}

/// SQL-style `YYYY-MM-DD HH:MM:SS` values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, SQL_DATETIME)
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_both_timestamp_styles() {
        let expected = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(parse_timestamp("2026-01-02 03:04:05"), Some(expected));
        assert_eq!(parse_timestamp("2026-01-02T05:04:05+02:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[derive(Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "optional_id")]
        listing: Option<i64>,
        #[serde(default, deserialize_with = "flag")]
        read: bool,
    }

    #[test]
    fn blank_listing_is_none() {
        let row: Row = serde_json::from_str(r#"{"listing": "", "read": "1"}"#).unwrap();
        assert_eq!(row.listing, None);
        assert!(row.read);

        let row: Row = serde_json::from_str(r#"{"listing": "12", "read": false}"#).unwrap();
        assert_eq!(row.listing, Some(12));
        assert!(!row.read);
    }

    #[test]
    fn rejects_non_numeric_listing() {
        assert!(serde_json::from_str::<Row>(r#"{"listing": "abc"}"#).is_err());
    }
}
