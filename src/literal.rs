//! Tagged literals for date and time types.
//!
//! Use the [`date`] and [`timestamp`] modules with `#[serde(with = "...")]` to write
//! chrono values as `@date("...")` and `@timestamp("...")` literals. Reading accepts the
//! literal or a plain string.
//!
//! ```rust
//! use chrono::NaiveDateTime;
//! use serde::{Deserialize, Serialize};
//! use serde_ziggy::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Message {
//!     #[serde(with = "serde_ziggy::literal::date")]
//!     sent: NaiveDateTime,
//! }
//!
//! let message: Message = from_str(r#".sent = @date("2025-10-25T11:34")"#).unwrap();
//! assert_eq!(
//!     to_string(&message).unwrap(),
//!     "{\n    .sent = @date(\"2025-10-25T11:34:00\"),\n}"
//! );
//! ```
//!
//! [`date_converter`] normalizes `@date` payloads at parse time when registered with
//! [`Parser::literal`](crate::Parser::literal).

use crate::error::BoxError;
use crate::{Error, Result, TaggedLiteral, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

pub const DATE_TAG: &str = "date";
pub const TIMESTAMP_TAG: &str = "timestamp";

const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses an ISO 8601 local date-time, with or without seconds, or a bare date.
///
/// # Errors
///
/// Returns an error if `text` matches none of the accepted formats.
pub fn parse_datetime(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim();
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| Error::custom(format!("invalid date {:?}", text)))
}

/// Converter for `@date` literals: validates the payload and keeps a normalized literal.
///
/// # Examples
///
/// ```rust
/// use serde_ziggy::literal::date_converter;
/// use serde_ziggy::{Parser, TaggedLiteral, Value};
///
/// let parser = Parser::new().literal("date", date_converter);
/// let value = parser.parse(r#"@date("2025-10-25 11:34")"#).unwrap();
/// assert_eq!(value, Value::Tagged(TaggedLiteral::new("date", "2025-10-25T11:34:00")));
/// assert!(parser.parse(r#"@date("yesterday")"#).is_err());
/// ```
pub fn date_converter(payload: &str) -> std::result::Result<Value, BoxError> {
    let dt = parse_datetime(payload)?;
    Ok(Value::Tagged(TaggedLiteral::new(
        DATE_TAG,
        dt.format(DATE_FORMAT).to_string(),
    )))
}

/// `NaiveDateTime` as `@date("YYYY-MM-DDTHH:MM:SS")`.
pub mod date {
    use super::{parse_datetime, DATE_FORMAT, DATE_TAG};
    use crate::TaggedLiteral;
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        TaggedLiteral::new(DATE_TAG, dt.format(DATE_FORMAT).to_string()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        parse_datetime(&text).map_err(de::Error::custom)
    }
}

/// `DateTime<Utc>` as an RFC 3339 `@timestamp(...)`.
pub mod timestamp {
    use super::TIMESTAMP_TAG;
    use crate::TaggedLiteral;
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let payload = dt.to_rfc3339_opts(SecondsFormat::AutoSi, true);
        TaggedLiteral::new(TIMESTAMP_TAG, payload).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        super::parse_timestamp(&text).map_err(de::Error::custom)
    }
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::custom(format!("invalid timestamp {:?}: {}", text, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{from_str, to_string, Parser};
    use chrono::TimeZone;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Entry {
        #[serde(with = "date")]
        day: NaiveDateTime,
        #[serde(with = "timestamp")]
        at: DateTime<Utc>,
    }

    #[test]
    fn test_parse_datetime_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 10, 25)
            .and_then(|d| d.and_hms_opt(11, 34, 0))
            .unwrap();
        for text in ["2025-10-25T11:34", "2025-10-25T11:34:00", "2025-10-25 11:34", " 2025-10-25T11:34:00.000 "] {
            assert_eq!(parse_datetime(text).unwrap(), expected, "{}", text);
        }
        assert_eq!(
            parse_datetime("2025-10-25").unwrap(),
            NaiveDate::from_ymd_opt(2025, 10, 25).and_then(|d| d.and_hms_opt(0, 0, 0)).unwrap()
        );
        assert!(parse_datetime("25/10/2025").is_err());
    }

    #[test]
    fn test_entry_round_trip() {
        let entry = Entry {
            day: parse_datetime("2024-03-10").unwrap(),
            at: Utc.with_ymd_and_hms(2024, 3, 10, 15, 39, 28).unwrap(),
        };
        let text = to_string(&entry).unwrap();
        assert_eq!(
            text,
            "{\n    .day = @date(\"2024-03-10T00:00:00\"),\n    .at = @timestamp(\"2024-03-10T15:39:28Z\"),\n}"
        );
        let back: Entry = from_str(&text).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_converter_rejects_bad_payload() {
        let parser = Parser::new().literal(DATE_TAG, date_converter);
        let err = parser.parse(r#"[@date("not a date")]"#).unwrap_err();
        assert!(matches!(err, Error::Callback(_)));
        assert_eq!(err.to_string(), "invalid date \"not a date\"");
    }
}
