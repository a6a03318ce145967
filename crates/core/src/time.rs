//! Date input parsing.
//!
//! Clients send either full RFC 3339 timestamps or bare calendar dates
//! (`YYYY-MM-DD`, as produced by HTML date inputs). Bare dates are read as
//! midnight UTC.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DomainError;

/// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date.
pub fn parse_date(input: &str) -> Result<DateTime<Utc>, DomainError> {
    let trimmed = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| DomainError::validation(format!("invalid date: '{input}'")))
}

/// A date accepted in either of the formats understood by [`parse_date`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlexibleDate(pub DateTime<Utc>);

impl FlexibleDate {
    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }
}

impl From<FlexibleDate> for DateTime<Utc> {
    fn from(value: FlexibleDate) -> Self {
        value.0
    }
}

impl<'de> Deserialize<'de> for FlexibleDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_date(&raw).map(FlexibleDate).map_err(serde::de::Error::custom)
    }
}

impl Serialize for FlexibleDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn bare_date_is_midnight_utc() {
        let parsed = parse_date("2024-03-05").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap());
    }

    #[test]
    fn rfc3339_offset_is_normalized() {
        let parsed = parse_date("2024-03-05T10:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap());
    }

    #[test]
    fn garbage_is_a_validation_error() {
        assert!(matches!(parse_date("next tuesday"), Err(DomainError::Validation(_))));
        assert!(matches!(parse_date(""), Err(DomainError::Validation(_))));
    }

    #[test]
    fn deserializes_from_json_string() {
        let d: FlexibleDate = serde_json::from_str("\"2024-12-31\"").unwrap();
        assert_eq!(d.into_inner(), Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap());
        assert!(serde_json::from_str::<FlexibleDate>("42").is_err());
    }
}
