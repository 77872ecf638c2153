//! Calendar-day bucketing key
//!
//! Events and transparency-log snapshots are grouped by UTC calendar day.
//! `DateKey` is the `YYYY-MM-DD` key with a validating parser, so malformed
//! dates are rejected at the boundary instead of leaking into queries.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A `YYYY-MM-DD` day key in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// The day key for a UTC timestamp.
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.date_naive())
    }

    /// Wrap a calendar date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    /// The underlying calendar date.
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The following day, if representable.
    pub fn next(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl std::str::FromStr for DateKey {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").map(Self)
    }
}

impl TryFrom<String> for DateKey {
    type Error = chrono::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateKey> for String {
    fn from(value: DateKey) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_from_datetime_uses_utc_day() {
        let at = Utc.with_ymd_and_hms(2026, 1, 7, 23, 59, 59).unwrap();
        assert_eq!(DateKey::from_datetime(at).to_string(), "2026-01-07");
    }

    #[test]
    fn test_parse_roundtrip() {
        let key: DateKey = "2026-01-07".parse().unwrap();
        assert_eq!(key.to_string(), "2026-01-07");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("2026-1-7".parse::<DateKey>().is_err());
        assert!("not-a-date".parse::<DateKey>().is_err());
        assert!("2026-13-01".parse::<DateKey>().is_err());
    }

    #[test]
    fn test_next_day() {
        let key: DateKey = "2026-01-31".parse().unwrap();
        assert_eq!(key.next().unwrap().to_string(), "2026-02-01");
    }

    #[test]
    fn test_ordering_matches_calendar() {
        let a: DateKey = "2026-01-07".parse().unwrap();
        let b: DateKey = "2026-01-08".parse().unwrap();
        assert!(a < b);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    proptest! {
        /// Property: round-trip through the string representation preserves
        /// the key.
        #[test]
        fn test_display_parse_roundtrip(
            year in 1970i32..2100,
            month in 1u32..=12,
            day in 1u32..=28,
        ) {
            let key = DateKey::from_date(
                NaiveDate::from_ymd_opt(year, month, day).unwrap(),
            );
            let parsed: DateKey = key.to_string().parse().unwrap();
            prop_assert_eq!(parsed, key);
        }

        /// Property: key ordering matches timestamp ordering for same-format
        /// instants.
        #[test]
        fn test_ordering_matches_timestamps(a in 0i64..4_000_000_000, b in 0i64..4_000_000_000) {
            let at_a = Utc.timestamp_opt(a, 0).unwrap();
            let at_b = Utc.timestamp_opt(b, 0).unwrap();
            let key_a = DateKey::from_datetime(at_a);
            let key_b = DateKey::from_datetime(at_b);
            if key_a < key_b {
                prop_assert!(at_a < at_b);
            }
        }
    }
}
