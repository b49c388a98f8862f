use chrono::{DateTime, Months, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::utils::CacheError;

/// Unit of a cache time-to-live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Months,
    Weeks,
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl TimeUnit {
    pub const ALL: [TimeUnit; 6] = [
        TimeUnit::Months,
        TimeUnit::Weeks,
        TimeUnit::Days,
        TimeUnit::Hours,
        TimeUnit::Minutes,
        TimeUnit::Seconds,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Months => "months",
            TimeUnit::Weeks => "weeks",
            TimeUnit::Days => "days",
            TimeUnit::Hours => "hours",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Seconds => "seconds",
        }
    }

    fn names() -> String {
        Self::ALL
            .iter()
            .map(|u| u.as_str())
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl FromStr for TimeUnit {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|u| u.as_str() == s)
            .ok_or_else(|| {
                CacheError::InvalidDuration(format!(
                    "unknown unit '{}', must be one of ({})",
                    s,
                    Self::names()
                ))
            })
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time-to-live of cache entries
///
/// A value of zero means entries never expire. In configuration files this is
/// written as a table with at most one key, e.g. `duration = { days = 1 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, u64>", into = "BTreeMap<String, u64>")]
pub struct Expiry {
    unit: TimeUnit,
    value: u64,
}

impl Expiry {
    pub const NEVER: Expiry = Expiry {
        unit: TimeUnit::Seconds,
        value: 0,
    };

    pub fn new(unit: TimeUnit, value: u64) -> Self {
        Self { unit, value }
    }

    pub fn months(value: u64) -> Self {
        Self::new(TimeUnit::Months, value)
    }

    pub fn weeks(value: u64) -> Self {
        Self::new(TimeUnit::Weeks, value)
    }

    pub fn days(value: u64) -> Self {
        Self::new(TimeUnit::Days, value)
    }

    pub fn hours(value: u64) -> Self {
        Self::new(TimeUnit::Hours, value)
    }

    pub fn minutes(value: u64) -> Self {
        Self::new(TimeUnit::Minutes, value)
    }

    pub fn seconds(value: u64) -> Self {
        Self::new(TimeUnit::Seconds, value)
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn is_never(&self) -> bool {
        self.value < 1
    }

    /// Instant at which an entry created at `created` stops being served
    ///
    /// `None` if entries never expire, including when the deadline is beyond
    /// what the calendar can represent.
    pub fn expires_at(&self, created: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.is_never() {
            return None;
        }
        let value = i64::try_from(self.value).ok()?;
        let delta = match self.unit {
            TimeUnit::Months => {
                let months = u32::try_from(self.value).ok()?;
                return created.checked_add_months(Months::new(months));
            }
            TimeUnit::Weeks => TimeDelta::try_weeks(value)?,
            TimeUnit::Days => TimeDelta::try_days(value)?,
            TimeUnit::Hours => TimeDelta::try_hours(value)?,
            TimeUnit::Minutes => TimeDelta::try_minutes(value)?,
            TimeUnit::Seconds => TimeDelta::try_seconds(value)?,
        };
        created.checked_add_signed(delta)
    }

    /// The deadline itself still counts as fresh
    pub fn is_expired(&self, created: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.expires_at(created)
            .map(|deadline| deadline < now)
            .unwrap_or(false)
    }
}

impl Default for Expiry {
    fn default() -> Self {
        Self::NEVER
    }
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_never() {
            f.write_str("never")
        } else {
            write!(f, "{} {}", self.value, self.unit)
        }
    }
}

impl TryFrom<BTreeMap<String, u64>> for Expiry {
    type Error = CacheError;

    fn try_from(table: BTreeMap<String, u64>) -> Result<Self, Self::Error> {
        let mut entries = table.into_iter();
        let Some((unit, value)) = entries.next() else {
            return Ok(Self::NEVER);
        };
        if entries.next().is_some() {
            return Err(CacheError::InvalidDuration(format!(
                "only one of ({}) may be set",
                TimeUnit::names()
            )));
        }
        Ok(Self::new(unit.parse()?, value))
    }
}

impl From<Expiry> for BTreeMap<String, u64> {
    fn from(expiry: Expiry) -> Self {
        let mut table = BTreeMap::new();
        if !expiry.is_never() {
            table.insert(expiry.unit.as_str().to_string(), expiry.value);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_zero_never_expires() {
        let expiry = Expiry::days(0);
        assert!(expiry.is_never());
        assert_eq!(expiry.expires_at(at(0)), None);
        assert!(!expiry.is_expired(at(0), at(i32::MAX as i64)));
    }

    #[test]
    fn test_boundary_is_not_expired() {
        let expiry = Expiry::seconds(1);
        let created = at(1_000);
        assert!(!expiry.is_expired(created, at(1_000)));
        assert!(!expiry.is_expired(created, at(1_001)));
        assert!(expiry.is_expired(created, at(1_002)));
    }

    #[test]
    fn test_unit_arithmetic() {
        let created = Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap();
        assert_eq!(
            Expiry::months(1).expires_at(created),
            Some(Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap())
        );
        assert_eq!(
            Expiry::weeks(2).expires_at(created),
            Some(Utc.with_ymd_and_hms(2024, 2, 14, 12, 0, 0).unwrap())
        );
        assert_eq!(
            Expiry::hours(13).expires_at(created),
            Some(Utc.with_ymd_and_hms(2024, 2, 1, 1, 0, 0).unwrap())
        );
        assert_eq!(
            Expiry::minutes(90).expires_at(created),
            Some(Utc.with_ymd_and_hms(2024, 1, 31, 13, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_overflow_never_expires() {
        let expiry = Expiry::weeks(u64::MAX);
        assert_eq!(expiry.expires_at(at(0)), None);
        assert!(!expiry.is_expired(at(0), at(i32::MAX as i64)));
    }

    #[test]
    fn test_table_conversion() {
        let empty = BTreeMap::new();
        assert_eq!(Expiry::try_from(empty).unwrap(), Expiry::NEVER);

        let one = BTreeMap::from([("hours".to_string(), 6)]);
        assert_eq!(Expiry::try_from(one).unwrap(), Expiry::hours(6));

        let two = BTreeMap::from([("hours".to_string(), 6), ("days".to_string(), 1)]);
        assert!(matches!(
            Expiry::try_from(two),
            Err(CacheError::InvalidDuration(_))
        ));

        let unknown = BTreeMap::from([("fortnights".to_string(), 1)]);
        assert!(matches!(
            Expiry::try_from(unknown),
            Err(CacheError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(Expiry::NEVER.to_string(), "never");
        assert_eq!(Expiry::days(3).to_string(), "3 days");
    }
}
