//! Wall-clock time for the catalog.
//!
//! Everything that stamps an entry or ages a cache value asks a [`TimeProvider`] for the
//! current [`Time`], so tests can swap in a [`MockProvider`] and step the clock by hand.

use std::{ops::Add, str::FromStr, time::Duration};

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// A UTC timestamp returned by a [`TimeProvider`]
///
/// Serializes as an RFC 3339 string, which is how catalog documents carry their
/// `createdAt` and `updatedAt` fields.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Time(DateTime<Utc>);

impl Time {
    pub const MAX: Self = Self(DateTime::<Utc>::MAX_UTC);
    pub const MIN: Self = Self(DateTime::<Utc>::MIN_UTC);

    /// Makes a new `Time` from the number of non-leap milliseconds
    /// since January 1, 1970 0:00:00 UTC (aka "UNIX timestamp").
    ///
    /// Returns `None` if out of range
    pub fn from_timestamp_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self)
    }

    /// Makes a new `Time` from the provided [`DateTime<Utc>`]
    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Parse an RFC 3339 timestamp, converting any offset to UTC
    pub fn parse_rfc3339(s: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(s).map(|dt| Self(dt.with_timezone(&Utc)))
    }

    /// Returns an RFC 3339 and ISO 8601 date and time string such as `1996-12-19T16:39:57+00:00`.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }

    /// Returns the number of non-leap-milliseconds since January 1, 1970 UTC
    pub fn timestamp_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Returns the duration since the provided time or `None` if it would be negative
    pub fn checked_duration_since(&self, earlier: Self) -> Option<Duration> {
        self.0.signed_duration_since(earlier.0).to_std().ok()
    }

    /// Adds given [`Duration`] to the current date and time.
    ///
    /// Returns `None` if it would result in overflow
    pub fn checked_add(&self, duration: Duration) -> Option<Self> {
        let duration = chrono::Duration::from_std(duration).ok()?;
        self.0.checked_add_signed(duration).map(Self)
    }

    /// Returns `Time` as a [`DateTime<Utc>`]
    pub fn date_time(&self) -> DateTime<Utc> {
        self.0
    }
}

impl Add<Duration> for Time {
    type Output = Self;

    /// Saturates at [`Time::MAX`]
    fn add(self, rhs: Duration) -> Self::Output {
        self.checked_add(rhs).unwrap_or(Self::MAX)
    }
}

impl FromStr for Time {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_rfc3339(s)
    }
}

impl std::fmt::Debug for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

impl std::fmt::Display for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

pub trait TimeProvider: std::fmt::Debug + Send + Sync + 'static {
    /// Returns the current `Time`. No guarantees are made about monotonicity
    fn now(&self) -> Time;
}

/// A [`TimeProvider`] that uses [`Utc::now`] as a clock source
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProvider;

impl SystemProvider {
    pub fn new() -> Self {
        Self
    }
}

impl TimeProvider for SystemProvider {
    fn now(&self) -> Time {
        Time(Utc::now())
    }
}

/// A [`TimeProvider`] that returns a fixed `Time` that can be moved with [`MockProvider::set`]
/// or [`MockProvider::inc`]
#[derive(Debug)]
pub struct MockProvider {
    now: RwLock<Time>,
}

impl MockProvider {
    pub fn new(start: Time) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    pub fn set(&self, time: Time) {
        *self.now.write() = time
    }

    pub fn inc(&self, duration: Duration) -> Time {
        let mut now = self.now.write();
        *now = *now + duration;
        *now
    }
}

impl TimeProvider for MockProvider {
    fn now(&self) -> Time {
        *self.now.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn epoch_plus_secs(secs: i64) -> Time {
        Time::from_timestamp_millis(secs * 1_000).unwrap()
    }

    #[test]
    fn mock_provider_steps_forward() {
        let provider = MockProvider::new(epoch_plus_secs(0));
        assert_eq!(provider.now().timestamp_millis(), 0);

        let t = provider.inc(Duration::from_secs(90));
        assert_eq!(t, epoch_plus_secs(90));
        assert_eq!(provider.now(), epoch_plus_secs(90));

        provider.set(epoch_plus_secs(10));
        assert_eq!(provider.now(), epoch_plus_secs(10));
    }

    #[test]
    fn duration_since_is_none_when_negative() {
        let a = epoch_plus_secs(100);
        let b = epoch_plus_secs(160);
        assert_eq!(b.checked_duration_since(a), Some(Duration::from_secs(60)));
        assert_eq!(a.checked_duration_since(b), None);
    }

    #[test]
    fn add_saturates() {
        assert_eq!(Time::MAX + Duration::from_secs(1), Time::MAX);
    }

    #[test]
    fn rfc3339_round_trip_through_serde() {
        let t = Time::parse_rfc3339("2024-03-01T12:30:00+02:00").unwrap();
        assert_eq!(t.to_rfc3339(), "2024-03-01T10:30:00+00:00");

        let json = serde_json::to_string(&t).unwrap();
        let back: Time = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
