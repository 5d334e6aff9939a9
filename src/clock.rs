//! Record identity and time source.
//!
//! Every record gets a UUID v4 string id and a `createdAt` timestamp taken
//! from a [`Clock`]. Timestamps are truncated to millisecond precision so they
//! survive a JSON round trip unchanged.

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use std::cell::Cell;
use uuid::Uuid;

/// Generate a fresh record identifier
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Current instant at the precision stored in `createdAt`
    fn timestamp(&self) -> DateTime<Utc> {
        self.now().trunc_subsecs(3)
    }

    /// Calendar day used for `date` fields (UTC)
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Used by tests and by callers that
/// want to evaluate views at a chosen instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Cell::new(now) }
    }

    pub fn advance(&self, by: chrono::TimeDelta) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Serde adapter for `createdAt`: RFC 3339 in UTC with millisecond precision,
/// e.g. `2024-05-01T08:30:00.000Z`.
pub mod timestamp_format {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
