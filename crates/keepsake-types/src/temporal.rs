use std::fmt;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Text layout of a [`Timestamp`], in Unicode date-pattern notation.
///
/// UTC instants render with a `Z` zone designator, e.g.
/// `2024-03-01T12:30:45.123Z`. Parsing also accepts numeric offsets
/// (`+02:00`), which are normalized to UTC.
pub const TIMESTAMP_FORMAT: &str = "yyyy-MM-dd'T'HH:mm:ss.SSSZZZZZ";

/// A UTC instant with millisecond precision.
///
/// Anything finer than a millisecond is truncated on construction, so a
/// timestamp always survives a round trip through its text form unchanged.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current wall-clock time.
    pub fn now() -> Self {
        Self::truncate(Utc::now())
    }

    /// Build from milliseconds since the UNIX epoch.
    pub fn from_millis(ms: i64) -> Result<Self, TypeError> {
        Utc.timestamp_millis_opt(ms)
            .single()
            .map(Self)
            .ok_or(TypeError::TimestampOutOfRange(ms))
    }

    /// Milliseconds since the UNIX epoch.
    pub fn as_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render in [`TIMESTAMP_FORMAT`].
    pub fn to_text(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Parse text in [`TIMESTAMP_FORMAT`].
    pub fn parse(text: &str) -> Result<Self, TypeError> {
        let parsed = DateTime::parse_from_rfc3339(text).map_err(|e| TypeError::InvalidTimestamp {
            text: text.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::truncate(parsed.with_timezone(&Utc)))
    }

    fn truncate(dt: DateTime<Utc>) -> Self {
        let ms = dt.timestamp_millis();
        // Every millisecond value obtained from a valid DateTime maps back.
        Self(Utc.timestamp_millis_opt(ms).single().unwrap_or(dt))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::truncate(dt)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.to_text())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_text())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
