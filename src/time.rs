use chrono::{DateTime, Utc};

/// A UTC instant with microsecond resolution.
///
/// Stored as microseconds since the Unix epoch. Ordering is plain integer
/// ordering, so comparisons never depend on time zones or formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type)]
#[sqlx(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Open-ended sentinel: later than any instant chrono can represent.
    pub const MAX: Timestamp = Timestamp(i64::MAX);

    /// Earliest representable instant, used as an unbounded range start.
    pub const MIN: Timestamp = Timestamp(i64::MIN);

    /// Smallest addressable step between two instants, in microseconds.
    pub const QUANTUM_MICROS: i64 = 1;

    pub fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    pub fn as_micros(self) -> i64 {
        self.0
    }

    pub fn is_open_ended(self) -> bool {
        self == Self::MAX
    }

    /// The instant one quantum later, saturating at the sentinel.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(Self::QUANTUM_MICROS))
    }

    /// The instant one quantum earlier.
    pub fn prev(self) -> Self {
        Self(self.0.saturating_sub(Self::QUANTUM_MICROS))
    }

    /// Convert back to chrono. Returns None for the open-ended sentinel.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        if self.is_open_ended() {
            return None;
        }
        DateTime::from_timestamp_micros(self.0)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    /// Sub-microsecond precision is truncated.
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp_micros())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.to_rfc3339()),
            None if self.is_open_ended() => write!(f, "open-ended"),
            None => write!(f, "{}us", self.0),
        }
    }
}
