//! Half-open intervals and the overlap rule that keeps alias windows disjoint.

use crate::models::Alias;
use crate::time::Timestamp;

/// A half-open interval `[start, end)`.
///
/// Construction does not check `start < end`; use
/// [`Validator::validate_interval`](crate::validation::Validator::validate_interval)
/// for input coming from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Interval {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Interval from `start` with no end.
    pub fn open_ended(start: Timestamp) -> Self {
        Self {
            start,
            end: Timestamp::MAX,
        }
    }

    pub fn is_open_ended(&self) -> bool {
        self.end.is_open_ended()
    }

    /// True if `instant` lies in `[start, end)`.
    pub fn contains(&self, instant: Timestamp) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Standard half-open overlap test. Intervals that only touch
    /// (`self.end == other.start` or the reverse) do not overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// True if `candidate` overlaps any interval in `existing`.
pub fn conflicts<'a, I>(candidate: &Interval, existing: I) -> bool
where
    I: IntoIterator<Item = &'a Interval>,
{
    existing.into_iter().any(|other| candidate.overlaps(other))
}

/// First alias in `existing` whose window overlaps `candidate`.
///
/// The record with id `exclude` is skipped, so a record being updated is
/// never compared against its own stored state.
pub fn find_conflict<'a>(
    candidate: &Interval,
    existing: &'a [Alias],
    exclude: Option<i64>,
) -> Option<&'a Alias> {
    existing
        .iter()
        .filter(|alias| Some(alias.id) != exclude)
        .find(|alias| candidate.overlaps(&alias.interval()))
}
