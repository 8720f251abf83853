use thiserror::Error;

use crate::models::Alias;
use crate::target::TargetRef;
use crate::time::Timestamp;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Slug not found: {0}")]
    SlugNotFound(String),

    #[error("Alias not found: {0}")]
    AliasNotFound(i64),

    #[error("Slug already taken: {0}")]
    SlugTaken(String),

    #[error("Inconsistent store: {0}")]
    Inconsistent(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Error {
    /// Stable tag for callers that branch on the failure.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(e) => e.kind(),
            Error::SlugNotFound(_) | Error::AliasNotFound(_) => "not_found",
            Error::SlugTaken(_) => "slug_taken",
            Error::Inconsistent(_) => "inconsistent",
            Error::Database(_) => "database",
        }
    }
}

/// Rejections raised before anything is written.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Invalid interval: start is required")]
    MissingStart,

    #[error("Invalid interval: start {start} must be before end {end}")]
    InvalidInterval { start: Timestamp, end: Timestamp },

    #[error(
        "Interval overlaps alias '{alias}' record {} [{}, {})",
        .conflicting.id,
        .conflicting.start,
        .conflicting.end
    )]
    OverlapConflict { alias: String, conflicting: Alias },

    #[error("Alias {id} already ends at {end}; an end can only be set once")]
    EndAlreadySet { id: i64, end: Timestamp },

    #[error("New end of alias {id} must be a finite instant")]
    OpenEndedUpdate { id: i64 },

    #[error("Cutover {cutover} must fall strictly inside [{start}, {end})")]
    InvalidCutover {
        cutover: Timestamp,
        start: Timestamp,
        end: Timestamp,
    },

    #[error("Invalid slug: {0}")]
    InvalidSlug(String),

    #[error("Invalid alias: {0}")]
    InvalidAlias(String),

    #[error("Invalid target reference: {0}")]
    InvalidTarget(String),

    #[error("Target does not resolve: {0}")]
    UnresolvableTarget(TargetRef),
}

impl ValidationError {
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::MissingStart
            | ValidationError::InvalidInterval { .. }
            | ValidationError::OpenEndedUpdate { .. } => "invalid_interval",
            ValidationError::EndAlreadySet { .. } => "end_already_set",
            ValidationError::OverlapConflict { .. } => "overlap_conflict",
            ValidationError::InvalidCutover { .. } => "invalid_cutover",
            ValidationError::InvalidSlug(_) => "invalid_slug",
            ValidationError::InvalidAlias(_) => "invalid_alias",
            ValidationError::InvalidTarget(_) => "invalid_target",
            ValidationError::UnresolvableTarget(_) => "unresolvable_target",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            Error::from(ValidationError::MissingStart).kind(),
            "invalid_interval"
        );
        assert_eq!(Error::AliasNotFound(3).kind(), "not_found");
        assert_eq!(Error::SlugTaken("x".to_string()).kind(), "slug_taken");
        assert_eq!(
            Error::from(ValidationError::EndAlreadySet {
                id: 1,
                end: Timestamp(5)
            })
            .kind(),
            "end_already_set"
        );
    }

    #[test]
    fn test_overlap_message_names_conflicting_record() {
        let err = ValidationError::OverlapConflict {
            alias: "case1".to_string(),
            conflicting: Alias {
                id: 9,
                alias: "case1".to_string(),
                slug_id: 1,
                start: Timestamp(0),
                end: Timestamp::MAX,
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("case1"));
        assert!(msg.contains("record 9"));
        assert!(msg.contains("open-ended"));
    }
}
