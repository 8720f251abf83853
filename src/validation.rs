use crate::error::ValidationError;
use crate::interval::{find_conflict, Interval};
use crate::models::Alias;
use crate::target::TargetRef;
use crate::time::Timestamp;

pub const MAX_SLUG_LEN: usize = 25;
pub const MAX_ALIAS_LEN: usize = 255;
pub const MAX_TARGET_FIELD_LEN: usize = 255;

/// Pre-commit checks run by the store before anything is persisted.
pub struct Validator;

impl Validator {
    /// Slug: 1..=25 chars of `[A-Za-z0-9_-]`.
    pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
        Self::validate_slug_chars(slug, MAX_SLUG_LEN).map_err(ValidationError::InvalidSlug)
    }

    /// Alias name: same charset as a slug, up to 255 chars.
    pub fn validate_alias(alias: &str) -> Result<(), ValidationError> {
        Self::validate_slug_chars(alias, MAX_ALIAS_LEN).map_err(ValidationError::InvalidAlias)
    }

    fn validate_slug_chars(value: &str, max_len: usize) -> Result<(), String> {
        if value.is_empty() {
            return Err("cannot be empty".to_string());
        }
        if value.len() > max_len {
            return Err(format!(
                "too long: {} chars (max {})",
                value.len(),
                max_len
            ));
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(format!("contains invalid characters: {}", value));
        }
        Ok(())
    }

    /// Target references need a non-empty kind and id.
    pub fn validate_target(target: &TargetRef) -> Result<(), ValidationError> {
        for (field, value) in [("kind", &target.kind), ("id", &target.id)] {
            if value.is_empty() {
                return Err(ValidationError::InvalidTarget(format!(
                    "{} cannot be empty",
                    field
                )));
            }
            if value.len() > MAX_TARGET_FIELD_LEN {
                return Err(ValidationError::InvalidTarget(format!(
                    "{} too long: {} chars (max {})",
                    field,
                    value.len(),
                    MAX_TARGET_FIELD_LEN
                )));
            }
        }
        Ok(())
    }

    /// Build a well-formed interval. A missing end means open-ended.
    pub fn validate_interval(
        start: Option<Timestamp>,
        end: Option<Timestamp>,
    ) -> Result<Interval, ValidationError> {
        let end = end.unwrap_or(Timestamp::MAX);
        let start = start.ok_or(ValidationError::MissingStart)?;
        if start >= end {
            return Err(ValidationError::InvalidInterval { start, end });
        }
        Ok(Interval::new(start, end))
    }

    /// Reject `candidate` if it overlaps any record sharing its alias name.
    pub fn check_overlap(
        alias: &str,
        candidate: &Interval,
        existing: &[Alias],
        exclude: Option<i64>,
    ) -> Result<(), ValidationError> {
        match find_conflict(candidate, existing, exclude) {
            Some(conflicting) => Err(ValidationError::OverlapConflict {
                alias: alias.to_string(),
                conflicting: conflicting.clone(),
            }),
            None => Ok(()),
        }
    }

    /// An end is set at most once: it may only shorten an open-ended record
    /// to a finite instant.
    pub fn validate_end_change(existing: &Alias, new_end: Timestamp) -> Result<(), ValidationError> {
        if !existing.end.is_open_ended() {
            return Err(ValidationError::EndAlreadySet {
                id: existing.id,
                end: existing.end,
            });
        }
        if new_end.is_open_ended() {
            return Err(ValidationError::OpenEndedUpdate { id: existing.id });
        }
        Ok(())
    }

    /// A cutover must fall strictly inside the interval being retired.
    pub fn validate_cutover(existing: &Alias, cutover: Timestamp) -> Result<(), ValidationError> {
        if existing.start < cutover && cutover < existing.end {
            return Ok(());
        }
        Err(ValidationError::InvalidCutover {
            cutover,
            start: existing.start,
            end: existing.end,
        })
    }
}
