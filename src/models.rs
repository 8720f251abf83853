use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::Interval;
use crate::target::TargetRef;
use crate::time::Timestamp;

/// A unique short name bound to one target.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Slug {
    pub id: i64,
    pub slug: String,
    #[sqlx(flatten)]
    pub target: TargetRef,
}

/// A time-scoped alternate name for a slug, active during `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Alias {
    pub id: i64,
    pub alias: String,
    pub slug_id: i64,
    #[sqlx(rename = "start_us")]
    pub start: Timestamp,
    #[sqlx(rename = "end_us")]
    pub end: Timestamp,
}

impl Alias {
    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }

    pub fn is_active_at(&self, instant: Timestamp) -> bool {
        self.interval().contains(instant)
    }
}

/// Result of resolving an alias name at an instant.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Resolution {
    #[sqlx(flatten)]
    pub alias: Alias,
    pub slug: String,
    #[sqlx(flatten)]
    pub target: TargetRef,
}

// ============================================================================
// HTTP payloads
// ============================================================================

/// Request to register a slug.
#[derive(Debug, Deserialize)]
pub struct CreateSlugRequest {
    pub slug: String,
    pub target: TargetRef,
}

#[derive(Debug, Serialize)]
pub struct SlugResponse {
    pub id: i64,
    pub slug: String,
    pub target: TargetRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<serde_json::Value>,
}

impl From<Slug> for SlugResponse {
    fn from(s: Slug) -> Self {
        Self {
            id: s.id,
            slug: s.slug,
            target: s.target,
            entity: None,
        }
    }
}

/// Request to create an alias. A missing `end` means open-ended.
#[derive(Debug, Deserialize)]
pub struct CreateAliasRequest {
    pub alias: String,
    pub slug: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Request to close an open-ended alias at `end`.
#[derive(Debug, Deserialize)]
pub struct UpdateEndRequest {
    pub end: DateTime<Utc>,
}

/// Request to retire an alias at `at` and start `alias` from that instant.
#[derive(Debug, Deserialize)]
pub struct ReplaceAliasRequest {
    pub at: DateTime<Utc>,
    pub alias: String,
}

/// Alias as rendered over HTTP. `end` is null when open-ended.
#[derive(Debug, Serialize)]
pub struct AliasResponse {
    pub id: i64,
    pub alias: String,
    pub slug_id: i64,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl From<Alias> for AliasResponse {
    fn from(a: Alias) -> Self {
        Self {
            id: a.id,
            alias: a.alias,
            slug_id: a.slug_id,
            start: a.start.to_datetime(),
            end: a.end.to_datetime(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub alias: AliasResponse,
    pub slug: String,
    pub target: TargetRef,
}

impl From<Resolution> for ResolveResponse {
    fn from(r: Resolution) -> Self {
        Self {
            alias: r.alias.into(),
            slug: r.slug,
            target: r.target,
        }
    }
}

/// Query parameters carrying an optional instant; absent means now.
#[derive(Debug, Deserialize)]
pub struct AtQuery {
    pub at: Option<DateTime<Utc>>,
}

/// Query parameters for range listing. Missing bounds are unbounded.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct AliasListResponse {
    pub aliases: Vec<AliasResponse>,
}

impl From<Vec<Alias>> for AliasListResponse {
    fn from(aliases: Vec<Alias>) -> Self {
        Self {
            aliases: aliases.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SlugListResponse {
    pub slugs: Vec<SlugResponse>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}
