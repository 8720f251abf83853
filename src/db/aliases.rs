//! Interval store: every alias write is validated and applied inside one
//! `BEGIN IMMEDIATE` transaction, so the overlap check and the write see the
//! same committed state.

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{Error, Result};
use crate::models::Alias;
use crate::time::Timestamp;
use crate::validation::Validator;

const ALIAS_COLUMNS: &str = "id, alias, slug_id, start_us, end_us";

/// Takes the write lock up front; a transaction dropped before commit rolls back.
const BEGIN_WRITE: &str = "BEGIN IMMEDIATE";

/// Insert an alias for the slug with id `slug_id`. A missing `end` means
/// open-ended.
pub async fn insert_alias(
    pool: &SqlitePool,
    alias: &str,
    slug_id: i64,
    start: Option<Timestamp>,
    end: Option<Timestamp>,
) -> Result<Alias> {
    let mut tx = pool.begin_with(BEGIN_WRITE).await?;
    let created = insert_in(&mut *tx, alias, slug_id, start, end).await?;
    tx.commit().await?;
    Ok(created)
}

/// Close the open-ended `existing` at `new_end`.
///
/// An end is set once: records that already end, and open-ended targets,
/// are rejected. Checked against the stored record rather than the caller's
/// copy.
pub async fn update_end(pool: &SqlitePool, existing: &Alias, new_end: Timestamp) -> Result<Alias> {
    let mut tx = pool.begin_with(BEGIN_WRITE).await?;
    let updated = update_end_in(&mut *tx, existing.id, new_end).await?;
    tx.commit().await?;
    Ok(updated)
}

/// Retire `existing` at `cutover` and start `new_alias` for the same slug at
/// that instant, open-ended. Both writes commit together or not at all.
pub async fn replace_alias(
    pool: &SqlitePool,
    existing: &Alias,
    cutover: Timestamp,
    new_alias: &str,
) -> Result<Alias> {
    let mut tx = pool.begin_with(BEGIN_WRITE).await?;
    let replaced = replace_in(&mut *tx, existing.id, cutover, new_alias).await?;
    tx.commit().await?;
    tracing::debug!(
        "Replaced alias {} at {} with '{}' (id {})",
        existing.id,
        cutover,
        replaced.alias,
        replaced.id
    );
    Ok(replaced)
}

pub async fn get_alias(pool: &SqlitePool, id: i64) -> Result<Option<Alias>> {
    let found = sqlx::query_as::<_, Alias>(&format!(
        "SELECT {} FROM aliases WHERE id = ?",
        ALIAS_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(found)
}

async fn fetch_alias(conn: &mut SqliteConnection, id: i64) -> Result<Alias> {
    sqlx::query_as::<_, Alias>(&format!(
        "SELECT {} FROM aliases WHERE id = ?",
        ALIAS_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(Error::AliasNotFound(id))
}

/// Every record sharing the alias name, as seen inside the transaction.
async fn aliases_named(conn: &mut SqliteConnection, alias: &str) -> Result<Vec<Alias>> {
    let aliases = sqlx::query_as::<_, Alias>(&format!(
        "SELECT {} FROM aliases WHERE alias = ? ORDER BY start_us ASC",
        ALIAS_COLUMNS
    ))
    .bind(alias)
    .fetch_all(&mut *conn)
    .await?;
    Ok(aliases)
}

async fn insert_in(
    conn: &mut SqliteConnection,
    alias: &str,
    slug_id: i64,
    start: Option<Timestamp>,
    end: Option<Timestamp>,
) -> Result<Alias> {
    Validator::validate_alias(alias)?;
    let interval = Validator::validate_interval(start, end)?;

    let slug_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM slugs WHERE id = ?")
        .bind(slug_id)
        .fetch_optional(&mut *conn)
        .await?;
    if slug_exists.is_none() {
        return Err(Error::SlugNotFound(format!("id {}", slug_id)));
    }

    let siblings = aliases_named(conn, alias).await?;
    if let Err(e) = Validator::check_overlap(alias, &interval, &siblings, None) {
        tracing::warn!("Rejected alias '{}' [{}, {}): {}", alias, interval.start, interval.end, e);
        return Err(e.into());
    }

    let created = sqlx::query_as::<_, Alias>(&format!(
        "INSERT INTO aliases (alias, slug_id, start_us, end_us) VALUES (?, ?, ?, ?) RETURNING {}",
        ALIAS_COLUMNS
    ))
    .bind(alias)
    .bind(slug_id)
    .bind(interval.start)
    .bind(interval.end)
    .fetch_one(&mut *conn)
    .await?;

    tracing::debug!(
        "Created alias '{}' (id {}) [{}, {})",
        created.alias,
        created.id,
        created.start,
        created.end
    );
    Ok(created)
}

async fn update_end_in(conn: &mut SqliteConnection, id: i64, new_end: Timestamp) -> Result<Alias> {
    let current = fetch_alias(conn, id).await?;
    if let Err(e) = Validator::validate_end_change(&current, new_end) {
        tracing::warn!("Rejected end change of alias {}: {}", id, e);
        return Err(e.into());
    }
    let interval = Validator::validate_interval(Some(current.start), Some(new_end))?;

    let siblings = aliases_named(conn, &current.alias).await?;
    if let Err(e) = Validator::check_overlap(&current.alias, &interval, &siblings, Some(id)) {
        tracing::warn!("Rejected end change of alias {}: {}", id, e);
        return Err(e.into());
    }

    let updated = sqlx::query_as::<_, Alias>(&format!(
        "UPDATE aliases SET end_us = ? WHERE id = ? RETURNING {}",
        ALIAS_COLUMNS
    ))
    .bind(interval.end)
    .bind(id)
    .fetch_one(&mut *conn)
    .await?;

    tracing::debug!("Alias {} now ends at {}", id, updated.end);
    Ok(updated)
}

async fn replace_in(
    conn: &mut SqliteConnection,
    id: i64,
    cutover: Timestamp,
    new_alias: &str,
) -> Result<Alias> {
    let current = fetch_alias(conn, id).await?;
    Validator::validate_cutover(&current, cutover)?;

    update_end_in(conn, id, cutover).await?;
    insert_in(conn, new_alias, current.slug_id, Some(cutover), None).await
}
