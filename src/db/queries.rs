//! Read-side lookups. These never take the write lock and see the latest
//! committed state.

use sqlx::SqlitePool;

use crate::error::{Error, Result};
use crate::models::{Alias, Resolution};
use crate::time::Timestamp;
use crate::validation::Validator;

const ALIAS_COLUMNS: &str = "id, alias, slug_id, start_us, end_us";

/// The alias named `alias` active at `at`, with its slug and target.
/// `Ok(None)` when nothing is active.
pub async fn resolve_at(pool: &SqlitePool, alias: &str, at: Timestamp) -> Result<Option<Resolution>> {
    // LIMIT 2 so a broken no-overlap invariant shows up instead of being
    // hidden behind an arbitrary pick.
    let mut matches = sqlx::query_as::<_, Resolution>(
        r#"
        SELECT a.id AS id, a.alias AS alias, a.slug_id AS slug_id,
               a.start_us AS start_us, a.end_us AS end_us,
               s.slug AS slug, s.target_kind AS target_kind, s.target_id AS target_id
        FROM aliases a
        JOIN slugs s ON s.id = a.slug_id
        WHERE a.alias = ?
          AND a.start_us <= ?
          AND ? < a.end_us
        LIMIT 2
        "#,
    )
    .bind(alias)
    .bind(at)
    .bind(at)
    .fetch_all(pool)
    .await?;

    if matches.len() > 1 {
        tracing::error!("Alias '{}' has overlapping records at {}", alias, at);
        return Err(Error::Inconsistent(format!(
            "alias '{}' has more than one active record at {}",
            alias, at
        )));
    }
    Ok(matches.pop())
}

/// Aliases of a slug whose interval overlaps `[since, until)`, by start.
///
/// Uses the same half-open overlap test as the write path: an alias ending
/// exactly at `since` or starting exactly at `until` is not included.
pub async fn list_in_range(
    pool: &SqlitePool,
    slug_id: i64,
    since: Timestamp,
    until: Timestamp,
) -> Result<Vec<Alias>> {
    let window = Validator::validate_interval(Some(since), Some(until))?;

    let aliases = sqlx::query_as::<_, Alias>(&format!(
        r#"
        SELECT {}
        FROM aliases
        WHERE slug_id = ?
          AND start_us < ?
          AND ? < end_us
        ORDER BY start_us ASC, id ASC
        "#,
        ALIAS_COLUMNS
    ))
    .bind(slug_id)
    .bind(window.end)
    .bind(window.start)
    .fetch_all(pool)
    .await?;
    Ok(aliases)
}

/// Every alias of a slug active at `at`, by name.
pub async fn active_for_slug(pool: &SqlitePool, slug_id: i64, at: Timestamp) -> Result<Vec<Alias>> {
    let aliases = sqlx::query_as::<_, Alias>(&format!(
        r#"
        SELECT {}
        FROM aliases
        WHERE slug_id = ?
          AND start_us <= ?
          AND ? < end_us
        ORDER BY alias ASC
        "#,
        ALIAS_COLUMNS
    ))
    .bind(slug_id)
    .bind(at)
    .bind(at)
    .fetch_all(pool)
    .await?;
    Ok(aliases)
}

/// All intervals ever recorded for an alias name, by start.
pub async fn history(pool: &SqlitePool, alias: &str) -> Result<Vec<Alias>> {
    let aliases = sqlx::query_as::<_, Alias>(&format!(
        "SELECT {} FROM aliases WHERE alias = ? ORDER BY start_us ASC",
        ALIAS_COLUMNS
    ))
    .bind(alias)
    .fetch_all(pool)
    .await?;
    Ok(aliases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::aliases::insert_alias;
    use crate::db::test_support::*;
    use crate::error::ValidationError;

    fn ts(micros: i64) -> Option<Timestamp> {
        Some(Timestamp(micros))
    }

    #[tokio::test]
    async fn test_resolve_at_contains_instant() {
        let pool = setup_test_db().await;
        let slugs = seed_slugs(&pool).await;

        insert_alias(&pool, "news", slugs[0].id, ts(0), ts(10)).await.unwrap();
        insert_alias(&pool, "news", slugs[1].id, ts(10), ts(20)).await.unwrap();
        insert_alias(&pool, "news", slugs[2].id, ts(30), None).await.unwrap();

        for t in -5..40 {
            let found = resolve_at(&pool, "news", Timestamp(t)).await.unwrap();
            match found {
                Some(r) => {
                    assert!(r.alias.is_active_at(Timestamp(t)), "t={t}");
                    let expected = if t < 10 { 0 } else if t < 20 { 1 } else { 2 };
                    assert_eq!(r.slug, slugs[expected].slug);
                    assert_eq!(r.target, slugs[expected].target);
                }
                None => assert!(t < 0 || (20..30).contains(&t), "t={t}"),
            }
        }

        assert!(resolve_at(&pool, "news", Timestamp(i64::MAX - 1))
            .await
            .unwrap()
            .is_some());
        assert!(resolve_at(&pool, "unknown", Timestamp(5)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resolve_at_reports_corruption() {
        let pool = setup_test_db().await;
        let slugs = seed_slugs(&pool).await;

        // Bypass the overlap trigger to simulate a corrupted store.
        sqlx::query("DROP TRIGGER aliases_no_overlap_insert")
            .execute(&pool)
            .await
            .unwrap();
        for (s, e) in [(0, 10), (5, 15)] {
            sqlx::query(
                "INSERT INTO aliases (alias, slug_id, start_us, end_us) VALUES ('dup', ?, ?, ?)",
            )
            .bind(slugs[0].id)
            .bind(s)
            .bind(e)
            .execute(&pool)
            .await
            .unwrap();
        }

        let err = resolve_at(&pool, "dup", Timestamp(7)).await.unwrap_err();
        assert!(matches!(err, Error::Inconsistent(_)));
        assert!(resolve_at(&pool, "dup", Timestamp(2)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_in_range_includes_superset_and_orders_by_start() {
        let pool = setup_test_db().await;
        let slugs = seed_slugs(&pool).await;
        let slug_id = slugs[0].id;

        let late = insert_alias(&pool, "b", slug_id, ts(50), ts(60)).await.unwrap();
        let wide = insert_alias(&pool, "a", slug_id, ts(0), None).await.unwrap();
        insert_alias(&pool, "c", slug_id, ts(100), ts(200)).await.unwrap();
        insert_alias(&pool, "d", slugs[1].id, ts(40), ts(60)).await.unwrap();

        let listed = list_in_range(&pool, slug_id, Timestamp(40), Timestamp(100))
            .await
            .unwrap();
        assert_eq!(listed, vec![wide.clone(), late]);

        // Unbounded window returns the whole history of the slug.
        let all = list_in_range(&pool, slug_id, Timestamp::MIN, Timestamp::MAX)
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0], wide);
    }

    #[tokio::test]
    async fn test_list_in_range_rejects_empty_window() {
        let pool = setup_test_db().await;

        let err = list_in_range(&pool, 1, Timestamp(10), Timestamp(10))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidInterval { .. })
        ));
    }

    #[tokio::test]
    async fn test_active_for_slug() {
        let pool = setup_test_db().await;
        let slugs = seed_slugs(&pool).await;
        let slug_id = slugs[0].id;

        insert_alias(&pool, "zeta", slug_id, ts(0), None).await.unwrap();
        insert_alias(&pool, "alpha", slug_id, ts(5), ts(10)).await.unwrap();
        insert_alias(&pool, "old", slug_id, ts(0), ts(5)).await.unwrap();

        let active = active_for_slug(&pool, slug_id, Timestamp(7)).await.unwrap();
        let names: Vec<&str> = active.iter().map(|a| a.alias.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn test_history_spans_slugs() {
        let pool = setup_test_db().await;
        let slugs = seed_slugs(&pool).await;

        insert_alias(&pool, "h", slugs[1].id, ts(10), ts(20)).await.unwrap();
        insert_alias(&pool, "h", slugs[0].id, ts(0), ts(10)).await.unwrap();

        let history = history(&pool, "h").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].slug_id, slugs[0].id);
        assert_eq!(history[1].slug_id, slugs[1].id);
    }
}
