use sqlx::SqlitePool;

use crate::error::{Error, Result, ValidationError};
use crate::models::Slug;
use crate::target::{TargetRef, TargetResolver};
use crate::validation::Validator;

const SLUG_COLUMNS: &str = "id, slug, target_kind, target_id";

/// Register `slug` for `target`. The target must resolve through `resolver`.
pub async fn create_slug(
    pool: &SqlitePool,
    slug: &str,
    target: TargetRef,
    resolver: &dyn TargetResolver,
) -> Result<Slug> {
    Validator::validate_slug(slug)?;
    Validator::validate_target(&target)?;
    if !resolver.exists(&target) {
        return Err(ValidationError::UnresolvableTarget(target).into());
    }

    let result = sqlx::query_as::<_, Slug>(&format!(
        "INSERT INTO slugs (slug, target_kind, target_id) VALUES (?, ?, ?) RETURNING {}",
        SLUG_COLUMNS
    ))
    .bind(slug)
    .bind(&target.kind)
    .bind(&target.id)
    .fetch_one(pool)
    .await;

    match result {
        Ok(created) => {
            tracing::debug!("Created slug {} -> {}", created.slug, created.target);
            Ok(created)
        }
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(Error::SlugTaken(slug.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn get_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Slug>> {
    let found = sqlx::query_as::<_, Slug>(&format!(
        "SELECT {} FROM slugs WHERE slug = ?",
        SLUG_COLUMNS
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await?;
    Ok(found)
}

pub async fn get_slug_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Slug>> {
    let found = sqlx::query_as::<_, Slug>(&format!(
        "SELECT {} FROM slugs WHERE id = ?",
        SLUG_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(found)
}

/// Like [`get_slug`], but a missing slug is an error.
pub async fn require_slug(pool: &SqlitePool, slug: &str) -> Result<Slug> {
    get_slug(pool, slug)
        .await?
        .ok_or_else(|| Error::SlugNotFound(slug.to_string()))
}

/// All slugs pointing at `target`, oldest first.
pub async fn slugs_for_target(pool: &SqlitePool, target: &TargetRef) -> Result<Vec<Slug>> {
    let slugs = sqlx::query_as::<_, Slug>(&format!(
        "SELECT {} FROM slugs WHERE target_kind = ? AND target_id = ? ORDER BY id ASC",
        SLUG_COLUMNS
    ))
    .bind(&target.kind)
    .bind(&target.id)
    .fetch_all(pool)
    .await?;
    Ok(slugs)
}

/// Delete a slug and, through the foreign key, every alias of it.
/// Returns false if the slug did not exist.
pub async fn delete_slug(pool: &SqlitePool, slug: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM slugs WHERE slug = ?")
        .bind(slug)
        .execute(pool)
        .await?;
    let deleted = result.rows_affected() > 0;
    if deleted {
        tracing::debug!("Deleted slug {}", slug);
    }
    Ok(deleted)
}

/// Called when the owning entity is destroyed. Returns the number of slugs removed.
pub async fn delete_slugs_for_target(pool: &SqlitePool, target: &TargetRef) -> Result<u64> {
    let result = sqlx::query("DELETE FROM slugs WHERE target_kind = ? AND target_id = ?")
        .bind(&target.kind)
        .bind(&target.id)
        .execute(pool)
        .await?;
    tracing::debug!(
        "Deleted {} slugs of {}",
        result.rows_affected(),
        target
    );
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::*;

    #[tokio::test]
    async fn test_create_and_get_slug() {
        let pool = setup_test_db().await;

        let slug = create_slug(
            &pool,
            "qwerty",
            TargetRef::new("test_model", "1"),
            &catalog(),
        )
        .await
        .unwrap();

        assert_eq!(slug.id, 1);
        assert_eq!(slug.slug, "qwerty");
        assert_eq!(slug.target, TargetRef::new("test_model", "1"));

        let fetched = get_slug(&pool, "qwerty").await.unwrap().unwrap();
        assert_eq!(fetched, slug);
        assert_eq!(get_slug_by_id(&pool, slug.id).await.unwrap(), Some(slug));
        assert!(get_slug(&pool, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_slug_is_globally_unique() {
        let pool = setup_test_db().await;
        let catalog = catalog();

        create_slug(&pool, "taken", TargetRef::new("test_model", "1"), &catalog)
            .await
            .unwrap();

        // Unique across every target, not per target kind.
        let err = create_slug(&pool, "taken", TargetRef::new("test_model", "2"), &catalog)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SlugTaken(ref s) if s == "taken"));
    }

    #[tokio::test]
    async fn test_unresolvable_target_rejected() {
        let pool = setup_test_db().await;

        let err = create_slug(&pool, "ghost", TargetRef::new("test_model", "99"), &catalog())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::UnresolvableTarget(_))
        ));

        let err = create_slug(&pool, "nokind", TargetRef::new("", "1"), &catalog())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidTarget(_))
        ));

        assert!(get_slug(&pool, "ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_slug_rejected() {
        let pool = setup_test_db().await;

        let err = create_slug(&pool, "has space", TargetRef::new("test_model", "1"), &catalog())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_slug");
    }

    #[tokio::test]
    async fn test_slugs_for_target() {
        let pool = setup_test_db().await;
        let catalog = catalog();
        let target = TargetRef::new("test_model", "1");

        create_slug(&pool, "first", target.clone(), &catalog).await.unwrap();
        create_slug(&pool, "second", target.clone(), &catalog).await.unwrap();
        create_slug(&pool, "other", TargetRef::new("test_model", "2"), &catalog)
            .await
            .unwrap();

        let slugs = slugs_for_target(&pool, &target).await.unwrap();
        let names: Vec<&str> = slugs.iter().map(|s| s.slug.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_delete_slug() {
        let pool = setup_test_db().await;
        seed_slugs(&pool).await;

        assert!(delete_slug(&pool, "id1-test_model").await.unwrap());
        assert!(get_slug(&pool, "id1-test_model").await.unwrap().is_none());
        assert!(!delete_slug(&pool, "id1-test_model").await.unwrap());

        let err = require_slug(&pool, "id1-test_model").await.unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn test_delete_slugs_for_target() {
        let pool = setup_test_db().await;
        seed_slugs(&pool).await;

        let removed = delete_slugs_for_target(&pool, &TargetRef::new("test_model", "2"))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(get_slug(&pool, "id2-test_model").await.unwrap().is_none());
        assert!(get_slug(&pool, "id1-test_model").await.unwrap().is_some());
    }
}
