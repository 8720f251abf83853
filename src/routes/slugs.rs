use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;

use crate::db::{queries, slugs};
use crate::error::Result;
use crate::models::{
    AliasListResponse, AtQuery, CreateSlugRequest, DeletedResponse, RangeQuery, SlugListResponse,
    SlugResponse,
};
use crate::routes::not_found;
use crate::state::AppState;
use crate::target::TargetRef;
use crate::time::Timestamp;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/slugs", post(create_slug))
        .route("/slugs/{slug}", get(get_slug).delete(delete_slug))
        .route("/slugs/{slug}/aliases", get(list_aliases))
        .route("/slugs/{slug}/active", get(active_aliases))
        .route("/targets/{kind}/{id}", delete(delete_target))
        .route("/targets/{kind}/{id}/slugs", get(target_slugs))
}

/// POST /slugs - Register a slug for a target.
async fn create_slug(
    State(state): State<AppState>,
    Json(req): Json<CreateSlugRequest>,
) -> Result<Response> {
    let slug = slugs::create_slug(&state.pool, &req.slug, req.target, state.resolver.as_ref()).await?;
    Ok((StatusCode::CREATED, Json(SlugResponse::from(slug))).into_response())
}

/// GET /slugs/{slug} - The slug, its target and the resolved entity.
async fn get_slug(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Response> {
    let Some(found) = slugs::get_slug(&state.pool, &slug).await? else {
        return Ok(not_found(format!("Slug not found: {}", slug)));
    };

    let entity = state.resolver.dereference(&found.target);
    let mut response = SlugResponse::from(found);
    response.entity = entity;
    Ok(Json(response).into_response())
}

/// DELETE /slugs/{slug} - Remove a slug and all of its aliases.
async fn delete_slug(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Response> {
    if !slugs::delete_slug(&state.pool, &slug).await? {
        return Ok(not_found(format!("Slug not found: {}", slug)));
    }
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// GET /slugs/{slug}/aliases?since=...&until=... - Aliases overlapping a window.
async fn list_aliases(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<AliasListResponse>> {
    let slug = slugs::require_slug(&state.pool, &slug).await?;
    let since = query.since.map(Timestamp::from).unwrap_or(Timestamp::MIN);
    let until = query.until.map(Timestamp::from).unwrap_or(Timestamp::MAX);

    let aliases = queries::list_in_range(&state.pool, slug.id, since, until).await?;
    Ok(Json(aliases.into()))
}

/// GET /slugs/{slug}/active?at=... - Aliases of the slug active at an instant.
async fn active_aliases(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<AtQuery>,
) -> Result<Json<AliasListResponse>> {
    let slug = slugs::require_slug(&state.pool, &slug).await?;
    let at = Timestamp::from(query.at.unwrap_or_else(Utc::now));

    let aliases = queries::active_for_slug(&state.pool, slug.id, at).await?;
    Ok(Json(aliases.into()))
}

/// GET /targets/{kind}/{id}/slugs - Slugs registered for a target.
async fn target_slugs(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<SlugListResponse>> {
    let found = slugs::slugs_for_target(&state.pool, &TargetRef::new(kind, id)).await?;
    Ok(Json(SlugListResponse {
        slugs: found.into_iter().map(Into::into).collect(),
    }))
}

/// DELETE /targets/{kind}/{id} - The target was destroyed; drop its slugs.
async fn delete_target(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<DeletedResponse>> {
    let deleted = slugs::delete_slugs_for_target(&state.pool, &TargetRef::new(kind, id)).await?;
    Ok(Json(DeletedResponse { deleted }))
}
