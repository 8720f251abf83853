use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};

use crate::db::{aliases, queries, slugs};
use crate::error::{Error, Result};
use crate::models::{
    Alias, AliasListResponse, AliasResponse, CreateAliasRequest, ReplaceAliasRequest,
    UpdateEndRequest,
};
use crate::routes::not_found;
use crate::state::AppState;
use crate::time::Timestamp;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/aliases", post(create_alias))
        .route("/aliases/{id}", get(get_alias))
        .route("/aliases/{id}/end", put(update_end))
        .route("/aliases/{id}/replace", post(replace_alias))
        .route("/history/{alias}", get(history))
}

async fn load_alias(state: &AppState, id: i64) -> Result<Alias> {
    aliases::get_alias(&state.pool, id)
        .await?
        .ok_or(Error::AliasNotFound(id))
}

/// POST /aliases - Create an alias for a slug.
async fn create_alias(
    State(state): State<AppState>,
    Json(req): Json<CreateAliasRequest>,
) -> Result<Response> {
    let slug = slugs::require_slug(&state.pool, &req.slug).await?;
    let created = aliases::insert_alias(
        &state.pool,
        &req.alias,
        slug.id,
        req.start.map(Timestamp::from),
        req.end.map(Timestamp::from),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(AliasResponse::from(created))).into_response())
}

/// GET /aliases/{id} - A single alias record.
async fn get_alias(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    match aliases::get_alias(&state.pool, id).await? {
        Some(alias) => Ok(Json(AliasResponse::from(alias)).into_response()),
        None => Ok(not_found(format!("Alias not found: {}", id))),
    }
}

/// PUT /aliases/{id}/end - Close an open-ended alias.
async fn update_end(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateEndRequest>,
) -> Result<Json<AliasResponse>> {
    let existing = load_alias(&state, id).await?;
    let updated = aliases::update_end(&state.pool, &existing, Timestamp::from(req.end)).await?;
    Ok(Json(updated.into()))
}

/// POST /aliases/{id}/replace - Retire an alias and start its successor.
async fn replace_alias(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ReplaceAliasRequest>,
) -> Result<Response> {
    let existing = load_alias(&state, id).await?;
    let successor =
        aliases::replace_alias(&state.pool, &existing, Timestamp::from(req.at), &req.alias)
            .await?;
    Ok((StatusCode::CREATED, Json(AliasResponse::from(successor))).into_response())
}

/// GET /history/{alias} - Every interval recorded for an alias name.
async fn history(
    State(state): State<AppState>,
    Path(alias): Path<String>,
) -> Result<Json<AliasListResponse>> {
    let aliases = queries::history(&state.pool, &alias).await?;
    Ok(Json(aliases.into()))
}
