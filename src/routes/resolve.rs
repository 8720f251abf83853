use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;

use crate::db::queries;
use crate::error::Result;
use crate::models::{AtQuery, ResolveResponse};
use crate::routes::not_found;
use crate::state::AppState;
use crate::time::Timestamp;

pub fn routes() -> Router<AppState> {
    Router::new().route("/resolve/{alias}", get(resolve))
}

/// GET /resolve/{alias}?at=<RFC 3339> - Target of an alias at an instant (default now).
async fn resolve(
    State(state): State<AppState>,
    Path(alias): Path<String>,
    Query(query): Query<AtQuery>,
) -> Result<Response> {
    let at = Timestamp::from(query.at.unwrap_or_else(Utc::now));

    match queries::resolve_at(&state.pool, &alias, at).await? {
        Some(resolution) => Ok(Json(ResolveResponse::from(resolution)).into_response()),
        None => Ok(not_found(format!("No alias '{}' active at {}", alias, at))),
    }
}
