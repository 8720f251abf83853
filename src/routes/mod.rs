pub mod aliases;
pub mod resolve;
pub mod slugs;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::error::{Error, ValidationError};
use crate::models::AliasResponse;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(slugs::routes())
        .merge(aliases::routes())
        .merge(resolve::routes())
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    conflict: Option<AliasResponse>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Validation(
                ValidationError::OverlapConflict { .. } | ValidationError::EndAlreadySet { .. },
            ) => StatusCode::CONFLICT,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::SlugNotFound(_) | Error::AliasNotFound(_) => StatusCode::NOT_FOUND,
            Error::SlugTaken(_) => StatusCode::CONFLICT,
            Error::Inconsistent(_) | Error::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {}", self);
            "Internal error".to_string()
        } else {
            self.to_string()
        };

        let kind = self.kind();
        let conflict = match self {
            Error::Validation(ValidationError::OverlapConflict { conflicting, .. }) => {
                Some(conflicting.into())
            }
            _ => None,
        };

        (
            status,
            Json(ErrorBody {
                error: kind,
                message,
                conflict,
            }),
        )
            .into_response()
    }
}

/// 404 body for lookups that found nothing, which is not an error for the core.
pub(crate) fn not_found(message: impl Into<String>) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "not_found",
            message: message.into(),
            conflict: None,
        }),
    )
        .into_response()
}
