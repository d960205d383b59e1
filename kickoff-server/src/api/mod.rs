//! HTTP API mounted under `/api`.
//!
//! # Endpoints
//!
//! - `POST /auth/login`      – log in, registering unknown emails
//! - `POST /auth/logout`     – stateless acknowledgement
//! - `GET  /auth/me`         – caller's profile
//! - `GET  /team/status`     – whether the caller's squad has been assigned
//! - `GET  /team`            – caller's team and roster
//! - `GET  /transfer/sell`   – caller's players with listing state
//! - `POST /transfer/sell`   – list or unlist a player
//! - `POST /transfer/buy`    – buy a listed player
//! - `GET  /transfer/market` – search listings

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use kickoff_core::errors::{ErrorKind, ServiceError};
use kickoff_sdk::objects::{ApiEnvelope, ApiFailure, ResponseStatus};
use serde::Serialize;

use crate::state::AppState;

pub mod auth;
pub mod extractors;
pub mod team;
pub mod transfer;

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/team/status", get(team::status))
        .route("/team", get(team::user_team))
        .route(
            "/transfer/sell",
            get(transfer::list_for_sale).post(transfer::toggle_sale),
        )
        .route("/transfer/buy", post(transfer::buy))
        .route("/transfer/market", get(transfer::search_market))
}

/// Wrap `data` in a success envelope.
pub(crate) fn success<T: Serialize>(message: &str, data: T) -> Json<ApiEnvelope<T>> {
    Json(ApiEnvelope::success(message, data))
}

// ---------------------------------------------------------------------------
// Shared error type
// ---------------------------------------------------------------------------

/// A failed API call.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.kind() == ErrorKind::Internal {
            tracing::error!(error = %self.0, "API request failed");
            ResponseStatus::Error
        } else {
            tracing::debug!(error = %self.0, "API request rejected");
            ResponseStatus::Fail
        };
        let body = ApiFailure {
            status,
            message: self.0.public_message(),
            details: self.0.details(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
