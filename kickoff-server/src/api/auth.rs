//! Account endpoints.

use axum::{Json, extract::State};
use kickoff_core::accounts;
use kickoff_sdk::objects::ApiEnvelope;
use kickoff_sdk::objects::auth::{LoginRequest, LoginResponse, UserResponse};

use crate::api::extractors::{ApiJson, AuthUser};
use crate::api::{ApiError, success};
use crate::state::AppState;

/// `POST /auth/login`: log in, or register if the email is new.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<ApiEnvelope<LoginResponse>>, ApiError> {
    let response = accounts::login_or_register(
        &state.processor(),
        &state.queue,
        &state.auth,
        &body.email,
        &body.password,
    )
    .await?;
    Ok(success("Logged in", response))
}

/// `POST /auth/logout`: tokens are stateless; the client discards its copy.
pub async fn logout() -> Json<ApiEnvelope<Option<()>>> {
    success("Logged out", None)
}

/// `GET /auth/me`: the caller's profile.
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiEnvelope<UserResponse>>, ApiError> {
    let user = accounts::profile(&state.processor(), user_id).await?;
    Ok(success("User profile", user))
}
