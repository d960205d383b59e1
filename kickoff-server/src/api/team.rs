//! Team endpoints.

use axum::{Json, extract::State};
use kickoff_core::teams;
use kickoff_sdk::objects::ApiEnvelope;
use kickoff_sdk::objects::team::{TeamStatusResponse, UserTeamResponse};

use crate::api::extractors::AuthUser;
use crate::api::{ApiError, success};
use crate::state::AppState;

/// `GET /team/status`: polled by clients until the squad is assigned.
pub async fn status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiEnvelope<TeamStatusResponse>>, ApiError> {
    let status = teams::team_status(&state.processor(), &state.queue, &state.pool, user_id).await?;
    Ok(success("Team status", status))
}

/// `GET /team`: the caller's team with its roster.
pub async fn user_team(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiEnvelope<UserTeamResponse>>, ApiError> {
    let team = teams::user_team(&state.processor(), user_id).await?;
    Ok(success("User team", team))
}
