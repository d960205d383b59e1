//! Team status polling and roster view.

use kanau::processor::Processor;
use kickoff_sdk::objects::team::{SquadPlayer, TeamDetail, TeamStatusResponse, UserTeamResponse};
use tracing::info;

use crate::allocation::AllocationQueue;
use crate::entities::team::{GetTeamByUser, Team};
use crate::entities::team_player::ListTeamPlayers;
use crate::errors::ServiceError;
use crate::framework::DatabaseProcessor;
use crate::pool::SquadPool;

pub const NO_TEAM: &str = "No team found for this user.";
pub const NOT_READY: &str = "Team is not ready.";
pub const READY: &str = "Team is ready to play.";
pub const POOL_EXHAUSTED: &str = "No squads are left to assign. Please contact support.";

/// Status reason for a user, and whether an allocation job should be queued.
pub fn status_for(team: Option<&Team>, pool_exhausted: bool) -> (TeamStatusResponse, bool) {
    let (is_ready, reason, needs_allocation) = match team {
        Some(team) if team.is_ready => (true, READY, false),
        Some(_) => (false, NOT_READY, true),
        None if pool_exhausted => (false, POOL_EXHAUSTED, true),
        None => (false, NO_TEAM, true),
    };
    (
        TeamStatusResponse {
            is_ready,
            reason: reason.to_owned(),
        },
        needs_allocation,
    )
}

/// Report whether the caller's team is ready, re-queueing allocation when it
/// is not and the user is not already waiting.
pub async fn team_status(
    db: &DatabaseProcessor,
    queue: &AllocationQueue,
    pool: &SquadPool,
    user_id: i64,
) -> Result<TeamStatusResponse, ServiceError> {
    let team = db.process(GetTeamByUser { user_id }).await?;
    let (status, needs_allocation) = status_for(team.as_ref(), pool.is_exhausted());
    if needs_allocation && !queue.is_queued(user_id) && queue.enqueue(user_id) {
        info!(user_id, "Re-queued team allocation");
    }
    Ok(status)
}

/// The caller's team with its full roster, or a message if there is none.
pub async fn user_team(
    db: &DatabaseProcessor,
    user_id: i64,
) -> Result<UserTeamResponse, ServiceError> {
    let Some(team) = db.process(GetTeamByUser { user_id }).await? else {
        return Ok(UserTeamResponse {
            team: None,
            message: Some(NO_TEAM.to_owned()),
        });
    };

    let players = db.process(ListTeamPlayers { team_id: team.id }).await?;
    Ok(UserTeamResponse {
        team: Some(TeamDetail {
            id: team.id,
            name: team.name,
            budget: team.budget,
            player_count: team.player_count,
            is_ready: team.is_ready,
            players: players.iter().map(SquadPlayer::from).collect(),
        }),
        message: None,
    })
}
