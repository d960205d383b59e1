//! Team status and roster types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Position;

/// Response of `GET /api/team/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStatusResponse {
    pub is_ready: bool,
    pub reason: String,
}

/// Response of `GET /api/team`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTeamResponse {
    pub team: Option<TeamDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A team together with its full roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamDetail {
    pub id: i64,
    pub name: String,
    pub budget: Decimal,
    pub player_count: i32,
    pub is_ready: bool,
    pub players: Vec<SquadPlayer>,
}

/// One roster entry: the player plus the team's listing state for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquadPlayer {
    pub id: i64,
    pub team_player_id: i64,
    pub name: String,
    pub position: Position,
    pub team_name: String,
    pub in_transfer_market: bool,
    pub asking_price: Option<Decimal>,
}
