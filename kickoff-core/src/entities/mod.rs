pub mod player;
pub mod team;
pub mod team_player;
pub mod user;

use kickoff_sdk::objects::Position as SdkPosition;

/// Player position for database operations.
///
/// This is the sqlx::Type version. For API/DTO use, see `kickoff_sdk::objects::Position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "player_position")]
pub enum PlayerPosition {
    #[sqlx(rename = "GK")]
    Goalkeeper,
    #[sqlx(rename = "DEF")]
    Defender,
    #[sqlx(rename = "MID")]
    Midfielder,
    #[sqlx(rename = "ATT")]
    Attacker,
}

impl From<PlayerPosition> for SdkPosition {
    fn from(value: PlayerPosition) -> Self {
        match value {
            PlayerPosition::Goalkeeper => SdkPosition::Goalkeeper,
            PlayerPosition::Defender => SdkPosition::Defender,
            PlayerPosition::Midfielder => SdkPosition::Midfielder,
            PlayerPosition::Attacker => SdkPosition::Attacker,
        }
    }
}

impl From<SdkPosition> for PlayerPosition {
    fn from(value: SdkPosition) -> Self {
        match value {
            SdkPosition::Goalkeeper => PlayerPosition::Goalkeeper,
            SdkPosition::Defender => PlayerPosition::Defender,
            SdkPosition::Midfielder => PlayerPosition::Midfielder,
            SdkPosition::Attacker => PlayerPosition::Attacker,
        }
    }
}

impl PlayerPosition {
    /// The enum label stored in Postgres.
    pub fn code(self) -> &'static str {
        SdkPosition::from(self).code()
    }
}
