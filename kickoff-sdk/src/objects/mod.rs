//! Request and response types shared by the server and its clients.

pub mod auth;
pub mod market;
pub mod team;

use serde::{Deserialize, Serialize};

/// Playing position of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "GK")]
    Goalkeeper,
    #[serde(rename = "DEF")]
    Defender,
    #[serde(rename = "MID")]
    Midfielder,
    #[serde(rename = "ATT")]
    Attacker,
}

impl Position {
    /// Parse the long-form names used by the squad pool file
    /// (`Goalkeeper`, `Defender`, `Midfielder`, `Attacker`).
    pub fn from_long_form(value: &str) -> Option<Self> {
        match value {
            "Goalkeeper" => Some(Self::Goalkeeper),
            "Defender" => Some(Self::Defender),
            "Midfielder" => Some(Self::Midfielder),
            "Attacker" => Some(Self::Attacker),
            _ => None,
        }
    }

    /// The short code stored in the database and sent over the wire.
    pub fn code(self) -> &'static str {
        match self {
            Self::Goalkeeper => "GK",
            Self::Defender => "DEF",
            Self::Midfielder => "MID",
            Self::Attacker => "ATT",
        }
    }
}

/// Outcome marker carried in every response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    /// The request succeeded.
    Success,
    /// The request was rejected (validation, not found, conflict, auth).
    Fail,
    /// The server failed to process the request.
    Error,
}

/// Envelope wrapping every successful response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status: ResponseStatus,
    pub message: String,
    pub data: T,
}

impl<T> ApiEnvelope<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: message.into(),
            data,
        }
    }
}

/// Envelope returned for every rejected or failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiFailure {
    pub status: ResponseStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_codes() {
        assert_eq!(
            Position::from_long_form("Goalkeeper"),
            Some(Position::Goalkeeper)
        );
        assert_eq!(Position::from_long_form("Attacker"), Some(Position::Attacker));
        assert_eq!(Position::from_long_form("Striker"), None);
        assert_eq!(
            serde_json::to_string(&Position::Midfielder).unwrap(),
            "\"MID\""
        );
        assert_eq!(Position::Defender.code(), "DEF");
    }
}
