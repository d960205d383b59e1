//! The squad pool: pre-built 20-player squads handed out to new users.
//!
//! The pool is read once at startup. A cursor advances monotonically over it;
//! once an entry is assigned or rejected it is never looked at again.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use kickoff_sdk::objects::Position;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};

use crate::entities::player::NewPlayer;

/// Number of players every pool squad must have.
pub const SQUAD_SIZE: usize = 20;

/// Errors raised while loading the pool file.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("failed to read squad pool: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse squad pool: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A player as written in the pool file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PoolPlayer {
    pub name: String,
    /// Long-form position (`Goalkeeper`, `Defender`, `Midfielder`, `Attacker`).
    pub position: String,
}

/// One pre-built squad.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PoolSquad {
    pub players: Vec<PoolPlayer>,
}

/// Why a pool entry can never be assigned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SquadRejection {
    #[error("squad has {0} players instead of {SQUAD_SIZE}")]
    WrongSize(usize),

    #[error("unknown position {position:?} for player {player:?}")]
    UnknownPosition { player: String, position: String },

    #[error("player {0:?} appears twice in the squad")]
    DuplicateName(String),
}

impl PoolSquad {
    /// Check the squad's integrity and normalise its positions.
    pub fn validate(&self) -> Result<Vec<NewPlayer>, SquadRejection> {
        if self.players.len() != SQUAD_SIZE {
            return Err(SquadRejection::WrongSize(self.players.len()));
        }

        let mut seen = HashSet::with_capacity(SQUAD_SIZE);
        self.players
            .iter()
            .map(|p| {
                if !seen.insert(p.name.as_str()) {
                    return Err(SquadRejection::DuplicateName(p.name.clone()));
                }
                let position = Position::from_long_form(&p.position).ok_or_else(|| {
                    SquadRejection::UnknownPosition {
                        player: p.name.clone(),
                        position: p.position.clone(),
                    }
                })?;
                Ok(NewPlayer {
                    name: p.name.clone(),
                    position: position.into(),
                })
            })
            .collect()
    }
}

/// The loaded pool plus its process-wide cursor.
///
/// Constructed once at startup and shared by `Arc` between the allocator
/// (the only writer) and request handlers (readers of [`is_exhausted`]).
///
/// [`is_exhausted`]: SquadPool::is_exhausted
#[derive(Debug)]
pub struct SquadPool {
    squads: Vec<PoolSquad>,
    cursor: Mutex<usize>,
    consumed: AtomicUsize,
}

impl SquadPool {
    pub fn new(squads: Vec<PoolSquad>) -> Self {
        Self {
            squads,
            cursor: Mutex::new(0),
            consumed: AtomicUsize::new(0),
        }
    }

    /// Parse a pool from its JSON form: an array of `{ "players": [...] }`.
    pub fn from_json(json: &str) -> Result<Self, PoolError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Read and parse the pool file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PoolError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Total number of entries, consumed or not.
    pub fn len(&self) -> usize {
        self.squads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.squads.is_empty()
    }

    /// Entries not yet visited by the cursor.
    pub fn remaining(&self) -> usize {
        self.squads
            .len()
            .saturating_sub(self.consumed.load(Ordering::Acquire))
    }

    /// Whether every entry has been assigned or rejected.
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Take exclusive hold of the cursor for one allocation.
    pub async fn cursor(&self) -> PoolCursor<'_> {
        PoolCursor {
            position: self.cursor.lock().await,
            squads: &self.squads,
            consumed: &self.consumed,
        }
    }
}

/// Exclusive access to the pool cursor.
pub struct PoolCursor<'a> {
    position: MutexGuard<'a, usize>,
    squads: &'a [PoolSquad],
    consumed: &'a AtomicUsize,
}

impl<'a> PoolCursor<'a> {
    /// The entry under the cursor and its index, if any remain.
    pub fn peek(&self) -> Option<(usize, &'a PoolSquad)> {
        let index = *self.position;
        self.squads.get(index).map(|squad| (index, squad))
    }

    /// Move past the current entry. There is no way back.
    pub fn advance(&mut self) {
        if *self.position < self.squads.len() {
            *self.position += 1;
            self.consumed.store(*self.position, Ordering::Release);
        }
    }

    pub fn index(&self) -> usize {
        *self.position
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::entities::PlayerPosition;

    const POSITIONS: [&str; 4] = ["Goalkeeper", "Defender", "Midfielder", "Attacker"];

    /// A valid squad whose player names all start with `prefix`.
    pub(crate) fn squad(prefix: &str) -> PoolSquad {
        sized_squad(prefix, SQUAD_SIZE)
    }

    pub(crate) fn sized_squad(prefix: &str, size: usize) -> PoolSquad {
        PoolSquad {
            players: (0..size)
                .map(|i| PoolPlayer {
                    name: format!("{prefix} Player {i}"),
                    position: POSITIONS[i % POSITIONS.len()].to_owned(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_validate_normalises_positions() {
        let players = squad("Alpha").validate().unwrap();
        assert_eq!(players.len(), SQUAD_SIZE);
        assert_eq!(players[0].position, PlayerPosition::Goalkeeper);
        assert_eq!(players[1].position, PlayerPosition::Defender);
        assert_eq!(players[2].position, PlayerPosition::Midfielder);
        assert_eq!(players[3].position, PlayerPosition::Attacker);
    }

    #[test]
    fn test_validate_rejects_broken_squads() {
        assert_eq!(
            sized_squad("Short", 19).validate(),
            Err(SquadRejection::WrongSize(19))
        );

        let mut bad_position = squad("Beta");
        bad_position.players[5].position = "Sweeper".to_owned();
        assert!(matches!(
            bad_position.validate(),
            Err(SquadRejection::UnknownPosition { .. })
        ));

        let mut duplicate = squad("Gamma");
        duplicate.players[7].name = duplicate.players[3].name.clone();
        assert_eq!(
            duplicate.validate(),
            Err(SquadRejection::DuplicateName("Gamma Player 3".to_owned()))
        );
    }

    #[test]
    fn test_pool_parses_from_json() {
        let json = r#"[
            {"team": "Ignored extra field", "players": [
                {"name": "Keeper", "position": "Goalkeeper"}
            ]}
        ]"#;
        let pool = SquadPool::from_json(json).unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.remaining(), 1);
        assert!(SquadPool::from_json("{}").is_err());
    }

    #[tokio::test]
    async fn test_cursor_only_moves_forward() {
        let pool = SquadPool::new(vec![squad("A"), squad("B")]);
        {
            let mut cursor = pool.cursor().await;
            assert_eq!(cursor.peek().map(|(i, _)| i), Some(0));
            cursor.advance();
        }
        assert_eq!(pool.remaining(), 1);
        {
            let mut cursor = pool.cursor().await;
            assert_eq!(cursor.peek().map(|(i, _)| i), Some(1));
            cursor.advance();
            cursor.advance();
            assert!(cursor.peek().is_none());
            assert_eq!(cursor.index(), 2);
        }
        assert!(pool.is_exhausted());
    }
}
