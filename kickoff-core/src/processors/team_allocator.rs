//! TeamAllocator processor.
//!
//! The TeamAllocator is responsible for:
//! - Receiving user ids from the `AllocationQueue`
//! - Skipping users that already own a team
//! - Walking the squad pool from its shared cursor, rejecting entries that are
//!   malformed or reuse a player name already in the catalog
//! - Creating the team, its 20 players and their links in one transaction
//!
//! There is exactly one allocator per process. A failed job is logged and
//! dropped; team-status polling puts the user back in the queue.

use std::sync::Arc;

use async_trait::async_trait;
use kanau::processor::Processor;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::allocation::AllocationQueue;
use crate::entities::player::{FindExistingPlayerNames, NewPlayer};
use crate::entities::team::{GetTeamByUser, Team};
use crate::entities::team_player::TeamPlayer;
use crate::framework::DatabaseProcessor;
use crate::pool::{SQUAD_SIZE, SquadPool};

/// Errors that end an allocation job.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// Every pool entry has been consumed and none could be assigned.
    #[error("squad pool exhausted while allocating for user {user_id}")]
    PoolExhausted { user_id: i64 },

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result of a successful allocation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationOutcome {
    /// The user already had a team; nothing was consumed.
    AlreadyAssigned,
    /// A new team was created from the pool entry at `pool_index`.
    Assigned { team_id: i64, pool_index: usize },
}

/// Allocate a team for one user.
#[derive(Debug, Clone, Copy)]
pub struct AllocateTeam {
    pub user_id: i64,
}

/// Storage operations the allocator needs.
///
/// Implemented by [`DatabaseProcessor`]; tests use an in-memory store.
#[async_trait]
pub trait SquadStore: Send + Sync {
    /// Whether the user already owns a team.
    async fn has_team(&self, user_id: i64) -> Result<bool, sqlx::Error>;

    /// Which of the given player names already exist in the catalog.
    async fn existing_player_names(&self, names: Vec<String>) -> Result<Vec<String>, sqlx::Error>;

    /// Create the team, its players and their links, and mark it ready.
    ///
    /// Must be all or nothing. Returns the new team id.
    async fn create_squad(
        &self,
        user_id: i64,
        team_name: &str,
        players: &[NewPlayer],
    ) -> Result<i64, sqlx::Error>;
}

#[async_trait]
impl SquadStore for DatabaseProcessor {
    async fn has_team(&self, user_id: i64) -> Result<bool, sqlx::Error> {
        Ok(self.process(GetTeamByUser { user_id }).await?.is_some())
    }

    async fn existing_player_names(&self, names: Vec<String>) -> Result<Vec<String>, sqlx::Error> {
        self.process(FindExistingPlayerNames { names }).await
    }

    async fn create_squad(
        &self,
        user_id: i64,
        team_name: &str,
        players: &[NewPlayer],
    ) -> Result<i64, sqlx::Error> {
        let player_count = i32::try_from(players.len()).unwrap_or(i32::MAX);
        let mut tx = self.begin().await?;
        let team_id = Team::insert_tx(&mut tx, user_id, team_name, 0).await?;
        let player_ids = NewPlayer::insert_many_tx(&mut tx, players, team_name).await?;
        TeamPlayer::insert_links_tx(&mut tx, team_id, &player_ids).await?;
        Team::mark_ready_tx(&mut tx, team_id, player_count).await?;
        tx.commit().await?;
        Ok(team_id)
    }
}

/// Whether the database refused a write because of the data itself, so
/// retrying the same pool entry cannot succeed.
fn is_constraint_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => !matches!(db.kind(), sqlx::error::ErrorKind::Other),
        _ => false,
    }
}

/// Name given to the team of a freshly allocated user.
pub fn team_name_for(user_id: i64) -> String {
    format!("User{user_id}_Team")
}

/// Assigns pool squads to queued users.
pub struct TeamAllocator<S> {
    store: S,
    pool: Arc<SquadPool>,
    queue: Arc<AllocationQueue>,
}

impl<S: SquadStore> TeamAllocator<S> {
    pub fn new(store: S, pool: Arc<SquadPool>, queue: Arc<AllocationQueue>) -> Self {
        Self { store, pool, queue }
    }

    /// Run the assignment algorithm for one user.
    ///
    /// The pool cursor is held for the whole call. Entries are consumed when
    /// accepted or rejected, including when the database refuses the squad
    /// with a constraint violation. Any other store error leaves the cursor
    /// on the entry being examined so the next job retries it.
    pub async fn allocate(&self, user_id: i64) -> Result<AllocationOutcome, AllocationError> {
        if self.store.has_team(user_id).await? {
            debug!(user_id, "User already has a team, skipping allocation");
            return Ok(AllocationOutcome::AlreadyAssigned);
        }

        let mut cursor = self.pool.cursor().await;
        while let Some((index, squad)) = cursor.peek() {
            let players = match squad.validate() {
                Ok(players) => players,
                Err(reason) => {
                    warn!(pool_index = index, reason = %reason, "Rejecting malformed pool entry");
                    cursor.advance();
                    continue;
                }
            };

            let names = players.iter().map(|p| p.name.clone()).collect();
            let taken = self.store.existing_player_names(names).await?;
            if !taken.is_empty() {
                warn!(
                    pool_index = index,
                    taken = ?taken,
                    "Rejecting pool entry with player names already in the catalog"
                );
                cursor.advance();
                continue;
            }

            let team_name = team_name_for(user_id);
            let team_id = match self.store.create_squad(user_id, &team_name, &players).await {
                Ok(team_id) => team_id,
                Err(e) if is_constraint_violation(&e) => {
                    // Another writer may have created this user's team.
                    if self.store.has_team(user_id).await? {
                        return Ok(AllocationOutcome::AlreadyAssigned);
                    }
                    warn!(
                        pool_index = index,
                        error = %e,
                        "Rejecting pool entry that violates a schema constraint"
                    );
                    cursor.advance();
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            cursor.advance();
            info!(
                user_id,
                team_id,
                pool_index = index,
                players = SQUAD_SIZE,
                "Assigned squad to user"
            );
            return Ok(AllocationOutcome::Assigned {
                team_id,
                pool_index: index,
            });
        }

        Err(AllocationError::PoolExhausted { user_id })
    }

    /// Run the allocator until shutdown is signalled.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        info!(
            pool_size = self.pool.len(),
            remaining = self.pool.remaining(),
            "TeamAllocator started"
        );

        loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("TeamAllocator received shutdown signal");
                        break;
                    }
                }

                user_id = self.queue.next() => {
                    debug!(user_id, backlog = self.queue.len(), "Received allocation job");
                    if let Err(e) = self.allocate(user_id).await {
                        match e {
                            AllocationError::PoolExhausted { .. } => {
                                error!(user_id, error = %e, "No squads left to assign");
                            }
                            AllocationError::Database(_) => {
                                error!(user_id, error = %e, "Failed to allocate team");
                            }
                        }
                    }
                }
            }
        }

        info!("TeamAllocator shutdown complete");
    }
}

impl<S: SquadStore> Processor<AllocateTeam> for TeamAllocator<S> {
    type Output = AllocationOutcome;
    type Error = AllocationError;

    async fn process(&self, job: AllocateTeam) -> Result<AllocationOutcome, AllocationError> {
        self.allocate(job.user_id).await
    }
}
