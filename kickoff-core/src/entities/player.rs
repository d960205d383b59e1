use kanau::processor::Processor;

use crate::entities::PlayerPosition;
use crate::framework::{DatabaseProcessor, PgTransaction};

/// A player about to be added to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlayer {
    pub name: String,
    pub position: PlayerPosition,
}

/// Which of the given names already exist in the catalog.
#[derive(Debug, Clone)]
pub struct FindExistingPlayerNames {
    pub names: Vec<String>,
}

impl Processor<FindExistingPlayerNames> for DatabaseProcessor {
    type Output = Vec<String>;
    type Error = sqlx::Error;

    #[tracing::instrument(skip_all, err, name = "SQL:FindExistingPlayerNames")]
    async fn process(&self, query: FindExistingPlayerNames) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT name FROM players WHERE name = ANY($1)")
            .bind(&query.names)
            .fetch_all(&self.pool)
            .await
    }
}

impl NewPlayer {
    /// Insert a batch of players tagged with their originating team name.
    ///
    /// Returns the new ids.
    pub async fn insert_many_tx(
        tx: &mut PgTransaction<'_>,
        players: &[NewPlayer],
        team_name: &str,
    ) -> Result<Vec<i64>, sqlx::Error> {
        let names: Vec<&str> = players.iter().map(|p| p.name.as_str()).collect();
        let positions: Vec<&str> = players.iter().map(|p| p.position.code()).collect();
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO players (name, position, team_name)
            SELECT name, position::player_position, $3
            FROM UNNEST($1::text[], $2::text[]) AS t(name, position)
            RETURNING id
            "#,
        )
        .bind(&names)
        .bind(&positions)
        .bind(team_name)
        .fetch_all(&mut **tx)
        .await
    }
}
