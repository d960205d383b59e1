use kanau::processor::Processor;
use rust_decimal::Decimal;

use crate::framework::{DatabaseProcessor, PgTransaction};

/// Smallest squad a ready team may hold.
pub const MIN_ROSTER: i64 = 15;
/// Largest squad a ready team may hold.
pub const MAX_ROSTER: i64 = 25;
/// Teams must keep strictly more than [`MIN_ROSTER`] players to sell, so only
/// teams at or above this size are shown as sellers on the market.
pub const MIN_SELLER_ROSTER: i64 = MIN_ROSTER + 1;
/// Budget every new team starts with (5,000,000.00).
pub const STARTING_BUDGET: Decimal = Decimal::from_parts(500_000_000, 0, 0, false, 2);

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Team {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub budget: Decimal,
    pub is_ready: bool,
    pub player_count: i32,
    pub created_at: time::PrimitiveDateTime,
    pub updated_at: time::PrimitiveDateTime,
}

/// A team row locked for a transfer, with its live roster size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedTeam {
    pub id: i64,
    pub user_id: i64,
    pub budget: Decimal,
    pub roster_size: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct LockedTeamRow {
    id: i64,
    user_id: i64,
    budget: Decimal,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct RosterCountRow {
    team_id: i64,
    roster_size: i64,
}

/// Find the team owned by a user.
#[derive(Debug, Clone, Copy)]
pub struct GetTeamByUser {
    pub user_id: i64,
}

impl Processor<GetTeamByUser> for DatabaseProcessor {
    type Output = Option<Team>;
    type Error = sqlx::Error;

    #[tracing::instrument(skip_all, err, name = "SQL:GetTeamByUser")]
    async fn process(&self, query: GetTeamByUser) -> Result<Option<Team>, sqlx::Error> {
        sqlx::query_as::<_, Team>(
            r#"
            SELECT id, user_id, name, budget, is_ready, player_count, created_at, updated_at
            FROM teams
            WHERE user_id = $1
            "#,
        )
        .bind(query.user_id)
        .fetch_optional(&self.pool)
        .await
    }
}

impl Team {
    /// Insert a not-yet-ready team for a user and return its id.
    pub async fn insert_tx(
        tx: &mut PgTransaction<'_>,
        user_id: i64,
        name: &str,
        player_count: i32,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO teams (user_id, name, budget, is_ready, player_count)
            VALUES ($1, $2, $3, FALSE, $4)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(STARTING_BUDGET)
        .bind(player_count)
        .fetch_one(&mut **tx)
        .await
    }

    /// Flag a team as ready once its squad links exist.
    pub async fn mark_ready_tx(
        tx: &mut PgTransaction<'_>,
        team_id: i64,
        player_count: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE teams
            SET is_ready = TRUE, player_count = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(team_id)
        .bind(player_count)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Lock the buyer's team (by owner) and the seller's team (by id) with
    /// `FOR UPDATE`, always in ascending id order, then count their rosters.
    ///
    /// Returns `(buyer, seller)`; either may be missing.
    pub async fn lock_pair_tx(
        tx: &mut PgTransaction<'_>,
        buyer_user_id: i64,
        seller_team_id: Option<i64>,
    ) -> Result<(Option<LockedTeam>, Option<LockedTeam>), sqlx::Error> {
        let rows = sqlx::query_as::<_, LockedTeamRow>(
            r#"
            SELECT id, user_id, budget
            FROM teams
            WHERE user_id = $1 OR id = $2
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(buyer_user_id)
        .bind(seller_team_id)
        .fetch_all(&mut **tx)
        .await?;

        // Counted after the locks are held.
        let team_ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let counts = sqlx::query_as::<_, RosterCountRow>(
            r#"
            SELECT team_id, COUNT(*) AS roster_size
            FROM team_players
            WHERE team_id = ANY($1)
            GROUP BY team_id
            "#,
        )
        .bind(&team_ids)
        .fetch_all(&mut **tx)
        .await?;

        let locked = |row: &LockedTeamRow| LockedTeam {
            id: row.id,
            user_id: row.user_id,
            budget: row.budget,
            roster_size: counts
                .iter()
                .find(|c| c.team_id == row.id)
                .map_or(0, |c| c.roster_size),
        };

        let buyer = rows.iter().find(|r| r.user_id == buyer_user_id).map(locked);
        let seller = seller_team_id
            .and_then(|id| rows.iter().find(|r| r.id == id))
            .map(locked);
        Ok((buyer, seller))
    }

    /// Move money and roster count of one side of a transfer.
    pub async fn adjust_tx(
        tx: &mut PgTransaction<'_>,
        team_id: i64,
        budget_delta: Decimal,
        player_delta: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE teams
            SET budget = budget + $2,
                player_count = player_count + $3,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(team_id)
        .bind(budget_delta)
        .bind(player_delta)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
