use kanau::processor::Processor;
use kickoff_sdk::objects::market::{MarketListing, PlayerSummary, SellerTeam, TeamPlayerResponse};
use kickoff_sdk::objects::team::SquadPlayer;
use rust_decimal::Decimal;

use crate::entities::PlayerPosition;
use crate::framework::{DatabaseProcessor, PgTransaction};

/// A team-player link joined with its catalog player.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TeamPlayerDetail {
    pub id: i64,
    pub team_id: i64,
    pub player_id: i64,
    pub in_transfer_market: bool,
    pub asking_price: Option<Decimal>,
    pub player_name: String,
    pub player_position: PlayerPosition,
    pub player_team_name: String,
}

impl TeamPlayerDetail {
    fn player_summary(&self) -> PlayerSummary {
        PlayerSummary {
            id: self.player_id,
            name: self.player_name.clone(),
            position: self.player_position.into(),
            team_name: self.player_team_name.clone(),
        }
    }
}

impl From<&TeamPlayerDetail> for TeamPlayerResponse {
    fn from(tp: &TeamPlayerDetail) -> Self {
        TeamPlayerResponse {
            id: tp.id,
            team_id: tp.team_id,
            player_id: tp.player_id,
            in_transfer_market: tp.in_transfer_market,
            asking_price: tp.asking_price,
            player: tp.player_summary(),
        }
    }
}

impl From<&TeamPlayerDetail> for SquadPlayer {
    fn from(tp: &TeamPlayerDetail) -> Self {
        SquadPlayer {
            id: tp.player_id,
            team_player_id: tp.id,
            name: tp.player_name.clone(),
            position: tp.player_position.into(),
            team_name: tp.player_team_name.clone(),
            in_transfer_market: tp.in_transfer_market,
            asking_price: tp.asking_price,
        }
    }
}

/// The ownership-and-listing link between a team and a player.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TeamPlayer {
    pub id: i64,
    pub team_id: i64,
    pub player_id: i64,
    pub in_transfer_market: bool,
    pub asking_price: Option<Decimal>,
}

/// One row of a market search.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct MarketRow {
    pub id: i64,
    pub asking_price: Decimal,
    pub player_id: i64,
    pub player_name: String,
    pub player_position: PlayerPosition,
    pub player_team_name: String,
    pub team_id: i64,
    pub team_name: String,
    pub team_player_count: i32,
}

impl From<&MarketRow> for MarketListing {
    fn from(row: &MarketRow) -> Self {
        MarketListing {
            id: row.id,
            asking_price: row.asking_price,
            player: PlayerSummary {
                id: row.player_id,
                name: row.player_name.clone(),
                position: row.player_position.into(),
                team_name: row.player_team_name.clone(),
            },
            team: SellerTeam {
                id: row.team_id,
                name: row.team_name.clone(),
                player_count: row.team_player_count,
            },
        }
    }
}

macro_rules! detail_select {
    () => {
        r#"
        SELECT tp.id, tp.team_id, tp.player_id, tp.in_transfer_market, tp.asking_price,
               p.name AS player_name,
               p.position AS player_position,
               p.team_name AS player_team_name
        FROM team_players tp
        JOIN players p ON p.id = tp.player_id
        "#
    };
}

/// Every link of a team, ordered by player position then name.
#[derive(Debug, Clone, Copy)]
pub struct ListTeamPlayers {
    pub team_id: i64,
}

/// One link, only if it belongs to a team owned by `user_id`.
#[derive(Debug, Clone, Copy)]
pub struct GetOwnedTeamPlayer {
    pub team_player_id: i64,
    pub user_id: i64,
}

/// Write the listing state of a link owned by `user_id`.
///
/// Yields `false` if no owned link matched.
#[derive(Debug, Clone, Copy)]
pub struct UpdateListing {
    pub team_player_id: i64,
    pub user_id: i64,
    pub in_transfer_market: bool,
    pub asking_price: Option<Decimal>,
}

impl Processor<ListTeamPlayers> for DatabaseProcessor {
    type Output = Vec<TeamPlayerDetail>;
    type Error = sqlx::Error;

    #[tracing::instrument(skip_all, err, name = "SQL:ListTeamPlayers")]
    async fn process(&self, query: ListTeamPlayers) -> Result<Vec<TeamPlayerDetail>, sqlx::Error> {
        sqlx::query_as::<_, TeamPlayerDetail>(concat!(
            detail_select!(),
            "WHERE tp.team_id = $1 ORDER BY p.position, p.name"
        ))
        .bind(query.team_id)
        .fetch_all(&self.pool)
        .await
    }
}

impl Processor<GetOwnedTeamPlayer> for DatabaseProcessor {
    type Output = Option<TeamPlayerDetail>;
    type Error = sqlx::Error;

    #[tracing::instrument(skip_all, err, name = "SQL:GetOwnedTeamPlayer")]
    async fn process(
        &self,
        query: GetOwnedTeamPlayer,
    ) -> Result<Option<TeamPlayerDetail>, sqlx::Error> {
        sqlx::query_as::<_, TeamPlayerDetail>(concat!(
            detail_select!(),
            "JOIN teams t ON t.id = tp.team_id WHERE tp.id = $1 AND t.user_id = $2"
        ))
        .bind(query.team_player_id)
        .bind(query.user_id)
        .fetch_optional(&self.pool)
        .await
    }
}

impl Processor<UpdateListing> for DatabaseProcessor {
    type Output = bool;
    type Error = sqlx::Error;

    #[tracing::instrument(skip_all, err, name = "SQL:UpdateListing")]
    async fn process(&self, update: UpdateListing) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE team_players tp
            SET in_transfer_market = $3, asking_price = $4, updated_at = now()
            FROM teams t
            WHERE tp.id = $1 AND t.id = tp.team_id AND t.user_id = $2
            "#,
        )
        .bind(update.team_player_id)
        .bind(update.user_id)
        .bind(update.in_transfer_market)
        .bind(update.asking_price)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

impl TeamPlayer {
    /// Link a batch of freshly created players to a team.
    pub async fn insert_links_tx(
        tx: &mut PgTransaction<'_>,
        team_id: i64,
        player_ids: &[i64],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO team_players (team_id, player_id)
            SELECT $1, player_id FROM UNNEST($2::bigint[]) AS t(player_id)
            "#,
        )
        .bind(team_id)
        .bind(player_ids)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    /// Lock a link row for the duration of a purchase.
    pub async fn lock_tx(
        tx: &mut PgTransaction<'_>,
        team_player_id: i64,
    ) -> Result<Option<TeamPlayer>, sqlx::Error> {
        sqlx::query_as::<_, TeamPlayer>(
            r#"
            SELECT id, team_id, player_id, in_transfer_market, asking_price
            FROM team_players
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(team_player_id)
        .fetch_optional(&mut **tx)
        .await
    }

    /// Hand the link to the buying team and take it off the market.
    pub async fn transfer_tx(
        tx: &mut PgTransaction<'_>,
        team_player_id: i64,
        buyer_team_id: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE team_players
            SET team_id = $2, in_transfer_market = FALSE, asking_price = NULL, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(team_player_id)
        .bind(buyer_team_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

macro_rules! market_where {
    () => {
        r#"
        FROM team_players tp
        JOIN players p ON p.id = tp.player_id
        JOIN teams t ON t.id = tp.team_id
        WHERE tp.in_transfer_market
          AND t.user_id <> $1
          AND t.player_count >= $2
          AND ($3::text IS NULL OR p.name ILIKE $3)
          AND ($4::text IS NULL OR t.name ILIKE $4)
          AND ($5::numeric IS NULL OR tp.asking_price >= $5)
          AND ($6::numeric IS NULL OR tp.asking_price <= $6)
        "#
    };
}

/// Listed players visible to `user_id`, cheapest first.
///
/// Name patterns are `ILIKE` patterns with `\` as escape character.
#[derive(Debug, Clone)]
pub struct SearchMarket {
    pub user_id: i64,
    pub min_seller_roster: i64,
    pub player_pattern: Option<String>,
    pub team_pattern: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub limit: i64,
    pub offset: i64,
}

impl Processor<SearchMarket> for DatabaseProcessor {
    type Output = (Vec<MarketRow>, i64);
    type Error = sqlx::Error;

    #[tracing::instrument(skip_all, err, name = "SQL:SearchMarket")]
    async fn process(&self, query: SearchMarket) -> Result<(Vec<MarketRow>, i64), sqlx::Error> {
        let total = sqlx::query_scalar::<_, i64>(concat!("SELECT COUNT(*) ", market_where!()))
            .bind(query.user_id)
            .bind(query.min_seller_roster)
            .bind(query.player_pattern.as_deref())
            .bind(query.team_pattern.as_deref())
            .bind(query.min_price)
            .bind(query.max_price)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, MarketRow>(concat!(
            r#"
            SELECT tp.id, tp.asking_price,
                   p.id AS player_id,
                   p.name AS player_name,
                   p.position AS player_position,
                   p.team_name AS player_team_name,
                   t.id AS team_id,
                   t.name AS team_name,
                   t.player_count AS team_player_count
            "#,
            market_where!(),
            "ORDER BY tp.asking_price ASC, tp.id ASC LIMIT $7 OFFSET $8"
        ))
        .bind(query.user_id)
        .bind(query.min_seller_roster)
        .bind(query.player_pattern.as_deref())
        .bind(query.team_pattern.as_deref())
        .bind(query.min_price)
        .bind(query.max_price)
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }
}
