//! Transfer market operations.
//!
//! Listing changes are single-row updates guarded by ownership in the
//! `WHERE` clause. Purchases lock the link row and both team rows inside one
//! transaction before any rule is evaluated, so concurrent buyers serialise
//! on the listing and budgets cannot be spent twice.

pub mod rules;

use kanau::processor::Processor;
use kickoff_sdk::objects::market::{
    BuyPlayerResponse, MarketListing, MarketQuery, Page, Pagination, TeamPlayerResponse,
    ToggleSaleRequest,
};
use tracing::{debug, info};

use crate::entities::team::{GetTeamByUser, Team};
use crate::entities::team_player::{
    GetOwnedTeamPlayer, ListTeamPlayers, TeamPlayer, UpdateListing,
};
use crate::errors::ServiceError;
use crate::framework::DatabaseProcessor;

pub use rules::{ListingUpdate, MarketFilter, Settlement, settle, transfer_fee};

/// Every player of the caller's team with its listing state.
pub async fn list_players_for_sale(
    db: &DatabaseProcessor,
    user_id: i64,
) -> Result<Vec<TeamPlayerResponse>, ServiceError> {
    let team = db
        .process(GetTeamByUser { user_id })
        .await?
        .ok_or(ServiceError::NotFound("Team not found"))?;
    let players = db.process(ListTeamPlayers { team_id: team.id }).await?;
    Ok(players.iter().map(TeamPlayerResponse::from).collect())
}

/// List or unlist one of the caller's players.
pub async fn toggle_sale_status(
    db: &DatabaseProcessor,
    user_id: i64,
    request: ToggleSaleRequest,
) -> Result<TeamPlayerResponse, ServiceError> {
    let owned = GetOwnedTeamPlayer {
        team_player_id: request.team_player_id,
        user_id,
    };
    if db.process(owned).await?.is_none() {
        return Err(ServiceError::NotFound("Player not found"));
    }

    let update = ListingUpdate::new(request.in_transfer_market, request.asking_price)?;
    let written = db
        .process(UpdateListing {
            team_player_id: request.team_player_id,
            user_id,
            in_transfer_market: update.in_transfer_market,
            asking_price: update.asking_price,
        })
        .await?;
    if !written {
        return Err(ServiceError::NotFound("Player not found"));
    }

    let updated = db
        .process(owned)
        .await?
        .ok_or(ServiceError::NotFound("Player not found"))?;
    info!(
        user_id,
        team_player_id = updated.id,
        listed = updated.in_transfer_market,
        asking_price = ?updated.asking_price,
        "Updated transfer listing"
    );
    Ok(TeamPlayerResponse::from(&updated))
}

/// Buy a listed player for the caller's team.
///
/// All-or-nothing: any failure drops the transaction and leaves every row
/// as it was.
pub async fn buy_player(
    db: &DatabaseProcessor,
    buyer_id: Option<i64>,
    team_player_id: i64,
) -> Result<BuyPlayerResponse, ServiceError> {
    let buyer_id = buyer_id.ok_or(ServiceError::Validation("BuyerId required"))?;

    let mut tx = db.begin().await?;
    let listing = TeamPlayer::lock_tx(&mut tx, team_player_id).await?;
    let (buyer, seller) =
        Team::lock_pair_tx(&mut tx, buyer_id, listing.as_ref().map(|tp| tp.team_id)).await?;

    let settlement = settle(buyer_id, buyer.as_ref(), listing.as_ref(), seller.as_ref())?;
    debug!(buyer_id, settlement = ?settlement, "Transfer checks passed");

    TeamPlayer::transfer_tx(&mut tx, settlement.team_player_id, settlement.buyer_team_id).await?;
    Team::adjust_tx(&mut tx, settlement.buyer_team_id, -settlement.fee, 1).await?;
    Team::adjust_tx(&mut tx, settlement.seller_team_id, settlement.fee, -1).await?;
    tx.commit().await?;

    info!(
        buyer_id,
        team_player_id,
        buyer_team_id = settlement.buyer_team_id,
        seller_team_id = settlement.seller_team_id,
        fee = %settlement.fee,
        "Transfer completed"
    );
    Ok(BuyPlayerResponse { success: true })
}

/// Search listings the caller could buy, cheapest first.
pub async fn filter_transfer_market(
    db: &DatabaseProcessor,
    user_id: i64,
    query: &MarketQuery,
    default_limit: i64,
) -> Result<Page<MarketListing>, ServiceError> {
    let filter = MarketFilter::from_query(query, default_limit)?;
    let (rows, total) = db.process(filter.search_for(user_id)).await?;
    Ok(Page {
        data: rows.iter().map(MarketListing::from).collect(),
        pagination: Pagination::new(filter.page, filter.limit, total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::PlayerPosition;
    use crate::entities::player::NewPlayer;
    use crate::entities::team::STARTING_BUDGET;
    use crate::entities::user::CreateUser;
    use crate::errors::ErrorKind;
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    struct Seeded {
        user_id: i64,
        team_id: i64,
        links: Vec<i64>,
    }

    async fn seed_team(db: &DatabaseProcessor, label: &str, roster: usize) -> Seeded {
        let user = db
            .process(CreateUser {
                email: format!("{}@example.com", label.to_lowercase()),
                password_hash: "unused".to_owned(),
            })
            .await
            .unwrap()
            .unwrap();

        let team_name = format!("{label} FC");
        let players: Vec<NewPlayer> = (0..roster)
            .map(|i| NewPlayer {
                name: format!("{label} Player {i}"),
                position: PlayerPosition::Midfielder,
            })
            .collect();

        let mut tx = db.begin().await.unwrap();
        let team_id = Team::insert_tx(&mut tx, user.id, &team_name, 0).await.unwrap();
        let player_ids = NewPlayer::insert_many_tx(&mut tx, &players, &team_name)
            .await
            .unwrap();
        TeamPlayer::insert_links_tx(&mut tx, team_id, &player_ids)
            .await
            .unwrap();
        Team::mark_ready_tx(&mut tx, team_id, roster as i32).await.unwrap();
        tx.commit().await.unwrap();

        let links = db
            .process(ListTeamPlayers { team_id })
            .await
            .unwrap()
            .iter()
            .map(|tp| tp.id)
            .collect();
        Seeded {
            user_id: user.id,
            team_id,
            links,
        }
    }

    async fn list(db: &DatabaseProcessor, team: &Seeded, link: usize, price: i64) {
        toggle_sale_status(
            db,
            team.user_id,
            ToggleSaleRequest {
                team_player_id: team.links[link],
                in_transfer_market: true,
                asking_price: Some(Decimal::from(price)),
            },
        )
        .await
        .unwrap();
    }

    async fn team_of(db: &DatabaseProcessor, user_id: i64) -> Team {
        db.process(GetTeamByUser { user_id }).await.unwrap().unwrap()
    }

    async fn link_state(db: &DatabaseProcessor, team_id: i64, link: i64) -> Option<TeamPlayer> {
        db.process(ListTeamPlayers { team_id })
            .await
            .unwrap()
            .into_iter()
            .find(|tp| tp.id == link)
            .map(|tp| TeamPlayer {
                id: tp.id,
                team_id: tp.team_id,
                player_id: tp.player_id,
                in_transfer_market: tp.in_transfer_market,
                asking_price: tp.asking_price,
            })
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_market_search_filters_and_orders(pool: PgPool) {
        let db = DatabaseProcessor::new(pool);
        let me = seed_team(&db, "Requester", 20).await;
        let seller = seed_team(&db, "Seller", 20).await;
        let floor = seed_team(&db, "Floor", 15).await;

        for (link, price) in [(0, 250_000), (1, 200_000), (2, 40_000), (3, 120_000), (4, 50_000)] {
            list(&db, &seller, link, price).await;
        }
        list(&db, &floor, 0, 100_000).await;
        list(&db, &me, 0, 150_000).await;

        let query = MarketQuery {
            player_name: None,
            team_name: None,
            min: Some(Decimal::from(50_000)),
            max: Some(Decimal::from(200_000)),
            page: None,
            limit: None,
        };
        let page = filter_transfer_market(&db, me.user_id, &query, 10).await.unwrap();

        let prices: Vec<Decimal> = page.data.iter().map(|l| l.asking_price).collect();
        assert_eq!(
            prices,
            vec![
                Decimal::from(50_000),
                Decimal::from(120_000),
                Decimal::from(200_000)
            ]
        );
        assert!(page.data.iter().all(|l| l.team.id == seller.team_id));
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.pagination.total_pages, 1);

        let target = page.data[1].clone();
        let by_name = MarketQuery {
            player_name: Some(target.player.name.to_uppercase()),
            ..query
        };
        let page = filter_transfer_market(&db, me.user_id, &by_name, 10).await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].id, target.id);
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_cannot_list_another_teams_player(pool: PgPool) {
        let db = DatabaseProcessor::new(pool);
        let me = seed_team(&db, "Requester", 20).await;
        let other = seed_team(&db, "Other", 20).await;

        let err = toggle_sale_status(
            &db,
            me.user_id,
            ToggleSaleRequest {
                team_player_id: other.links[0],
                in_transfer_market: true,
                asking_price: Some(Decimal::from(10_000)),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let untouched = link_state(&db, other.team_id, other.links[0]).await.unwrap();
        assert!(!untouched.in_transfer_market);
        assert_eq!(untouched.asking_price, None);
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_purchase_moves_player_and_money(pool: PgPool) {
        let db = DatabaseProcessor::new(pool);
        let buyer = seed_team(&db, "Buyer", 20).await;
        let seller = seed_team(&db, "Seller", 20).await;
        list(&db, &seller, 0, 100_000).await;
        let link = seller.links[0];

        let response = buy_player(&db, Some(buyer.user_id), link).await.unwrap();
        assert!(response.success);

        let buyer_team = team_of(&db, buyer.user_id).await;
        let seller_team = team_of(&db, seller.user_id).await;
        assert_eq!(buyer_team.budget, Decimal::from(4_905_000));
        assert_eq!(seller_team.budget, Decimal::from(5_095_000));
        assert_eq!(buyer_team.budget + seller_team.budget, Decimal::from(10_000_000));
        assert_eq!(buyer_team.player_count, 21);
        assert_eq!(seller_team.player_count, 19);

        let moved = link_state(&db, buyer.team_id, link).await.unwrap();
        assert!(!moved.in_transfer_market);
        assert_eq!(moved.asking_price, None);
        assert!(link_state(&db, seller.team_id, link).await.is_none());

        // Already sold and unlisted.
        let again = buy_player(&db, Some(buyer.user_id), link).await.unwrap_err();
        assert_eq!(again.kind(), ErrorKind::NotFound);
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_failed_purchase_changes_nothing(pool: PgPool) {
        let db = DatabaseProcessor::new(pool);
        let buyer = seed_team(&db, "Buyer", 20).await;
        let seller = seed_team(&db, "Floor", 15).await;
        list(&db, &seller, 0, 100_000).await;
        let link = seller.links[0];

        let err = buy_player(&db, Some(buyer.user_id), link).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let own = buy_player(&db, Some(seller.user_id), link).await.unwrap_err();
        assert_eq!(own.kind(), ErrorKind::Conflict);

        let buyer_team = team_of(&db, buyer.user_id).await;
        let seller_team = team_of(&db, seller.user_id).await;
        assert_eq!(buyer_team.budget, STARTING_BUDGET);
        assert_eq!(seller_team.budget, STARTING_BUDGET);
        assert_eq!(buyer_team.player_count, 20);
        assert_eq!(seller_team.player_count, 15);

        let listing = link_state(&db, seller.team_id, link).await.unwrap();
        assert!(listing.in_transfer_market);
        assert_eq!(listing.asking_price, Some(Decimal::from(100_000)));
    }
}
