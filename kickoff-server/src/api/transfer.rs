//! Transfer market endpoints.

use axum::{Json, extract::State};
use kickoff_core::market;
use kickoff_sdk::objects::ApiEnvelope;
use kickoff_sdk::objects::market::{
    BuyPlayerRequest, BuyPlayerResponse, MarketListing, MarketQuery, Page, TeamPlayerResponse,
    ToggleSaleRequest,
};

use crate::api::extractors::{ApiJson, ApiQuery, AuthUser};
use crate::api::{ApiError, success};
use crate::state::AppState;

/// `GET /transfer/sell`: the caller's players and their listing state.
pub async fn list_for_sale(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiEnvelope<Vec<TeamPlayerResponse>>>, ApiError> {
    let players = market::list_players_for_sale(&state.processor(), user_id).await?;
    Ok(success("Players fetched", players))
}

/// `POST /transfer/sell`: list or unlist one of the caller's players.
pub async fn toggle_sale(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<ToggleSaleRequest>,
) -> Result<Json<ApiEnvelope<TeamPlayerResponse>>, ApiError> {
    let updated = market::toggle_sale_status(&state.processor(), user_id, body).await?;
    let message = if updated.in_transfer_market {
        "Player listed for transfer"
    } else {
        "Player removed from transfer market"
    };
    Ok(success(message, updated))
}

/// `POST /transfer/buy`: buy a listed player.
pub async fn buy(
    State(state): State<AppState>,
    buyer: Option<AuthUser>,
    ApiJson(body): ApiJson<BuyPlayerRequest>,
) -> Result<Json<ApiEnvelope<BuyPlayerResponse>>, ApiError> {
    let buyer_id = buyer.map(|AuthUser(id)| id);
    let response = market::buy_player(&state.processor(), buyer_id, body.team_player_id).await?;
    Ok(success("Player bought successfully", response))
}

/// `GET /transfer/market`: search listings the caller could buy.
pub async fn search_market(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiQuery(query): ApiQuery<MarketQuery>,
) -> Result<Json<ApiEnvelope<Page<MarketListing>>>, ApiError> {
    let page =
        market::filter_transfer_market(&state.processor(), user_id, &query, state.market.page_size)
            .await?;
    Ok(success("Transfer market", page))
}
