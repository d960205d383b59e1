//! Transfer market request and response types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Position;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of `POST /api/transfer/sell`: list or unlist one of the caller's players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleSaleRequest {
    pub team_player_id: i64,
    pub in_transfer_market: bool,
    #[serde(default)]
    pub asking_price: Option<Decimal>,
}

/// Body of `POST /api/transfer/buy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyPlayerRequest {
    pub team_player_id: i64,
}

/// Query parameters of `GET /api/transfer/market`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Catalog data of a player embedded in market responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub id: i64,
    pub name: String,
    pub position: Position,
    pub team_name: String,
}

/// A team-player link as seen by its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamPlayerResponse {
    pub id: i64,
    pub team_id: i64,
    pub player_id: i64,
    pub in_transfer_market: bool,
    pub asking_price: Option<Decimal>,
    pub player: PlayerSummary,
}

/// The selling side of a market listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerTeam {
    pub id: i64,
    pub name: String,
    pub player_count: i32,
}

/// A listed player that the caller may buy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketListing {
    pub id: i64,
    pub asking_price: Decimal,
    pub player: PlayerSummary,
    pub team: SellerTeam,
}

/// Response of `POST /api/transfer/buy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyPlayerResponse {
    pub success: bool,
}

/// Pagination metadata for page-based listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

impl Pagination {
    /// Build pagination metadata; `total_pages` is `ceil(total / limit)`.
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let limit = limit.max(1);
        Self {
            page,
            limit,
            total,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

/// A page of results plus its pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

// ---------------------------------------------------------------------------
// Paging limits
// ---------------------------------------------------------------------------

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 50;
const MAX_PAGE: i64 = 10_000;

/// Clamp a 1-indexed page number and page size to safe bounds.
///
/// Returns `(page, limit, offset)`.
pub fn clamp_page(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).clamp(1, MAX_PAGE);
    let limit = limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE);
    (page, limit, (page - 1) * limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(Pagination::new(1, 10, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 10, 10).total_pages, 1);
        assert_eq!(Pagination::new(1, 10, 11).total_pages, 2);
        assert_eq!(Pagination::new(3, 10, 25).total_pages, 3);
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(None, None, DEFAULT_PAGE_SIZE), (1, 10, 0));
        assert_eq!(clamp_page(Some(3), None, DEFAULT_PAGE_SIZE), (3, 10, 20));
        assert_eq!(clamp_page(Some(0), Some(500), DEFAULT_PAGE_SIZE), (1, 50, 0));
        assert_eq!(clamp_page(Some(-4), Some(0), DEFAULT_PAGE_SIZE), (1, 1, 0));
    }

    #[test]
    fn test_requests_use_camel_case() {
        let body: ToggleSaleRequest = serde_json::from_str(
            r#"{"teamPlayerId": 5, "inTransferMarket": true, "askingPrice": 100000}"#,
        )
        .unwrap();
        assert_eq!(body.team_player_id, 5);
        assert!(body.in_transfer_market);
        assert_eq!(body.asking_price, Some(Decimal::from(100_000)));

        let unlist: ToggleSaleRequest =
            serde_json::from_str(r#"{"teamPlayerId": 5, "inTransferMarket": false}"#).unwrap();
        assert_eq!(unlist.asking_price, None);

        let pagination = serde_json::to_value(Pagination::new(2, 10, 15)).unwrap();
        assert_eq!(pagination["totalPages"], 2);
    }
}
