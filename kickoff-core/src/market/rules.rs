//! Pure transfer-market rules, evaluated on rows already read (and, for
//! purchases, locked) by the caller.

use kickoff_sdk::objects::market::{MarketQuery, clamp_page};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::entities::team::{LockedTeam, MAX_ROSTER, MIN_ROSTER, MIN_SELLER_ROSTER};
use crate::entities::team_player::{SearchMarket, TeamPlayer};
use crate::errors::{ConflictReason, ServiceError};

/// Largest price a `NUMERIC(15, 2)` column holds.
pub const MAX_ASKING_PRICE: Decimal = Decimal::from_parts(2_764_472_319, 232_830, 0, false, 2);

/// Share of the asking price the buyer pays (95%).
pub const FEE_RATE: Decimal = Decimal::from_parts(95, 0, 0, false, 2);

/// Amount moved from buyer to seller for a listing, rounded to cents.
pub fn transfer_fee(asking_price: Decimal) -> Decimal {
    (asking_price * FEE_RATE).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// A purchase that passed every check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub team_player_id: i64,
    pub buyer_team_id: i64,
    pub seller_team_id: i64,
    pub fee: Decimal,
}

/// Decide whether `buyer_user_id` may buy `listing`.
///
/// Checks run in a fixed order and the first failure wins.
pub fn settle(
    buyer_user_id: i64,
    buyer: Option<&LockedTeam>,
    listing: Option<&TeamPlayer>,
    seller: Option<&LockedTeam>,
) -> Result<Settlement, ServiceError> {
    let buyer = buyer.ok_or(ServiceError::NotFound("Buyer team not found"))?;
    if buyer.roster_size >= MAX_ROSTER {
        return Err(ServiceError::Conflict(ConflictReason::RosterFull { max: MAX_ROSTER }));
    }

    let (listing, asking_price) = match listing {
        Some(tp) if tp.in_transfer_market => match tp.asking_price {
            Some(price) => (tp, price),
            None => return Err(ServiceError::NotFound("Player not available for transfer")),
        },
        _ => return Err(ServiceError::NotFound("Player not available for transfer")),
    };

    if seller.is_some_and(|s| s.user_id == buyer_user_id) || listing.team_id == buyer.id {
        return Err(ServiceError::Conflict(ConflictReason::SelfTrade));
    }

    let seller = seller.ok_or(ServiceError::NotFound("Seller's team not found"))?;
    if seller.roster_size <= MIN_ROSTER {
        return Err(ServiceError::Conflict(ConflictReason::SellerAtRosterFloor {
            min: MIN_ROSTER,
        }));
    }

    let fee = transfer_fee(asking_price);
    if buyer.budget < fee {
        return Err(ServiceError::Conflict(ConflictReason::InsufficientBudget {
            required: fee,
            available: buyer.budget,
        }));
    }

    Ok(Settlement {
        team_player_id: listing.id,
        buyer_team_id: buyer.id,
        seller_team_id: seller.id,
        fee,
    })
}

/// New listing state for a team-player link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingUpdate {
    pub in_transfer_market: bool,
    pub asking_price: Option<Decimal>,
}

impl ListingUpdate {
    /// Listing requires a price that is positive after rounding to cents and
    /// fits the column; unlisting always clears it.
    pub fn new(in_transfer_market: bool, asking_price: Option<Decimal>) -> Result<Self, ServiceError> {
        if !in_transfer_market {
            return Ok(Self {
                in_transfer_market,
                asking_price: None,
            });
        }
        let price = asking_price
            .map(|p| p.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero));
        match price {
            Some(price) if price > Decimal::ZERO && price <= MAX_ASKING_PRICE => Ok(Self {
                in_transfer_market,
                asking_price: Some(price),
            }),
            _ => Err(ServiceError::Validation("Invalid asking price")),
        }
    }
}

/// Escape `LIKE` metacharacters and wrap the needle for a substring match.
///
/// Blank input means "no filter".
pub fn substring_pattern(needle: Option<&str>) -> Option<String> {
    let needle = needle?.trim();
    if needle.is_empty() {
        return None;
    }
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}

/// A validated market search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketFilter {
    pub player_pattern: Option<String>,
    pub team_pattern: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub page: i64,
    pub limit: i64,
    pub offset: i64,
}

impl MarketFilter {
    pub fn from_query(query: &MarketQuery, default_limit: i64) -> Result<Self, ServiceError> {
        if query.min.is_some_and(|m| m < Decimal::ZERO)
            || query.max.is_some_and(|m| m < Decimal::ZERO)
        {
            return Err(ServiceError::Validation("Price bounds must not be negative"));
        }
        if let (Some(min), Some(max)) = (query.min, query.max) {
            if min > max {
                return Err(ServiceError::Validation(
                    "Minimum price must not exceed maximum price",
                ));
            }
        }

        let (page, limit, offset) = clamp_page(query.page, query.limit, default_limit);
        Ok(Self {
            player_pattern: substring_pattern(query.player_name.as_deref()),
            team_pattern: substring_pattern(query.team_name.as_deref()),
            min_price: query.min,
            max_price: query.max,
            page,
            limit,
            offset,
        })
    }

    /// The database query for this filter as seen by `user_id`.
    pub fn search_for(&self, user_id: i64) -> SearchMarket {
        SearchMarket {
            user_id,
            min_seller_roster: MIN_SELLER_ROSTER,
            player_pattern: self.player_pattern.clone(),
            team_pattern: self.team_pattern.clone(),
            min_price: self.min_price,
            max_price: self.max_price,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    fn team(id: i64, user_id: i64, budget: i64, roster_size: i64) -> LockedTeam {
        LockedTeam {
            id,
            user_id,
            budget: Decimal::from(budget),
            roster_size,
        }
    }

    fn listing(id: i64, team_id: i64, price: i64) -> TeamPlayer {
        TeamPlayer {
            id,
            team_id,
            player_id: id + 1000,
            in_transfer_market: true,
            asking_price: Some(Decimal::from(price)),
        }
    }

    fn conflict(result: Result<Settlement, ServiceError>) -> ConflictReason {
        match result {
            Err(ServiceError::Conflict(reason)) => reason,
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_fee_is_95_percent_rounded_to_cents() {
        assert_eq!(transfer_fee(Decimal::from(100_000)), Decimal::from(95_000));
        assert_eq!(transfer_fee(Decimal::new(10, 2)), Decimal::new(10, 2));
        assert_eq!(transfer_fee(Decimal::new(1, 2)), Decimal::new(1, 2));
        assert_eq!(transfer_fee(Decimal::new(33333, 2)), Decimal::new(31666, 2));
    }

    #[test]
    fn test_reference_purchase() {
        let buyer = team(1, 10, 5_000_000, 20);
        let seller = team(2, 20, 5_000_000, 20);
        let tp = listing(7, 2, 100_000);

        let settlement = settle(10, Some(&buyer), Some(&tp), Some(&seller)).unwrap();
        assert_eq!(
            settlement,
            Settlement {
                team_player_id: 7,
                buyer_team_id: 1,
                seller_team_id: 2,
                fee: Decimal::from(95_000),
            }
        );

        let buyer_after = buyer.budget - settlement.fee;
        let seller_after = seller.budget + settlement.fee;
        assert_eq!(buyer_after, Decimal::from(4_905_000));
        assert_eq!(seller_after, Decimal::from(5_095_000));
        assert_eq!(buyer_after + seller_after, buyer.budget + seller.budget);
    }

    #[test]
    fn test_roster_bounds() {
        let tp = listing(7, 2, 100_000);

        let full_buyer = team(1, 10, 5_000_000, MAX_ROSTER);
        let seller = team(2, 20, 5_000_000, 20);
        assert_eq!(
            conflict(settle(10, Some(&full_buyer), Some(&tp), Some(&seller))),
            ConflictReason::RosterFull { max: 25 }
        );

        let buyer = team(1, 10, 5_000_000, 20);
        let small_seller = team(2, 20, 5_000_000, MIN_ROSTER);
        assert_eq!(
            conflict(settle(10, Some(&buyer), Some(&tp), Some(&small_seller))),
            ConflictReason::SellerAtRosterFloor { min: 15 }
        );

        let seller_16 = team(2, 20, 5_000_000, 16);
        assert!(settle(10, Some(&buyer), Some(&tp), Some(&seller_16)).is_ok());
    }

    #[test]
    fn test_self_trade_is_rejected() {
        let own = team(1, 10, 5_000_000, 20);
        let tp = listing(7, 1, 100_000);
        assert_eq!(
            conflict(settle(10, Some(&own), Some(&tp), Some(&own))),
            ConflictReason::SelfTrade
        );
    }

    #[test]
    fn test_insufficient_budget() {
        let buyer = team(1, 10, 94_999, 20);
        let seller = team(2, 20, 0, 20);
        let tp = listing(7, 2, 100_000);
        assert_eq!(
            conflict(settle(10, Some(&buyer), Some(&tp), Some(&seller))),
            ConflictReason::InsufficientBudget {
                required: Decimal::from(95_000),
                available: Decimal::from(94_999),
            }
        );

        let exact = team(1, 10, 95_000, 20);
        assert!(settle(10, Some(&exact), Some(&tp), Some(&seller)).is_ok());
    }

    #[test]
    fn test_missing_rows_are_not_found() {
        let buyer = team(1, 10, 5_000_000, 20);
        let seller = team(2, 20, 5_000_000, 20);
        let mut unlisted = listing(7, 2, 100_000);
        unlisted.in_transfer_market = false;
        unlisted.asking_price = None;

        for result in [
            settle(10, None, Some(&listing(7, 2, 1)), Some(&seller)),
            settle(10, Some(&buyer), None, None),
            settle(10, Some(&buyer), Some(&unlisted), Some(&seller)),
            settle(10, Some(&buyer), Some(&listing(7, 2, 1)), None),
        ] {
            assert_eq!(result.unwrap_err().kind(), ErrorKind::NotFound);
        }
    }

    #[test]
    fn test_listing_update() {
        let listed = ListingUpdate::new(true, Some(Decimal::from(250_000))).unwrap();
        assert_eq!(listed.asking_price, Some(Decimal::from(250_000)));

        let unlisted = ListingUpdate::new(false, Some(Decimal::from(250_000))).unwrap();
        assert!(!unlisted.in_transfer_market);
        assert_eq!(unlisted.asking_price, None);

        let rounded = ListingUpdate::new(true, Some(Decimal::new(12_345, 3))).unwrap();
        assert_eq!(rounded.asking_price, Some(Decimal::new(1_235, 2)));

        let ceiling = ListingUpdate::new(true, Some(MAX_ASKING_PRICE)).unwrap();
        assert_eq!(ceiling.asking_price, Some(Decimal::new(999_999_999_999_999, 2)));

        for bad in [
            None,
            Some(Decimal::ZERO),
            Some(Decimal::from(-5)),
            // Rounds to 0.00.
            Some(Decimal::new(4, 3)),
            Some(Decimal::from(10_000_000_000_000_i64)),
            Some(Decimal::from(100_000_000_000_000_i64)),
        ] {
            assert_eq!(
                ListingUpdate::new(true, bad).unwrap_err().kind(),
                ErrorKind::Validation
            );
        }
    }

    #[test]
    fn test_substring_pattern_escapes_wildcards() {
        assert_eq!(substring_pattern(Some("mes")), Some("%mes%".to_owned()));
        assert_eq!(substring_pattern(Some("50%_off\\")), Some("%50\\%\\_off\\\\%".to_owned()));
        assert_eq!(substring_pattern(Some("   ")), None);
        assert_eq!(substring_pattern(None), None);
    }

    #[test]
    fn test_market_filter_bounds() {
        let query = MarketQuery {
            min: Some(Decimal::from(50_000)),
            max: Some(Decimal::from(200_000)),
            page: Some(2),
            ..Default::default()
        };
        let filter = MarketFilter::from_query(&query, 10).unwrap();
        assert_eq!((filter.page, filter.limit, filter.offset), (2, 10, 10));

        let search = filter.search_for(3);
        assert_eq!(search.user_id, 3);
        assert_eq!(search.min_seller_roster, 16);
        assert_eq!(search.min_price, Some(Decimal::from(50_000)));

        let inverted = MarketQuery {
            min: Some(Decimal::from(200_000)),
            max: Some(Decimal::from(50_000)),
            ..Default::default()
        };
        assert!(MarketFilter::from_query(&inverted, 10).is_err());

        let negative = MarketQuery {
            min: Some(Decimal::from(-1)),
            ..Default::default()
        };
        assert!(MarketFilter::from_query(&negative, 10).is_err());
    }
}
