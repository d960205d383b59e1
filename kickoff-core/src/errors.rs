//! Error taxonomy shared by every request-driven operation.
//!
//! The request layer matches on [`ServiceError::kind`] to pick a response;
//! the distinction between kinds must never be collapsed.

use rust_decimal::Decimal;
use thiserror::Error;

/// Coarse classification of a [`ServiceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing input; the caller can fix the request.
    Validation,
    /// The referenced entity does not exist or is not owned by the caller.
    NotFound,
    /// Well-formed request that violates a business rule right now.
    Conflict,
    /// Missing or wrong credentials.
    Unauthorized,
    /// Anything unexpected. Details are logged, never returned.
    Internal,
}

/// Business rules a request can run into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictReason {
    /// The buyer already holds the maximum number of players.
    RosterFull { max: i64 },
    /// The seller would drop below the minimum squad size.
    SellerAtRosterFloor { min: i64 },
    /// The listing belongs to the buyer's own team.
    SelfTrade,
    /// The buyer cannot afford the transfer fee.
    InsufficientBudget { required: Decimal, available: Decimal },
}

impl ConflictReason {
    pub fn message(&self) -> &'static str {
        match self {
            ConflictReason::RosterFull { .. } => "Cannot exceed 25 players",
            ConflictReason::SellerAtRosterFloor { .. } => {
                "Seller's team must have at least 15 players"
            }
            ConflictReason::SelfTrade => "You can't buy your own player",
            ConflictReason::InsufficientBudget { .. } => "Not enough budget",
        }
    }
}

impl std::fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Errors returned by account, team and transfer-market operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(ConflictReason),

    #[error("invalid credentials")]
    Unauthorized,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Validation(_) => ErrorKind::Validation,
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::Conflict(_) => ErrorKind::Conflict,
            ServiceError::Unauthorized => ErrorKind::Unauthorized,
            ServiceError::Database(_) | ServiceError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Message safe to show to the caller.
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => "An unexpected error occurred".to_owned(),
            _ => self.to_string(),
        }
    }

    /// Structured details for conflicts that carry numbers.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            ServiceError::Conflict(ConflictReason::RosterFull { max }) => {
                Some(serde_json::json!({ "max_players": max }))
            }
            ServiceError::Conflict(ConflictReason::SellerAtRosterFloor { min }) => {
                Some(serde_json::json!({ "min_players": min }))
            }
            ServiceError::Conflict(ConflictReason::InsufficientBudget {
                required,
                available,
            }) => Some(serde_json::json!({
                "required": required.to_string(),
                "available": available.to_string(),
            })),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_stay_distinct() {
        assert_eq!(
            ServiceError::Validation("Invalid asking price").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            ServiceError::NotFound("Team not found").kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            ServiceError::Conflict(ConflictReason::SelfTrade).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            ServiceError::Database(sqlx::Error::RowNotFound).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_internal_errors_are_not_leaked() {
        let err = ServiceError::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(err.public_message(), "An unexpected error occurred");

        let err = ServiceError::Conflict(ConflictReason::SelfTrade);
        assert_eq!(err.public_message(), "You can't buy your own player");
    }

    #[test]
    fn test_budget_conflict_details() {
        let err = ServiceError::Conflict(ConflictReason::InsufficientBudget {
            required: Decimal::new(9_500_000, 2),
            available: Decimal::new(1_000_000, 2),
        });
        let details = err.details().unwrap();
        assert_eq!(details["required"], "95000.00");
        assert_eq!(details["available"], "10000.00");
    }
}
