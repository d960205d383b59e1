//! Transfer market configuration.

use kickoff_sdk::objects::market::DEFAULT_PAGE_SIZE;

/// Transfer market configuration.
#[derive(Debug, Clone, Copy)]
pub struct MarketConfig {
    /// Listings per page when the request does not ask for a size.
    pub page_size: i64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}
