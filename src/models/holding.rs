use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// Aggregate cost basis of one ticker, derived from its trades.
// Invariant: average_buy_price * shares == total_cost (within rounding).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Holding {
    pub ticker: String,
    pub total_cost: BigDecimal,
    pub shares: i64,
    pub average_buy_price: BigDecimal,
    pub last_updated: DateTime<Utc>,
}

impl Holding {
    pub fn new(
        ticker: impl Into<String>,
        total_cost: BigDecimal,
        shares: i64,
        average_buy_price: BigDecimal,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            total_cost,
            shares,
            average_buy_price,
            last_updated: Utc::now(),
        }
    }

    /// Zero-valued holding used for a ticker that has nothing stored yet.
    pub fn empty(ticker: impl Into<String>) -> Self {
        Self::new(ticker, BigDecimal::zero(), 0, BigDecimal::zero())
    }

    /// A holding with no shares is not kept in the store.
    pub fn is_closed(&self) -> bool {
        self.shares == 0
    }
}
