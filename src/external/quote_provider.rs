use async_trait::async_trait;
use bigdecimal::BigDecimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuoteProviderError {
    #[allow(dead_code)]
    #[error("no quote for ticker {0}")]
    Unavailable(String),
}

/// Source of current market prices used to value holdings.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn current_price(&self, ticker: &str) -> Result<BigDecimal, QuoteProviderError>;
}

/// Quotes every ticker at one configured price.
///
/// Stands in for a market-data feed, which this service does not integrate.
pub struct FixedQuoteProvider {
    price: BigDecimal,
}

impl FixedQuoteProvider {
    pub fn new(price: BigDecimal) -> Self {
        Self { price }
    }
}

#[async_trait]
impl QuoteProvider for FixedQuoteProvider {
    async fn current_price(&self, _ticker: &str) -> Result<BigDecimal, QuoteProviderError> {
        Ok(self.price.clone())
    }
}
