use bigdecimal::BigDecimal;
use sqlx::PgPool;

use crate::db::holding_queries;
use crate::errors::AppError;
use crate::external::quote_provider::{QuoteProvider, QuoteProviderError};
use crate::models::Holding;

/// Unrealised gain of one holding at `current_price`.
pub fn holding_return(holding: &Holding, current_price: &BigDecimal) -> BigDecimal {
    (current_price - &holding.average_buy_price) * BigDecimal::from(holding.shares)
}

/// Sum of per-holding returns, `None` when there are no holdings.
pub async fn net_return(
    holdings: &[Holding],
    quotes: &dyn QuoteProvider,
) -> Result<Option<BigDecimal>, QuoteProviderError> {
    let mut total: Option<BigDecimal> = None;
    for holding in holdings {
        let price = quotes.current_price(&holding.ticker).await?;
        let gain = holding_return(holding, &price);
        total = Some(match total {
            Some(sum) => sum + gain,
            None => gain,
        });
    }
    Ok(total)
}

pub async fn fetch_net_return(
    pool: &PgPool,
    quotes: &dyn QuoteProvider,
) -> Result<Option<BigDecimal>, AppError> {
    let holdings = holding_queries::fetch_all(pool).await?;
    Ok(net_return(&holdings, quotes).await?)
}
