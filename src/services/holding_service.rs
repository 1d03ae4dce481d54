use sqlx::PgPool;
use tracing::{error, info};

use crate::db::{holding_queries, trade_queries};
use crate::errors::AppError;
use crate::models::{Holding, Portfolio};
use crate::services::holding_calculator;
use crate::services::ticker_locks::TickerLocks;

pub async fn fetch_one(pool: &PgPool, ticker: &str) -> Result<Option<Holding>, AppError> {
    Ok(holding_queries::fetch_one(pool, ticker).await?)
}

pub async fn fetch_all(pool: &PgPool) -> Result<Vec<Holding>, AppError> {
    Ok(holding_queries::fetch_all(pool).await?)
}

/// Recomputes every holding from the full trade history and replaces the
/// stored holdings with the result.
pub async fn refresh(pool: &PgPool, locks: &TickerLocks) -> Result<Vec<Holding>, AppError> {
    let mut tx = pool.begin().await?;

    // Waits for in-flight trade writes and keeps new ones out until commit
    sqlx::query("LOCK TABLE holdings IN EXCLUSIVE MODE")
        .execute(&mut *tx)
        .await?;

    let trades = trade_queries::fetch_all(&mut *tx).await?;
    let holdings = holding_calculator::holdings_from_trades(&trades).map_err(|e| {
        error!("Trade history does not add up: {}", e);
        e
    })?;

    let previous = holding_queries::fetch_all(&mut *tx).await?;
    let closed = closed_tickers(&previous, &holdings);
    if !closed.is_empty() {
        info!("Dropping holdings with no remaining shares: {:?}", closed);
    }

    let removed = holding_queries::delete_all(&mut *tx).await?;
    let mut stored = Vec::with_capacity(holdings.len());
    for holding in &holdings {
        stored.push(holding_queries::upsert(&mut *tx, holding).await?);
    }

    tx.commit().await?;
    locks.prune();

    info!(
        "Rebuilt {} holdings from {} trades (replaced {})",
        stored.len(),
        trades.len(),
        removed
    );
    Ok(stored)
}

/// Tickers stored before a rebuild that the rebuilt set no longer has.
fn closed_tickers<'a>(previous: &'a [Holding], rebuilt: &[Holding]) -> Vec<&'a str> {
    previous
        .iter()
        .map(|holding| holding.ticker.as_str())
        .filter(|ticker| !rebuilt.iter().any(|holding| holding.ticker == *ticker))
        .collect()
}

/// Every current holding's ticker with its trades.
pub async fn portfolio(pool: &PgPool) -> Result<Vec<Portfolio>, AppError> {
    let holdings = holding_queries::fetch_all(pool).await?;

    let mut portfolio = Vec::with_capacity(holdings.len());
    for holding in holdings {
        let trades = trade_queries::fetch_by_ticker(pool, &holding.ticker).await?;
        portfolio.push(Portfolio {
            ticker: holding.ticker,
            trades,
        });
    }
    Ok(portfolio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use crate::models::Trade;

    fn stored(ticker: &str, shares: i64) -> Holding {
        Holding::new(ticker, BigDecimal::from(shares * 10), shares, BigDecimal::from(10))
    }

    #[test]
    fn test_rebuild_drops_tickers_that_closed() {
        let previous = vec![stored("TCS", 5), stored("WIPRO", 10)];
        let trades = vec![
            Trade::buy("TCS", 5, BigDecimal::from(10)),
            Trade::sell("TCS", 5, BigDecimal::from(12)),
            Trade::buy("WIPRO", 10, BigDecimal::from(10)),
        ];

        let rebuilt = holding_calculator::holdings_from_trades(&trades).unwrap();

        assert_eq!(rebuilt.len(), 1);
        assert_eq!(rebuilt[0].ticker, "WIPRO");
        assert_eq!(closed_tickers(&previous, &rebuilt), vec!["TCS"]);
    }

    #[test]
    fn test_nothing_closed_when_all_tickers_survive() {
        let previous = vec![stored("WIPRO", 10)];
        let rebuilt = vec![stored("WIPRO", 12), stored("TCS", 1)];
        assert!(closed_tickers(&previous, &rebuilt).is_empty());
    }
}
