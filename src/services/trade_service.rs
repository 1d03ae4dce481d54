use bigdecimal::{BigDecimal, Zero};
use chrono::Utc;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tracing::{error, info, warn};

use crate::db::{holding_queries, trade_queries};
use crate::errors::AppError;
use crate::models::{Holding, Trade, TransactionType};
use crate::services::holding_calculator;
use crate::services::ticker_locks::{TickerGuard, TickerLocks};

/// Result of `POST /trades`, which either records a new trade or replaces an
/// existing one.
#[derive(Debug)]
pub enum UpsertOutcome {
    Created(Trade),
    Updated(Trade),
}

/// Checks that need nothing but the trade itself.
pub fn validate_fields(trade: &Trade) -> Result<(), AppError> {
    let zero = BigDecimal::zero();

    if trade.ticker.trim().is_empty() {
        return Err(AppError::InvalidTransaction("Ticker cannot be empty".into()));
    }
    if trade.shares == 0 {
        return Err(AppError::InvalidTransaction("Shares cannot be zero".into()));
    }
    if trade.shares < 0 {
        return Err(AppError::InvalidTransaction("Shares cannot be less than zero".into()));
    }
    if trade.price == zero {
        return Err(AppError::InvalidTransaction("Price cannot be zero".into()));
    }
    if trade.price < zero {
        return Err(AppError::InvalidTransaction("Price cannot be less than zero".into()));
    }
    Ok(())
}

/// Full validation: field checks first, then a SELL needs an existing holding.
pub async fn validate(pool: &PgPool, trade: &Trade) -> Result<(), AppError> {
    validate_fields(trade)?;

    if trade.transaction_type == TransactionType::Sell {
        let holding = holding_queries::fetch_one(pool, &trade.ticker).await?;
        check_sell(trade, holding.as_ref())?;
    }
    Ok(())
}

/// A SELL needs a stored holding for its ticker. BUYs always pass.
pub fn check_sell(trade: &Trade, holding: Option<&Holding>) -> Result<(), AppError> {
    if trade.transaction_type == TransactionType::Sell && holding.is_none() {
        return Err(AppError::InvalidTransaction("No shares available to sell".into()));
    }
    Ok(())
}

pub async fn upsert(pool: &PgPool, locks: &TickerLocks, trade: Trade) -> Result<UpsertOutcome, AppError> {
    validate(pool, &trade).await?;

    if let Some(id) = trade.id {
        if trade_queries::fetch_one(pool, id).await?.is_some() {
            return Ok(UpsertOutcome::Updated(update(pool, locks, id, trade).await?));
        }
    }
    Ok(UpsertOutcome::Created(add(pool, locks, trade).await?))
}

/// Records a new trade and folds it into its ticker's holding.
pub async fn add(pool: &PgPool, locks: &TickerLocks, mut trade: Trade) -> Result<Trade, AppError> {
    trade.id = None;
    trade.executed_at = Utc::now();

    let _guard = locks.lock(&trade.ticker).await;
    let mut tx = pool.begin().await?;

    let holding = locked_holding(&mut tx, &trade.ticker).await?;
    let updated = holding_calculator::add_trade_to_holding(&holding, &trade).map_err(|e| {
        error!("Rejected {} of {} {}: {}", trade.transaction_type, trade.shares, trade.ticker, e);
        e
    })?;
    save_holding(&mut tx, &updated).await?;
    let stored = trade_queries::insert(&mut *tx, &trade).await?;

    tx.commit().await?;
    info!("Recorded trade {:?} for {}", stored.id, stored.ticker);
    Ok(stored)
}

/// Replaces trade `id` with `new_trade`, moving it between holdings when the
/// ticker changes.
pub async fn update(
    pool: &PgPool,
    locks: &TickerLocks,
    id: i64,
    mut new_trade: Trade,
) -> Result<Trade, AppError> {
    new_trade.id = Some(id);
    new_trade.executed_at = Utc::now();

    let (_guard, mut tx, existing) = lock_trade(pool, locks, id, Some(&new_trade.ticker))
        .await?
        .ok_or_else(|| trade_not_found(id))?;

    let old_holding = match holding_queries::fetch_for_update(&mut *tx, &existing.ticker).await? {
        Some(holding) => holding,
        None => {
            error!("No Holding found with ticker : {}", existing.ticker);
            Holding::empty(&existing.ticker)
        }
    };
    let new_holding = if new_trade.ticker == existing.ticker {
        old_holding.clone()
    } else {
        locked_holding(&mut tx, &new_trade.ticker).await?
    };

    let holdings =
        holding_calculator::update_trade_in_holding(&old_holding, &existing, &new_holding, &new_trade)
            .map_err(|e| {
                error!("Rejected update of trade {}: {}", id, e);
                e
            })?;
    for holding in &holdings {
        save_holding(&mut tx, holding).await?;
    }

    let stored = trade_queries::update(&mut *tx, id, &new_trade)
        .await?
        .ok_or_else(|| trade_not_found(id))?;

    tx.commit().await?;
    info!("Updated trade {} ({} holdings touched)", id, holdings.len());
    Ok(stored)
}

/// Removes a trade and reverses its effect on the holding. `None` when there
/// is no such trade.
pub async fn delete(pool: &PgPool, locks: &TickerLocks, id: i64) -> Result<Option<Trade>, AppError> {
    let Some((_guard, mut tx, trade)) = lock_trade(pool, locks, id, None).await? else {
        return Ok(None);
    };

    let holding = match holding_queries::fetch_for_update(&mut *tx, &trade.ticker).await? {
        Some(holding) => holding,
        None => {
            error!("No Holding found with ticker : {}", trade.ticker);
            Holding::empty(&trade.ticker)
        }
    };
    let updated = holding_calculator::delete_trade_from_holding(&holding, &trade).map_err(|e| {
        error!("Rejected delete of trade {}: {}", id, e);
        e
    })?;
    save_holding(&mut tx, &updated).await?;
    trade_queries::delete(&mut *tx, id).await?;

    tx.commit().await?;
    info!("Deleted trade {} for {}", id, trade.ticker);
    Ok(Some(trade))
}

pub async fn fetch_one(pool: &PgPool, id: i64) -> Result<Option<Trade>, AppError> {
    Ok(trade_queries::fetch_one(pool, id).await?)
}

pub async fn fetch_all(pool: &PgPool) -> Result<Vec<Trade>, AppError> {
    Ok(trade_queries::fetch_all(pool).await?)
}

/// Locks the ticker(s) an existing trade touches and opens a transaction in
/// which the trade has been re-read.
///
/// The ticker is only known after reading the trade, and another request may
/// move the trade to a different ticker before the lock is granted. In that
/// case the read is retried with the new ticker.
async fn lock_trade(
    pool: &PgPool,
    locks: &TickerLocks,
    id: i64,
    also_lock: Option<&str>,
) -> Result<Option<(TickerGuard, Transaction<'static, Postgres>, Trade)>, AppError> {
    loop {
        let Some(seen) = trade_queries::fetch_one(pool, id).await? else {
            return Ok(None);
        };

        let mut tickers = vec![seen.ticker.as_str()];
        tickers.extend(also_lock);
        let guard = locks.lock_all(&tickers).await;

        let mut tx = pool.begin().await?;
        let Some(current) = trade_queries::fetch_one(&mut *tx, id).await? else {
            return Ok(None);
        };
        if current.ticker == seen.ticker {
            return Ok(Some((guard, tx, current)));
        }
        warn!("Trade {} moved from {} to {} while waiting for lock", id, seen.ticker, current.ticker);
    }
}

async fn locked_holding(conn: &mut PgConnection, ticker: &str) -> Result<Holding, sqlx::Error> {
    Ok(holding_queries::fetch_for_update(conn, ticker)
        .await?
        .unwrap_or_else(|| Holding::empty(ticker)))
}

#[derive(Debug, PartialEq)]
enum HoldingWrite<'a> {
    Upsert(&'a Holding),
    Delete(&'a str),
}

/// Closed holdings are removed rather than stored with zero shares.
fn holding_write(holding: &Holding) -> HoldingWrite<'_> {
    if holding.is_closed() {
        HoldingWrite::Delete(&holding.ticker)
    } else {
        HoldingWrite::Upsert(holding)
    }
}

async fn save_holding(conn: &mut PgConnection, holding: &Holding) -> Result<(), sqlx::Error> {
    match holding_write(holding) {
        HoldingWrite::Delete(ticker) => {
            holding_queries::delete(conn, ticker).await?;
        }
        HoldingWrite::Upsert(holding) => {
            holding_queries::upsert(conn, holding).await?;
        }
    }
    Ok(())
}

fn trade_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("No Trade found for id : {}", id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: Result<(), AppError>) -> String {
        match result {
            Err(AppError::InvalidTransaction(msg)) => msg,
            other => panic!("expected invalid transaction, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_trade_passes() {
        assert!(validate_fields(&Trade::buy("WIPRO", 10, BigDecimal::from(100))).is_ok());
        assert!(validate_fields(&Trade::sell("WIPRO", 1, BigDecimal::from(1))).is_ok());
    }

    #[test]
    fn test_share_count_must_be_positive() {
        let zero = Trade::buy("WIPRO", 0, BigDecimal::from(100));
        assert_eq!(message(validate_fields(&zero)), "Shares cannot be zero");

        let negative = Trade::buy("WIPRO", -5, BigDecimal::from(100));
        assert_eq!(message(validate_fields(&negative)), "Shares cannot be less than zero");
    }

    #[test]
    fn test_price_must_be_positive() {
        let zero = Trade::buy("WIPRO", 10, BigDecimal::zero());
        assert_eq!(message(validate_fields(&zero)), "Price cannot be zero");

        let negative = Trade::sell("WIPRO", 10, BigDecimal::from(-3));
        assert_eq!(message(validate_fields(&negative)), "Price cannot be less than zero");
    }

    #[test]
    fn test_ticker_must_be_present() {
        let blank = Trade::buy("  ", 10, BigDecimal::from(100));
        assert_eq!(message(validate_fields(&blank)), "Ticker cannot be empty");
    }

    #[test]
    fn test_sell_needs_existing_holding() {
        let sell = Trade::sell("TCS", 5, BigDecimal::from(10));
        assert_eq!(message(check_sell(&sell, None)), "No shares available to sell");

        let held = Holding::new("TCS", BigDecimal::from(50), 5, BigDecimal::from(10));
        assert!(check_sell(&sell, Some(&held)).is_ok());
    }

    #[test]
    fn test_buy_needs_no_holding() {
        assert!(check_sell(&Trade::buy("TCS", 5, BigDecimal::from(10)), None).is_ok());
    }

    #[test]
    fn test_closed_holding_is_deleted_not_stored() {
        let closed = Holding::empty("WIPRO");
        assert_eq!(holding_write(&closed), HoldingWrite::Delete("WIPRO"));

        let open = Holding::new("WIPRO", BigDecimal::from(1000), 10, BigDecimal::from(100));
        assert_eq!(holding_write(&open), HoldingWrite::Upsert(&open));
    }

    #[test]
    fn test_selling_everything_produces_a_delete() {
        let held = Holding::new("WIPRO", BigDecimal::from(1000), 10, BigDecimal::from(100));
        let sold_out =
            holding_calculator::add_trade_to_holding(&held, &Trade::sell("WIPRO", 10, BigDecimal::from(150)))
                .unwrap();
        assert_eq!(holding_write(&sold_out), HoldingWrite::Delete("WIPRO"));
    }

    #[test]
    fn test_not_found_message_names_trade() {
        assert!(matches!(
            trade_not_found(7),
            AppError::NotFound(ref msg) if msg == "No Trade found for id : 7"
        ));
    }
}
