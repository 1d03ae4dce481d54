//! Weighted-average holding arithmetic.
//!
//! Everything here is pure: a holding and a trade go in, a new holding comes
//! out. Storage and locking live in `trade_service` / `holding_service`.
//!
//! The rules, for a holding `(total_cost, shares, average_buy_price)`:
//!
//! - adding a BUY adds the lot at its own price and re-weights the average;
//! - adding a SELL removes the lot at the current average, which stays fixed;
//! - deleting a SELL puts the lot back at the current average;
//! - deleting a BUY takes the lot out at its own price and re-weights the
//!   average, so undoing a buy is not always the exact inverse of adding it.

use std::collections::HashMap;

use bigdecimal::{BigDecimal, Zero};
use thiserror::Error;

use crate::models::{Holding, Trade, TransactionType};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HoldingError {
    #[error("Invalid Transaction Causing Price Negative")]
    NegativeCost,

    #[error("Invalid Transaction Causing Shares Negative")]
    NegativeShares,

    #[error("Invalid Transaction Causing Shares Overflow")]
    ShareOverflow,
}

/// Applies a newly recorded trade to a holding.
pub fn add_trade_to_holding(holding: &Holding, trade: &Trade) -> Result<Holding, HoldingError> {
    match trade.transaction_type {
        TransactionType::Buy => {
            let shares = holding
                .shares
                .checked_add(trade.shares)
                .ok_or(HoldingError::ShareOverflow)?;
            let total_cost = &holding.total_cost + &trade.value();
            settle(&holding.ticker, total_cost, shares, None)
        }
        TransactionType::Sell => {
            let shares = holding
                .shares
                .checked_sub(trade.shares)
                .ok_or(HoldingError::ShareOverflow)?;
            let total_cost = &holding.average_buy_price * &BigDecimal::from(shares);
            settle(
                &holding.ticker,
                total_cost,
                shares,
                Some(holding.average_buy_price.clone()),
            )
        }
    }
}

/// Reverses a trade that was previously applied with [`add_trade_to_holding`].
pub fn delete_trade_from_holding(
    holding: &Holding,
    trade: &Trade,
) -> Result<Holding, HoldingError> {
    let (total_cost, shares) = match trade.transaction_type {
        TransactionType::Buy => (
            &holding.total_cost - &trade.value(),
            holding.shares.checked_sub(trade.shares),
        ),
        TransactionType::Sell => (
            &holding.total_cost + &(&holding.average_buy_price * &BigDecimal::from(trade.shares)),
            holding.shares.checked_add(trade.shares),
        ),
    };
    let shares = shares.ok_or(HoldingError::ShareOverflow)?;
    settle(&holding.ticker, total_cost, shares, None)
}

/// Replaces `old_trade` with `new_trade`.
///
/// When both holdings share a ticker the result is a single holding with the
/// delete applied before the add. Otherwise each holding is updated on its
/// own and the old ticker's holding comes first.
pub fn update_trade_in_holding(
    old_holding: &Holding,
    old_trade: &Trade,
    new_holding: &Holding,
    new_trade: &Trade,
) -> Result<Vec<Holding>, HoldingError> {
    if old_holding.ticker == new_holding.ticker {
        let reverted = delete_trade_from_holding(old_holding, old_trade)?;
        return Ok(vec![add_trade_to_holding(&reverted, new_trade)?]);
    }

    Ok(vec![
        delete_trade_from_holding(old_holding, old_trade)?,
        add_trade_to_holding(new_holding, new_trade)?,
    ])
}

/// Rebuilds holdings from scratch, one per ticker in order of first
/// appearance. Fully closed tickers are left out.
///
/// Each ticker's buys are applied before its sells, so the average is the
/// cost of everything bought divided by the shares bought.
pub fn holdings_from_trades(trades: &[Trade]) -> Result<Vec<Holding>, HoldingError> {
    let mut tickers: Vec<&str> = Vec::new();
    let mut grouped: HashMap<&str, Vec<&Trade>> = HashMap::new();

    for trade in trades {
        let ticker = trade.ticker.as_str();
        grouped
            .entry(ticker)
            .or_insert_with(|| {
                tickers.push(ticker);
                Vec::new()
            })
            .push(trade);
    }

    let mut holdings = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        let group = grouped.remove(ticker).unwrap_or_default();
        let (buys, sells): (Vec<&Trade>, Vec<&Trade>) =
            group.into_iter().partition(|trade| trade.is_buy());

        let mut holding = Holding::empty(ticker);
        for trade in buys.into_iter().chain(sells) {
            holding = add_trade_to_holding(&holding, trade)?;
        }

        if !holding.is_closed() {
            holdings.push(holding);
        }
    }

    Ok(holdings)
}

fn settle(
    ticker: &str,
    total_cost: BigDecimal,
    shares: i64,
    average_buy_price: Option<BigDecimal>,
) -> Result<Holding, HoldingError> {
    let zero = BigDecimal::zero();

    if total_cost < zero {
        return Err(HoldingError::NegativeCost);
    }
    if shares < 0 || (shares == 0 && total_cost > zero) {
        return Err(HoldingError::NegativeShares);
    }
    if shares == 0 {
        return Ok(Holding::empty(ticker));
    }

    let average_buy_price =
        average_buy_price.unwrap_or_else(|| &total_cost / &BigDecimal::from(shares));

    Ok(Holding::new(ticker, total_cost, shares, average_buy_price))
}
