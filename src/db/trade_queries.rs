use sqlx::PgExecutor;
use crate::models::Trade;

pub async fn insert<'e, E>(executor: E, trade: &Trade) -> Result<Trade, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Trade>(
        "INSERT INTO trades (ticker, transaction_type, shares, price, executed_at)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, ticker, transaction_type, shares, price, executed_at",
    )
    .bind(&trade.ticker)
    .bind(trade.transaction_type)
    .bind(trade.shares)
    .bind(&trade.price)
    .bind(trade.executed_at)
    .fetch_one(executor)
    .await
}

pub async fn update<'e, E>(executor: E, id: i64, trade: &Trade) -> Result<Option<Trade>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Trade>(
        "UPDATE trades
         SET ticker = $2, transaction_type = $3, shares = $4, price = $5, executed_at = $6
         WHERE id = $1
         RETURNING id, ticker, transaction_type, shares, price, executed_at",
    )
    .bind(id)
    .bind(&trade.ticker)
    .bind(trade.transaction_type)
    .bind(trade.shares)
    .bind(&trade.price)
    .bind(trade.executed_at)
    .fetch_optional(executor)
    .await
}

pub async fn fetch_one<'e, E>(executor: E, id: i64) -> Result<Option<Trade>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Trade>(
        "SELECT id, ticker, transaction_type, shares, price, executed_at
         FROM trades
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn fetch_all<'e, E>(executor: E) -> Result<Vec<Trade>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Trade>(
        "SELECT id, ticker, transaction_type, shares, price, executed_at
         FROM trades
         ORDER BY id ASC",
    )
    .fetch_all(executor)
    .await
}

pub async fn fetch_by_ticker<'e, E>(executor: E, ticker: &str) -> Result<Vec<Trade>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Trade>(
        "SELECT id, ticker, transaction_type, shares, price, executed_at
         FROM trades
         WHERE ticker = $1
         ORDER BY id ASC",
    )
    .bind(ticker)
    .fetch_all(executor)
    .await
}

pub async fn delete<'e, E>(executor: E, id: i64) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM trades WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
