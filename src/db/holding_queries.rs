use sqlx::PgExecutor;
use crate::models::Holding;

pub async fn fetch_one<'e, E>(executor: E, ticker: &str) -> Result<Option<Holding>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Holding>(
        "SELECT ticker, total_cost, shares, average_buy_price, last_updated
         FROM holdings
         WHERE ticker = $1",
    )
    .bind(ticker)
    .fetch_optional(executor)
    .await
}

/// Same as [`fetch_one`] but row-locks the holding until the surrounding
/// transaction ends.
pub async fn fetch_for_update<'e, E>(executor: E, ticker: &str) -> Result<Option<Holding>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Holding>(
        "SELECT ticker, total_cost, shares, average_buy_price, last_updated
         FROM holdings
         WHERE ticker = $1
         FOR UPDATE",
    )
    .bind(ticker)
    .fetch_optional(executor)
    .await
}

pub async fn fetch_all<'e, E>(executor: E) -> Result<Vec<Holding>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Holding>(
        "SELECT ticker, total_cost, shares, average_buy_price, last_updated
         FROM holdings
         ORDER BY ticker ASC",
    )
    .fetch_all(executor)
    .await
}

pub async fn upsert<'e, E>(executor: E, holding: &Holding) -> Result<Holding, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Holding>(
        r#"
        INSERT INTO holdings (ticker, total_cost, shares, average_buy_price, last_updated)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (ticker)
        DO UPDATE SET
            total_cost = EXCLUDED.total_cost,
            shares = EXCLUDED.shares,
            average_buy_price = EXCLUDED.average_buy_price,
            last_updated = EXCLUDED.last_updated
        RETURNING ticker, total_cost, shares, average_buy_price, last_updated
        "#,
    )
    .bind(&holding.ticker)
    .bind(&holding.total_cost)
    .bind(holding.shares)
    .bind(&holding.average_buy_price)
    .bind(holding.last_updated)
    .fetch_one(executor)
    .await
}

pub async fn delete<'e, E>(executor: E, ticker: &str) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM holdings WHERE ticker = $1")
        .bind(ticker)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_all<'e, E>(executor: E) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM holdings")
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
