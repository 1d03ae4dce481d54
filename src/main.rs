mod app;
mod config;
mod db;
mod errors;
mod external;
mod logging;
mod models;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::external::quote_provider::FixedQuoteProvider;
use crate::logging::{init_logging, LoggingConfig};
use crate::services::ticker_locks::TickerLocks;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env())?;

    let config = AppConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    tracing::info!("Using fixed quote price {}", config.quote_price);
    let state = AppState {
        pool,
        quote_provider: Arc::new(FixedQuoteProvider::new(config.quote_price.clone())),
        ticker_locks: TickerLocks::new(),
    };
    let app = app::create_app(state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Portfolio tracker running at http://{}/", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
