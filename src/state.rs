use std::sync::Arc;
use sqlx::PgPool;
use crate::external::quote_provider::QuoteProvider;
use crate::services::ticker_locks::TickerLocks;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub quote_provider: Arc<dyn QuoteProvider>,
    pub ticker_locks: TickerLocks,
}
