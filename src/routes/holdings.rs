use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::Holding;
use crate::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(fetch_holdings))
        .route("/refresh", get(refresh_holdings))
        .route("/:ticker", get(get_holding))
}

pub async fn get_holding(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<Holding>, AppError> {
    info!("GET /holdings/{} - Fetching holding", ticker);
    let holding = services::holding_service::fetch_one(&state.pool, &ticker)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No Holding found for ticker : {}", ticker)))?;
    Ok(Json(holding))
}

pub async fn fetch_holdings(State(state): State<AppState>) -> Result<Json<Vec<Holding>>, AppError> {
    info!("GET /holdings - Fetching all holdings");
    let holdings = services::holding_service::fetch_all(&state.pool).await.map_err(|e| {
        error!("Failed to fetch holdings: {}", e);
        e
    })?;
    non_empty(holdings)
}

pub async fn refresh_holdings(State(state): State<AppState>) -> Result<Json<Vec<Holding>>, AppError> {
    info!("GET /holdings/refresh - Rebuilding holdings from trades");
    let holdings = services::holding_service::refresh(&state.pool, &state.ticker_locks)
        .await
        .map_err(|e| {
            error!("Failed to refresh holdings: {}", e);
            e
        })?;
    non_empty(holdings)
}

fn non_empty(holdings: Vec<Holding>) -> Result<Json<Vec<Holding>>, AppError> {
    if holdings.is_empty() {
        return Err(AppError::NotFound("User has no securities".into()));
    }
    Ok(Json(holdings))
}
