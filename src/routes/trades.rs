use axum::extract::{Path, State};
use http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::Trade;
use crate::services;
use crate::services::trade_service::UpsertOutcome;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(fetch_trades).post(upsert_trade))
        .route("/:id", get(get_trade).delete(delete_trade))
}

pub async fn upsert_trade(
    State(state): State<AppState>,
    Json(trade): Json<Trade>,
) -> Result<(StatusCode, Json<Trade>), AppError> {
    info!("POST /trades - Add or update trade {:?}", trade.id);
    let outcome = services::trade_service::upsert(&state.pool, &state.ticker_locks, trade)
        .await
        .map_err(|e| {
            error!("Failed to save trade: {}", e);
            e
        })?;

    Ok(match outcome {
        UpsertOutcome::Created(trade) => (StatusCode::CREATED, Json(trade)),
        UpsertOutcome::Updated(trade) => (StatusCode::OK, Json(trade)),
    })
}

pub async fn delete_trade(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Trade>, AppError> {
    info!("DELETE /trades/{} - Deleting trade", id);
    let trade_id = parse_trade_id(&id)?;
    let trade = services::trade_service::delete(&state.pool, &state.ticker_locks, trade_id)
        .await
        .map_err(|e| {
            error!("Failed to delete trade {}: {}", id, e);
            e
        })?
        .ok_or_else(|| AppError::NotFound(format!("No Trade found for id : {}", id)))?;
    Ok(Json(trade))
}

pub async fn get_trade(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Trade>, AppError> {
    info!("GET /trades/{} - Fetching trade", id);
    let trade_id = parse_trade_id(&id)?;
    let trade = services::trade_service::fetch_one(&state.pool, trade_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No Trade found for id : {}", id)))?;
    Ok(Json(trade))
}

pub async fn fetch_trades(State(state): State<AppState>) -> Result<Json<Vec<Trade>>, AppError> {
    info!("GET /trades - Fetching all trades");
    let trades = services::trade_service::fetch_all(&state.pool).await.map_err(|e| {
        error!("Failed to fetch trades: {}", e);
        e
    })?;
    if trades.is_empty() {
        return Err(AppError::NotFound("No Trade found for user".into()));
    }
    Ok(Json(trades))
}

fn parse_trade_id(id: &str) -> Result<i64, AppError> {
    id.parse()
        .map_err(|_| AppError::BadRequest("Trade id should be a number".into()))
}
