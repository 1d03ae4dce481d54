use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::Portfolio;
use crate::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_portfolio))
}

pub async fn get_portfolio(State(state): State<AppState>) -> Result<Json<Vec<Portfolio>>, AppError> {
    info!("GET /portfolio - Grouping trades by holding");
    let portfolio = services::holding_service::portfolio(&state.pool).await.map_err(|e| {
        error!("Failed to build portfolio: {}", e);
        e
    })?;
    if portfolio.is_empty() {
        return Err(AppError::NotFound("User has no securities".into()));
    }
    Ok(Json(portfolio))
}
