use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use bigdecimal::BigDecimal;
use tracing::{error, info};

use crate::errors::AppError;
use crate::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_returns))
}

/// Net unrealised return across all holdings. The body is a JSON string such
/// as `"120.5"`, since BigDecimal serializes as a string to keep precision.
pub async fn get_returns(State(state): State<AppState>) -> Result<Json<BigDecimal>, AppError> {
    info!("GET /returns - Calculating net return");
    let net = services::returns_service::fetch_net_return(&state.pool, state.quote_provider.as_ref())
        .await
        .map_err(|e| {
            error!("Failed to calculate returns: {}", e);
            e
        })?
        .ok_or_else(|| AppError::NotFound("User has no securities".into()))?;
    Ok(Json(net))
}
