use http::StatusCode;
use axum::response::IntoResponse;
use thiserror::Error;

use crate::external::quote_provider::QuoteProviderError;
use crate::services::holding_calculator::HoldingError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidTransaction(String),
    #[error("Quote error: {0}")]
    Quote(#[from] QuoteProviderError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            AppError::InvalidTransaction(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg).into_response(),
            AppError::Quote(e) => (StatusCode::BAD_GATEWAY, e.to_string()).into_response(),
            AppError::Db(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response(),
        }
    }
}

impl From<HoldingError> for AppError {
    fn from(value: HoldingError) -> Self {
        AppError::InvalidTransaction(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::BadRequest("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("missing".into()), StatusCode::NOT_FOUND),
            (AppError::InvalidTransaction("nope".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::Db(sqlx::Error::RowNotFound), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_holding_error_becomes_invalid_transaction() {
        let error = AppError::from(HoldingError::NegativeCost);
        assert!(matches!(
            error,
            AppError::InvalidTransaction(ref msg) if msg == "Invalid Transaction Causing Price Negative"
        ));
    }
}
