use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::routes::{health, holdings, portfolio, returns, trades};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/trades", trades::router())
        .nest("/holdings", holdings::router())
        .nest("/portfolio", portfolio::router())
        .nest("/returns", returns::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use http::{Request, StatusCode};
    use bigdecimal::BigDecimal;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::external::quote_provider::FixedQuoteProvider;
    use crate::services::ticker_locks::TickerLocks;

    // Nothing listens on port 1, so any request that reaches the database fails fast
    fn test_app() -> Router {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy("postgres://postgres@127.0.0.1:1/portfolio")
            .unwrap();

        create_app(AppState {
            pool,
            quote_provider: Arc::new(FixedQuoteProvider::new(BigDecimal::from(100))),
            ticker_locks: TickerLocks::new(),
        })
    }

    async fn send(request: Request<Body>) -> (StatusCode, String) {
        let response = test_app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn post_trade(json: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/trades")
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_non_numeric_trade_id_is_bad_request() {
        let (status, body) = send(get("/trades/abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Trade id should be a number");

        let delete = Request::builder()
            .method("DELETE")
            .uri("/trades/1.5")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(delete).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_trade_is_unprocessable() {
        let (status, body) = send(post_trade(
            r#"{"ticker":"WIPRO","transaction_type":"BUY","shares":0,"price":"100"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body, "Shares cannot be zero");

        let (status, body) = send(post_trade(
            r#"{"ticker":"WIPRO","transaction_type":"SELL","shares":5,"price":"-1"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body, "Price cannot be less than zero");
    }

    #[tokio::test]
    async fn test_unknown_transaction_type_is_rejected() {
        let (status, _) = send(post_trade(
            r#"{"ticker":"WIPRO","transaction_type":"HOLD","shares":5,"price":"10"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_database_failure_is_hidden() {
        let (status, body) = send(get("/trades")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Internal server error");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, _) = send(get("/positions")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
