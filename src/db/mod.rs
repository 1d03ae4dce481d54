pub mod holding_queries;
pub mod trade_queries;
