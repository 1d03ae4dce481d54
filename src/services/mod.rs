pub mod holding_calculator;
pub mod holding_service;
pub mod returns_service;
pub mod ticker_locks;
pub mod trade_service;
