mod holding;
mod portfolio;
mod trade;

pub use holding::Holding;
pub use portfolio::Portfolio;
pub use trade::{Trade, TransactionType};
