use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
pub enum TransactionType {
    Buy,
    Sell,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Buy => write!(f, "BUY"),
            TransactionType::Sell => write!(f, "SELL"),
        }
    }
}

// A single buy or sell recorded against a ticker. `id` stays empty until the
// trade has been stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Trade {
    #[serde(default)]
    pub id: Option<i64>,
    pub ticker: String,
    pub transaction_type: TransactionType,
    pub shares: i64,
    pub price: BigDecimal,
    #[serde(default = "Utc::now")]
    pub executed_at: DateTime<Utc>,
}

impl Trade {
    pub fn new(
        ticker: impl Into<String>,
        transaction_type: TransactionType,
        shares: i64,
        price: BigDecimal,
    ) -> Self {
        Self {
            id: None,
            ticker: ticker.into(),
            transaction_type,
            shares,
            price,
            executed_at: Utc::now(),
        }
    }

    pub fn buy(ticker: impl Into<String>, shares: i64, price: BigDecimal) -> Self {
        Self::new(ticker, TransactionType::Buy, shares, price)
    }

    pub fn sell(ticker: impl Into<String>, shares: i64, price: BigDecimal) -> Self {
        Self::new(ticker, TransactionType::Sell, shares, price)
    }

    pub fn is_buy(&self) -> bool {
        self.transaction_type == TransactionType::Buy
    }

    /// Cash value of the trade at its own price.
    pub fn value(&self) -> BigDecimal {
        BigDecimal::from(self.shares) * &self.price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_deserializes_without_id() {
        let trade: Trade = serde_json::from_str(
            r#"{"ticker":"TCS","transaction_type":"SELL","shares":5,"price":"12.5"}"#,
        )
        .unwrap();

        assert_eq!(trade.id, None);
        assert_eq!(trade.transaction_type, TransactionType::Sell);
        assert_eq!(trade.value(), BigDecimal::from(125) / BigDecimal::from(2));
    }

    #[test]
    fn test_transaction_type_uses_uppercase_names() {
        assert_eq!(serde_json::to_string(&TransactionType::Buy).unwrap(), "\"BUY\"");
        assert_eq!(TransactionType::Sell.to_string(), "SELL");
    }
}
