use serde::{Deserialize, Serialize};

use super::Trade;

// Read-side grouping of a ticker with its trades; never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub ticker: String,
    pub trades: Vec<Trade>,
}
