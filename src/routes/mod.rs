pub(crate) mod health;
pub(crate) mod holdings;
pub(crate) mod portfolio;
pub(crate) mod returns;
pub(crate) mod trades;
