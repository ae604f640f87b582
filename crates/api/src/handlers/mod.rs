//! HTTP request handlers

pub mod health;
pub mod supply;

pub use health::{health, ready, ReadinessResponse};
pub use supply::{get_historical_supply, get_supply};
