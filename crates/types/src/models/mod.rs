//! Shared primitive models

pub mod wei;

pub use wei::{serde_units, AmountError, WeiAmount, WEI_DECIMALS};
