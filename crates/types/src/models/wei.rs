//! Wei-scale amount model for handling smallest-unit token values as strings
//!
//! Upstream ledgers report supply figures as base-10^18 fixed-point integer
//! strings. Keeping them as strings end to end preserves precision; all
//! arithmetic goes through `BigDecimal` so no monetary value ever touches a
//! float.

use bigdecimal::BigDecimal;
use serde;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of decimal places in a wei-scale value
pub const WEI_DECIMALS: u32 = 18;

/// Errors raised when a wei string cannot be interpreted
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
	#[error("amount string is empty")]
	Empty,

	#[error("amount '{value}' is not a base-10 integer")]
	NotInteger { value: String },
}

/// Smallest-unit token amount represented as a base-10 integer string
///
/// A leading `-` sign is accepted so that derived figures (net bridge flow)
/// can go negative; whether a negative value is acceptable is decided by the
/// validation engine, not by this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeiAmount(String);

impl WeiAmount {
	/// Create a new amount from a raw string, without validating it
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Get the raw string value
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Parse the wei string into an exact decimal value
	pub fn to_decimal(&self) -> Result<BigDecimal, AmountError> {
		if self.0.is_empty() {
			return Err(AmountError::Empty);
		}

		let digits = self.0.strip_prefix('-').unwrap_or(&self.0);
		if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
			return Err(AmountError::NotInteger {
				value: self.0.clone(),
			});
		}

		BigDecimal::from_str(&self.0).map_err(|_| AmountError::NotInteger {
			value: self.0.clone(),
		})
	}

	/// Parse the wei string and scale it to human units (divide by 10^18)
	pub fn to_units(&self) -> Result<BigDecimal, AmountError> {
		Ok(self.to_decimal()? / wei_factor())
	}

	/// Build an amount from an integer-valued decimal (used for derived fields)
	pub fn from_decimal(value: &BigDecimal) -> Self {
		Self(value.with_scale(0).to_string())
	}
}

/// The 10^18 scaling factor between wei values and human units
pub fn wei_factor() -> BigDecimal {
	BigDecimal::from(10_u64.pow(WEI_DECIMALS))
}

impl fmt::Display for WeiAmount {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<String> for WeiAmount {
	fn from(value: String) -> Self {
		Self(value)
	}
}

impl From<&str> for WeiAmount {
	fn from(value: &str) -> Self {
		Self(value.to_string())
	}
}

impl From<u128> for WeiAmount {
	fn from(value: u128) -> Self {
		Self(value.to_string())
	}
}

// Custom Serde implementation to serialize/deserialize as string
impl serde::Serialize for WeiAmount {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_str(&self.0)
	}
}

impl<'de> serde::Deserialize<'de> for WeiAmount {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let value = String::deserialize(deserializer)?;
		Ok(Self(value))
	}
}

/// Serde helpers for human-scale `BigDecimal` fields, serialized as strings
/// so JSON consumers never see a lossy float.
pub mod serde_units {
	use bigdecimal::BigDecimal;
	use serde::{Deserialize, Deserializer, Serializer};
	use std::str::FromStr;

	pub fn serialize<S>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&value.to_string())
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;
		BigDecimal::from_str(&raw).map_err(serde::de::Error::custom)
	}
}
