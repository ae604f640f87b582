//! Supply snapshot models
//!
//! Raw per-ledger snapshots plus the reconciled output. Raw snapshots are
//! immutable for the lifetime of one reconciliation request; nothing here is
//! shared across requests.

use crate::models::{serde_units, AmountError, WeiAmount};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Layer-one supply facts, wei-scale integer strings as reported upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerOneSupply {
	pub total_supply: WeiAmount,
	pub locked_supply: WeiAmount,
	pub locked_supply_genesis: WeiAmount,
	pub liquid_supply: WeiAmount,
	pub circulating_supply: WeiAmount,
}

/// Layer-two supply facts plus the derived net-of-bridge-flow figure
///
/// Construct via [`LayerTwoSupply::from_raw`] so that `net_supply` is always
/// recomputed from the raw fields and the netting invariant
/// `net == total - (deposited - withdrawn)` holds by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerTwoSupply {
	pub total_supply: WeiAmount,
	pub total_deposited_confirmed: WeiAmount,
	pub total_withdrawn: WeiAmount,
	/// `total_supply - (total_deposited_confirmed - total_withdrawn)`, wei
	/// scale. May be negative when bridge flows are skewed.
	pub net_supply: WeiAmount,
}

impl LayerTwoSupply {
	/// Build a snapshot from raw upstream figures, deriving `net_supply`
	pub fn from_raw(
		total_supply: WeiAmount,
		total_deposited_confirmed: WeiAmount,
		total_withdrawn: WeiAmount,
	) -> Result<Self, AmountError> {
		let net = total_supply.to_decimal()?
			- (total_deposited_confirmed.to_decimal()? - total_withdrawn.to_decimal()?);

		Ok(Self {
			total_supply,
			total_deposited_confirmed,
			total_withdrawn,
			net_supply: WeiAmount::from_decimal(&net),
		})
	}
}

/// The reconciled supply view, in human units (wei divided by 10^18)
///
/// Carries verbatim copies of both raw snapshots for transparency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledSupply {
	#[serde(with = "serde_units")]
	pub total_supply: BigDecimal,
	#[serde(with = "serde_units")]
	pub locked_supply: BigDecimal,
	#[serde(with = "serde_units")]
	pub locked_supply_genesis: BigDecimal,
	#[serde(with = "serde_units")]
	pub liquid_supply: BigDecimal,
	#[serde(with = "serde_units")]
	pub circulating_supply: BigDecimal,
	pub layer_one: LayerOneSupply,
	pub layer_two: LayerTwoSupply,
	pub computed_at: DateTime<Utc>,
}

/// Per-source and overall durations for one reconciliation request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationTimings {
	/// 0 when the layer-one fetch never completed (circuit open)
	pub layer_one_ms: u64,
	/// 0 when the layer-two fetch never completed (circuit open)
	pub layer_two_ms: u64,
	pub total_ms: u64,
}

/// Outcome of one reconciliation request
///
/// All-or-nothing: `reconciled` is present exactly when `success` is true,
/// and every fatal condition encountered on either layer is collected into
/// `errors` rather than surfaced individually.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationResult {
	pub request_id: Uuid,
	pub success: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reconciled: Option<ReconciledSupply>,
	pub errors: Vec<String>,
	pub timings: ReconciliationTimings,
}

impl ReconciliationResult {
	/// Build a successful result
	pub fn succeeded(reconciled: ReconciledSupply, timings: ReconciliationTimings) -> Self {
		Self {
			request_id: Uuid::new_v4(),
			success: true,
			reconciled: Some(reconciled),
			errors: Vec::new(),
			timings,
		}
	}

	/// Build a failed result carrying every collected error
	pub fn failed(errors: Vec<String>, timings: ReconciliationTimings) -> Self {
		Self {
			request_id: Uuid::new_v4(),
			success: false,
			reconciled: None,
			errors,
			timings,
		}
	}
}
