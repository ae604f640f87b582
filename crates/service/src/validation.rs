//! Validation engine for raw and reconciled supply data
//!
//! Three independent checks, each producing fatal errors and non-fatal
//! warnings. Errors abort the reconciliation (bad upstream data is never
//! retried); warnings are logged by the orchestrator and surface nothing to
//! the caller.

use bigdecimal::num_bigint::BigInt;
use bigdecimal::{BigDecimal, Zero};
use recon_types::{LayerOneSupply, LayerTwoSupply, ReconciledSupply, WeiAmount};

/// Relative tolerance for supply-composition checks (0.1%)
fn relative_tolerance() -> BigDecimal {
	BigDecimal::new(BigInt::from(1), 3)
}

/// A reconciled total below this fraction of the layer-one total alone
/// signals a likely netting mistake (99%)
fn layer_one_floor_ratio() -> BigDecimal {
	BigDecimal::new(BigInt::from(99), 2)
}

/// Outcome of one validation check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
	pub errors: Vec<String>,
	pub warnings: Vec<String>,
}

impl ValidationReport {
	pub fn new() -> Self {
		Self::default()
	}

	/// True when no fatal finding was recorded
	pub fn is_valid(&self) -> bool {
		self.errors.is_empty()
	}

	pub fn merge(&mut self, other: ValidationReport) {
		self.errors.extend(other.errors);
		self.warnings.extend(other.warnings);
	}

	fn error(&mut self, message: impl Into<String>) {
		self.errors.push(message.into());
	}

	fn warning(&mut self, message: impl Into<String>) {
		self.warnings.push(message.into());
	}
}

/// Domain-invariant checks over supply snapshots and reconciled results
#[derive(Debug, Clone, Default)]
pub struct ValidationEngine;

impl ValidationEngine {
	pub fn new() -> Self {
		Self
	}

	/// Check a raw layer-one snapshot
	pub fn check_layer_one(&self, supply: &LayerOneSupply) -> ValidationReport {
		let mut report = ValidationReport::new();

		let total = require_non_negative(&mut report, "layer one", "totalSupply", &supply.total_supply);
		let locked =
			require_non_negative(&mut report, "layer one", "lockedSupply", &supply.locked_supply);
		require_non_negative(
			&mut report,
			"layer one",
			"lockedSupplyGenesis",
			&supply.locked_supply_genesis,
		);
		let liquid =
			require_non_negative(&mut report, "layer one", "liquidSupply", &supply.liquid_supply);
		let circulating = require_non_negative(
			&mut report,
			"layer one",
			"circulatingSupply",
			&supply.circulating_supply,
		);

		if let (Some(total), Some(locked), Some(liquid)) = (&total, &locked, &liquid) {
			let composed = locked + liquid;
			if !within_relative_tolerance(total, &composed) {
				report.warning(format!(
					"layer one totalSupply {} deviates more than 0.1% from lockedSupply + liquidSupply {}",
					total, composed
				));
			}
		}

		if let (Some(total), Some(circulating)) = (&total, &circulating) {
			if circulating > total {
				report.error(format!(
					"layer one circulatingSupply {} exceeds totalSupply {}",
					circulating, total
				));
			}
		}

		report
	}

	/// Check a raw layer-two snapshot
	pub fn check_layer_two(&self, supply: &LayerTwoSupply) -> ValidationReport {
		let mut report = ValidationReport::new();

		let total = require_non_negative(&mut report, "layer two", "totalSupply", &supply.total_supply);
		let deposited = require_non_negative(
			&mut report,
			"layer two",
			"totalDepositedConfirmed",
			&supply.total_deposited_confirmed,
		);
		let withdrawn = require_non_negative(
			&mut report,
			"layer two",
			"totalWithdrawn",
			&supply.total_withdrawn,
		);

		// net_supply is allowed to be negative, but must still parse
		let stored_net = match supply.net_supply.to_decimal() {
			Ok(value) => Some(value),
			Err(err) => {
				report.error(format!("layer two netSupply: {err}"));
				None
			},
		};

		if let (Some(total), Some(deposited)) = (&total, &deposited) {
			if deposited > total {
				report.error(format!(
					"layer two totalDepositedConfirmed {} exceeds totalSupply {}",
					deposited, total
				));
			}
		}

		if let (Some(total), Some(deposited), Some(withdrawn)) = (&total, &deposited, &withdrawn) {
			let expected_net = total - (deposited - withdrawn);

			// Should never differ when the snapshot was built through
			// from_raw; catches stale or hand-assembled snapshots
			if let Some(stored) = &stored_net {
				if stored != &expected_net {
					report.warning(format!(
						"layer two netSupply {} does not match recomputed value {}",
						stored, expected_net
					));
				}
			}

			// Deposits exceeding the visible total is an unusual but not
			// impossible bridge state
			if expected_net < BigDecimal::zero() {
				report.warning(format!(
					"layer two net supply is negative: {}",
					expected_net
				));
			}
		}

		report
	}

	/// Check a reconciled result against the raw snapshots it embeds
	pub fn check_reconciled(&self, reconciled: &ReconciledSupply) -> ValidationReport {
		let mut report = ValidationReport::new();

		if reconciled.total_supply <= BigDecimal::zero() {
			report.error(format!(
				"reconciled totalSupply must be positive, got {}",
				reconciled.total_supply
			));
		}
		if reconciled.circulating_supply < BigDecimal::zero() {
			report.error(format!(
				"reconciled circulatingSupply is negative: {}",
				reconciled.circulating_supply
			));
		}
		if reconciled.circulating_supply > reconciled.total_supply {
			report.error(format!(
				"reconciled circulatingSupply {} exceeds totalSupply {}",
				reconciled.circulating_supply, reconciled.total_supply
			));
		}

		// A combined total below the layer-one total alone means the
		// netting subtracted value it should not have
		if let Ok(layer_one_total) = reconciled.layer_one.total_supply.to_units() {
			let floor = layer_one_total * layer_one_floor_ratio();
			if reconciled.total_supply < floor {
				report.warning(format!(
					"reconciled totalSupply {} fell below 99% of the layer-one total alone",
					reconciled.total_supply
				));
			}
		}

		let composed = &reconciled.liquid_supply + &reconciled.locked_supply;
		if !within_relative_tolerance(&reconciled.total_supply, &composed) {
			report.warning(format!(
				"reconciled totalSupply {} deviates more than 0.1% from liquidSupply + lockedSupply {}",
				reconciled.total_supply, composed
			));
		}

		report
	}
}

/// Parse a wei field, recording an error (and returning `None`) when the
/// field is malformed or negative
fn require_non_negative(
	report: &mut ValidationReport,
	layer: &str,
	field: &str,
	amount: &WeiAmount,
) -> Option<BigDecimal> {
	match amount.to_decimal() {
		Ok(value) => {
			if value < BigDecimal::zero() {
				report.error(format!("{layer} {field} is negative: {value}"));
				None
			} else {
				Some(value)
			}
		},
		Err(err) => {
			report.error(format!("{layer} {field}: {err}"));
			None
		},
	}
}

/// Whether `actual` is within the relative tolerance of `expected`
fn within_relative_tolerance(actual: &BigDecimal, expected: &BigDecimal) -> bool {
	let diff = (actual - expected).abs();
	let allowed = expected.abs() * relative_tolerance();
	diff <= allowed
}
