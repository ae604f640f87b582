//! Bridge-flow netting
//!
//! The core arithmetic is pure: two raw snapshots in, one reconciled view
//! out. The layer-two ledger only ever holds tokens that crossed the bridge,
//! so its contribution to the combined picture is its net-of-bridge-flow
//! supply, not its gross total. Adding the gross total would double-count
//! every bridged token, once in the layer-one locked bridge balance and once
//! on layer two.

use chrono::Utc;
use recon_types::{AmountError, LayerOneSupply, LayerTwoSupply, ReconciledSupply};

/// Combine two raw snapshots into the reconciled supply view
///
/// All outputs are in human units. Fails only when a snapshot carries a
/// malformed amount string; range and consistency findings are the
/// validation engine's business.
pub fn reconcile(
	layer_one: &LayerOneSupply,
	layer_two: &LayerTwoSupply,
) -> Result<ReconciledSupply, AmountError> {
	let l1_total = layer_one.total_supply.to_units()?;
	let l1_locked = layer_one.locked_supply.to_units()?;
	let l1_genesis = layer_one.locked_supply_genesis.to_units()?;
	let l1_circulating = layer_one.circulating_supply.to_units()?;
	let l2_net = layer_two.net_supply.to_units()?;

	let total_supply = &l1_total + &l2_net;
	let circulating_supply = l1_circulating + &l2_net;
	// Locked positions exist only on layer one; layer-two tokens are liquid
	// by definition
	let liquid_supply = &total_supply - &l1_locked;

	Ok(ReconciledSupply {
		total_supply,
		locked_supply: l1_locked,
		locked_supply_genesis: l1_genesis,
		liquid_supply,
		circulating_supply,
		layer_one: layer_one.clone(),
		layer_two: layer_two.clone(),
		computed_at: Utc::now(),
	})
}
