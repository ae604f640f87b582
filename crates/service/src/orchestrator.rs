//! Reconciliation orchestrator
//!
//! Drives one reconciliation request end to end: fetch both snapshots in
//! parallel under independent retry policies, validate, net, validate again.
//! All-or-nothing: a single hard failure on either side fails the whole
//! request, and every collected error is returned together with layer-one
//! errors listed first.

use crate::reconcile::reconcile;
use crate::retry::{Attempted, RetryError, RetryExecutor};
use crate::validation::{ValidationEngine, ValidationReport};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use recon_types::{
	BlockResolver, BreakerStatus, LayerOneSource, LayerTwoSource, ReconciliationResult,
	ReconciliationTimings,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Breaker name for layer-one supply fetches
pub const LAYER_ONE_OP: &str = "layer_one_supply";
/// Breaker name for layer-two supply fetches
pub const LAYER_TWO_OP: &str = "layer_two_supply";

/// Reconciliation entry points exposed to the API layer
#[async_trait]
pub trait ReconcilerTrait: Send + Sync {
	/// Reconcile against the current head of both ledgers
	async fn reconcile_latest(&self) -> ReconciliationResult;

	/// Reconcile against the ledger state at (or closest before) a timestamp
	async fn reconcile_at_timestamp(&self, timestamp: DateTime<Utc>) -> ReconciliationResult;

	/// Snapshot of every tracked circuit breaker
	fn circuit_breaker_status(&self) -> Vec<BreakerStatus>;
}

/// Production reconciler wiring sources, retry policy and validation together
pub struct ReconciliationService {
	layer_one: Arc<dyn LayerOneSource>,
	layer_two: Arc<dyn LayerTwoSource>,
	blocks: Arc<dyn BlockResolver>,
	retry: Arc<RetryExecutor>,
	validator: ValidationEngine,
	validation_enabled: bool,
}

impl ReconciliationService {
	pub fn new(
		layer_one: Arc<dyn LayerOneSource>,
		layer_two: Arc<dyn LayerTwoSource>,
		blocks: Arc<dyn BlockResolver>,
		retry: Arc<RetryExecutor>,
		validation_enabled: bool,
	) -> Self {
		Self {
			layer_one,
			layer_two,
			blocks,
			retry,
			validator: ValidationEngine::new(),
			validation_enabled,
		}
	}

	/// Run one reconciliation, optionally pinned to a block
	///
	/// A pinned block that the upstream cannot serve degrades to that side's
	/// latest snapshot rather than failing the request.
	async fn run(&self, block: Option<u64>) -> ReconciliationResult {
		let started = Instant::now();

		let layer_one = Arc::clone(&self.layer_one);
		let layer_two = Arc::clone(&self.layer_two);

		let fetch_one = self.retry.execute(LAYER_ONE_OP, move || {
			let source = Arc::clone(&layer_one);
			async move {
				if let Some(block) = block {
					match source.fetch_at_block(block).await? {
						Some(snapshot) => return Ok(snapshot),
						None => {
							warn!(
								"layer one has no snapshot at block {}, falling back to latest",
								block
							);
						},
					}
				}
				source.fetch_latest().await
			}
		});
		let fetch_two = self.retry.execute(LAYER_TWO_OP, move || {
			let source = Arc::clone(&layer_two);
			async move {
				if let Some(block) = block {
					match source.fetch_at_block(block).await? {
						Some(snapshot) => return Ok(snapshot),
						None => {
							warn!(
								"layer two has no snapshot at block {}, falling back to latest",
								block
							);
						},
					}
				}
				source.fetch_latest().await
			}
		});

		let (one, two) = tokio::join!(fetch_one, fetch_two);

		fn side_elapsed<T>(outcome: &Result<Attempted<T>, RetryError>) -> u64 {
			match outcome {
				Ok(attempted) => attempted.elapsed_ms,
				Err(err) => err.elapsed_ms(),
			}
		}
		let layer_one_ms = side_elapsed(&one);
		let layer_two_ms = side_elapsed(&two);
		let make_timings = || ReconciliationTimings {
			layer_one_ms,
			layer_two_ms,
			total_ms: started.elapsed().as_millis() as u64,
		};

		// Layer-one errors first, always
		let mut errors = Vec::new();
		if let Err(err) = &one {
			errors.push(format!("layer one supply fetch failed: {err}"));
		}
		if let Err(err) = &two {
			errors.push(format!("layer two supply fetch failed: {err}"));
		}
		let (Ok(one), Ok(two)) = (one, two) else {
			warn!("reconciliation aborted: {}", errors.join("; "));
			return ReconciliationResult::failed(errors, make_timings());
		};

		debug!(
			"snapshots fetched in {}ms / {}ms ({} / {} attempts)",
			layer_one_ms, layer_two_ms, one.attempts, two.attempts
		);

		if self.validation_enabled {
			let mut report = self.validator.check_layer_one(&one.value);
			report.merge(self.validator.check_layer_two(&two.value));
			if let Some(result) = self.reject_invalid("snapshot", report, &make_timings) {
				return result;
			}
		}

		let reconciled = match reconcile(&one.value, &two.value) {
			Ok(reconciled) => reconciled,
			Err(err) => {
				return ReconciliationResult::failed(
					vec![format!("reconciliation failed: {err}")],
					make_timings(),
				);
			},
		};

		if self.validation_enabled {
			let report = self.validator.check_reconciled(&reconciled);
			if let Some(result) = self.reject_invalid("reconciled result", report, &make_timings) {
				return result;
			}
		}

		info!(
			"reconciled supply: total {} circulating {} in {}ms",
			reconciled.total_supply,
			reconciled.circulating_supply,
			started.elapsed().as_millis()
		);
		ReconciliationResult::succeeded(reconciled, make_timings())
	}

	/// Log a report's warnings; turn its errors into a failed result
	fn reject_invalid(
		&self,
		stage: &str,
		report: ValidationReport,
		make_timings: &dyn Fn() -> ReconciliationTimings,
	) -> Option<ReconciliationResult> {
		for warning in &report.warnings {
			warn!("{} validation: {}", stage, warning);
		}
		if report.is_valid() {
			return None;
		}
		warn!(
			"{} validation failed with {} error(s)",
			stage,
			report.errors.len()
		);
		Some(ReconciliationResult::failed(report.errors, make_timings()))
	}

	/// Resolve a timestamp to a block, degrading to latest on any miss
	async fn resolve_block(&self, timestamp: DateTime<Utc>) -> Option<u64> {
		let block = match self.blocks.block_for_timestamp(timestamp).await {
			Ok(Some(block)) => {
				debug!("resolved timestamp {} to block {}", timestamp, block);
				block
			},
			Ok(None) => {
				warn!(
					"no block found at or before {}, reconciling against latest",
					timestamp
				);
				return None;
			},
			Err(err) => {
				warn!(
					"block resolution for {} failed ({}), reconciling against latest",
					timestamp, err
				);
				return None;
			},
		};

		// An explorer running ahead of the sources would pin both fetches
		// to a block neither can serve; cap at the reported chain head
		match self.blocks.latest_block().await {
			Ok(head) if block > head => {
				warn!(
					"resolved block {} is beyond the chain head {}, using the head",
					block, head
				);
				Some(head)
			},
			Ok(_) => Some(block),
			Err(err) => {
				debug!("chain head lookup failed ({}), using block {} unchecked", err, block);
				Some(block)
			},
		}
	}
}

#[async_trait]
impl ReconcilerTrait for ReconciliationService {
	async fn reconcile_latest(&self) -> ReconciliationResult {
		self.run(None).await
	}

	async fn reconcile_at_timestamp(&self, timestamp: DateTime<Utc>) -> ReconciliationResult {
		let block = self.resolve_block(timestamp).await;
		self.run(block).await
	}

	fn circuit_breaker_status(&self) -> Vec<BreakerStatus> {
		self.retry.status()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use recon_config::{CircuitBreakerSettings, RetrySettings};
	use recon_types::{LayerOneSupply, LayerTwoSupply, SourceError, SourceResult, WeiAmount};
	use std::collections::HashMap;
	use std::str::FromStr;
	use std::sync::atomic::{AtomicU32, Ordering};

	fn layer_one_fixture() -> LayerOneSupply {
		LayerOneSupply {
			total_supply: WeiAmount::from("10000000000000000000000000000"),
			locked_supply: WeiAmount::from("2000000000000000000000000000"),
			locked_supply_genesis: WeiAmount::from("1900000000000000000000000000"),
			liquid_supply: WeiAmount::from("8000000000000000000000000000"),
			circulating_supply: WeiAmount::from("8100000000000000000000000000"),
		}
	}

	fn layer_two_fixture() -> LayerTwoSupply {
		LayerTwoSupply::from_raw(
			WeiAmount::from("3344392801700000000000000000"),
			WeiAmount::from("3230297690900000000000000000"),
			WeiAmount::from("0"),
		)
		.unwrap()
	}

	struct ScriptedLayerOne {
		latest: SourceResult<LayerOneSupply>,
		at_block: HashMap<u64, LayerOneSupply>,
		latest_calls: Arc<AtomicU32>,
	}

	impl ScriptedLayerOne {
		fn healthy() -> Self {
			Self {
				latest: Ok(layer_one_fixture()),
				at_block: HashMap::new(),
				latest_calls: Arc::new(AtomicU32::new(0)),
			}
		}

		fn failing(message: &str) -> Self {
			Self {
				latest: Err(SourceError::Transport(message.to_string())),
				at_block: HashMap::new(),
				latest_calls: Arc::new(AtomicU32::new(0)),
			}
		}
	}

	#[async_trait]
	impl LayerOneSource for ScriptedLayerOne {
		async fn fetch_latest(&self) -> SourceResult<LayerOneSupply> {
			self.latest_calls.fetch_add(1, Ordering::SeqCst);
			self.latest.clone()
		}

		async fn fetch_at_block(&self, block: u64) -> SourceResult<Option<LayerOneSupply>> {
			Ok(self.at_block.get(&block).cloned())
		}
	}

	struct ScriptedLayerTwo {
		latest: SourceResult<LayerTwoSupply>,
		at_block: HashMap<u64, LayerTwoSupply>,
	}

	impl ScriptedLayerTwo {
		fn healthy() -> Self {
			Self {
				latest: Ok(layer_two_fixture()),
				at_block: HashMap::new(),
			}
		}

		fn failing(message: &str) -> Self {
			Self {
				latest: Err(SourceError::Transport(message.to_string())),
				at_block: HashMap::new(),
			}
		}
	}

	#[async_trait]
	impl LayerTwoSource for ScriptedLayerTwo {
		async fn fetch_latest(&self) -> SourceResult<LayerTwoSupply> {
			self.latest.clone()
		}

		async fn fetch_at_block(&self, block: u64) -> SourceResult<Option<LayerTwoSupply>> {
			Ok(self.at_block.get(&block).cloned())
		}
	}

	struct ScriptedResolver {
		block: SourceResult<Option<u64>>,
		head: u64,
	}

	impl ScriptedResolver {
		fn unresolving() -> Self {
			Self {
				block: Ok(None),
				head: 0,
			}
		}

		fn resolving_to(block: u64) -> Self {
			Self {
				block: Ok(Some(block)),
				head: block,
			}
		}
	}

	#[async_trait]
	impl BlockResolver for ScriptedResolver {
		async fn block_for_timestamp(&self, _timestamp: DateTime<Utc>) -> SourceResult<Option<u64>> {
			self.block.clone()
		}

		async fn latest_block(&self) -> SourceResult<u64> {
			Ok(self.head)
		}
	}

	fn service(
		layer_one: ScriptedLayerOne,
		layer_two: ScriptedLayerTwo,
		resolver: ScriptedResolver,
	) -> ReconciliationService {
		let retry = RetrySettings {
			max_attempts: 2,
			base_delay_ms: 1,
			max_delay_ms: 2,
			backoff_multiplier: 2.0,
		};
		ReconciliationService::new(
			Arc::new(layer_one),
			Arc::new(layer_two),
			Arc::new(resolver),
			Arc::new(RetryExecutor::new(
				&retry,
				&CircuitBreakerSettings::default(),
			)),
			true,
		)
	}

	#[tokio::test]
	async fn reconciles_healthy_sources() {
		let svc = service(
			ScriptedLayerOne::healthy(),
			ScriptedLayerTwo::healthy(),
			ScriptedResolver::unresolving(),
		);

		let result = svc.reconcile_latest().await;
		assert!(result.success, "errors: {:?}", result.errors);
		let reconciled = result.reconciled.unwrap();
		assert_eq!(
			reconciled.total_supply,
			bigdecimal::BigDecimal::from_str("10114095110.8").unwrap()
		);
		assert!(result.errors.is_empty());
	}

	#[tokio::test]
	async fn one_failing_side_fails_the_whole_request() {
		let svc = service(
			ScriptedLayerOne::healthy(),
			ScriptedLayerTwo::failing("bridge subgraph down"),
			ScriptedResolver::unresolving(),
		);

		let result = svc.reconcile_latest().await;
		assert!(!result.success);
		assert!(result.reconciled.is_none());
		assert_eq!(result.errors.len(), 1);
		assert!(result.errors[0].starts_with("layer two supply fetch failed"));
		assert!(result.errors[0].contains("bridge subgraph down"));
	}

	#[tokio::test]
	async fn both_failing_sides_report_layer_one_first() {
		let svc = service(
			ScriptedLayerOne::failing("indexer down"),
			ScriptedLayerTwo::failing("subgraph down"),
			ScriptedResolver::unresolving(),
		);

		let result = svc.reconcile_latest().await;
		assert!(!result.success);
		assert_eq!(result.errors.len(), 2);
		assert!(result.errors[0].starts_with("layer one supply fetch failed"));
		assert!(result.errors[1].starts_with("layer two supply fetch failed"));
	}

	#[tokio::test]
	async fn timestamp_request_uses_the_resolved_block() {
		let mut layer_one = ScriptedLayerOne::healthy();
		let mut historical = layer_one_fixture();
		historical.circulating_supply = WeiAmount::from("7000000000000000000000000000");
		layer_one.at_block.insert(123, historical);

		let mut layer_two = ScriptedLayerTwo::healthy();
		layer_two.at_block.insert(123, layer_two_fixture());

		let svc = service(
			layer_one,
			layer_two,
			ScriptedResolver::resolving_to(123),
		);

		let result = svc.reconcile_at_timestamp(Utc::now()).await;
		assert!(result.success, "errors: {:?}", result.errors);
		assert_eq!(
			result
				.reconciled
				.unwrap()
				.layer_one
				.circulating_supply
				.as_str(),
			"7000000000000000000000000000"
		);
	}

	#[tokio::test]
	async fn resolved_block_beyond_the_head_is_capped() {
		let mut layer_one = ScriptedLayerOne::healthy();
		let mut at_head = layer_one_fixture();
		at_head.circulating_supply = WeiAmount::from("6500000000000000000000000000");
		layer_one.at_block.insert(100, at_head);

		let mut layer_two = ScriptedLayerTwo::healthy();
		layer_two.at_block.insert(100, layer_two_fixture());

		let svc = service(
			layer_one,
			layer_two,
			ScriptedResolver {
				block: Ok(Some(500)),
				head: 100,
			},
		);

		let result = svc.reconcile_at_timestamp(Utc::now()).await;
		assert!(result.success, "errors: {:?}", result.errors);
		assert_eq!(
			result
				.reconciled
				.unwrap()
				.layer_one
				.circulating_supply
				.as_str(),
			"6500000000000000000000000000"
		);
	}

	#[tokio::test]
	async fn missing_block_data_falls_back_to_latest() {
		// Resolver finds block 999 but neither source has a snapshot there
		let svc = service(
			ScriptedLayerOne::healthy(),
			ScriptedLayerTwo::healthy(),
			ScriptedResolver::resolving_to(999),
		);

		let result = svc.reconcile_at_timestamp(Utc::now()).await;
		assert!(result.success, "errors: {:?}", result.errors);
	}

	#[tokio::test]
	async fn resolver_failure_degrades_to_latest() {
		let layer_one = ScriptedLayerOne::healthy();
		let latest_calls = Arc::clone(&layer_one.latest_calls);
		let svc = service(
			layer_one,
			ScriptedLayerTwo::healthy(),
			ScriptedResolver {
				block: Err(SourceError::Transport("explorer down".to_string())),
				head: 0,
			},
		);

		let result = svc.reconcile_at_timestamp(Utc::now()).await;
		assert!(result.success, "errors: {:?}", result.errors);
		// The latest path was taken, not the at-block path
		assert_eq!(latest_calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn invalid_snapshot_aborts_without_reconciling() {
		let mut layer_one = ScriptedLayerOne::healthy();
		let mut bad = layer_one_fixture();
		// circulating above total is a fatal validation error
		bad.circulating_supply = WeiAmount::from("99999000000000000000000000000");
		layer_one.latest = Ok(bad);

		let svc = service(
			layer_one,
			ScriptedLayerTwo::healthy(),
			ScriptedResolver::unresolving(),
		);

		let result = svc.reconcile_latest().await;
		assert!(!result.success);
		assert!(result.reconciled.is_none());
		assert!(result.errors[0].contains("circulatingSupply"));
	}

	#[tokio::test]
	async fn validation_can_be_disabled() {
		let mut layer_one = ScriptedLayerOne::healthy();
		let mut bad = layer_one_fixture();
		bad.circulating_supply = WeiAmount::from("99999000000000000000000000000");
		layer_one.latest = Ok(bad);

		let mut svc = service(
			layer_one,
			ScriptedLayerTwo::healthy(),
			ScriptedResolver::unresolving(),
		);
		svc.validation_enabled = false;

		let result = svc.reconcile_latest().await;
		assert!(result.success);
	}

	#[tokio::test]
	async fn breaker_status_covers_both_operations_after_failures() {
		let svc = service(
			ScriptedLayerOne::failing("down"),
			ScriptedLayerTwo::failing("down"),
			ScriptedResolver::unresolving(),
		);

		let _ = svc.reconcile_latest().await;
		let status = svc.circuit_breaker_status();
		assert_eq!(status.len(), 2);
		assert_eq!(status[0].operation, LAYER_ONE_OP);
		assert_eq!(status[1].operation, LAYER_TWO_OP);
		assert_eq!(status[0].count, 1);
		assert!(!status[0].is_open);
	}
}
