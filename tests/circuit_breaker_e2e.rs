//! End-to-end circuit breaker tests
//!
//! Drives real reconciliation requests through the builder and asserts that
//! repeated source failures trip the breaker, that a tripped breaker stops
//! invoking the source, and that cooldown expiry lets requests through again.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use supply_reconciler::mocks::{MockBlockResolver, MockLayerOneSource, MockLayerTwoSource};
use supply_reconciler::{ReconcilerBuilder, Settings, LAYER_ONE_OP, LAYER_TWO_OP};
use tokio::time::sleep;

fn breaker_settings(failure_threshold: u32, cooldown_ms: u64) -> Settings {
	let mut settings = Settings::default();
	settings.retry.max_attempts = 1;
	settings.retry.base_delay_ms = 1;
	settings.retry.max_delay_ms = 2;
	settings.circuit_breaker.failure_threshold = failure_threshold;
	settings.circuit_breaker.cooldown_ms = cooldown_ms;
	settings
}

async fn build_reconciler(
	settings: Settings,
	layer_one: Arc<MockLayerOneSource>,
	layer_two: Arc<MockLayerTwoSource>,
) -> Arc<dyn supply_reconciler::ReconcilerTrait> {
	let (_router, state) = ReconcilerBuilder::new()
		.with_settings(settings)
		.with_layer_one_source(layer_one)
		.with_layer_two_source(layer_two)
		.with_block_resolver(Arc::new(MockBlockResolver::unresolving()))
		.start()
		.await
		.expect("builder should start with injected sources");
	state.reconciler
}

#[tokio::test]
async fn breaker_opens_after_threshold_and_stops_invoking_the_source() {
	let layer_one = Arc::new(MockLayerOneSource::failing("indexer down"));
	let reconciler = build_reconciler(
		breaker_settings(2, 300_000),
		Arc::clone(&layer_one),
		Arc::new(MockLayerTwoSource::healthy()),
	)
	.await;

	// Two failed requests exhaust the threshold
	for _ in 0..2 {
		let result = reconciler.reconcile_latest().await;
		assert!(!result.success);
		assert!(result.errors[0].contains("failed after 1 attempts"));
	}
	assert_eq!(layer_one.latest_calls.load(Ordering::SeqCst), 2);

	// Third request fast-fails without touching the source
	let result = reconciler.reconcile_latest().await;
	assert!(!result.success);
	assert!(result.errors[0].contains("circuit open"));
	assert_eq!(layer_one.latest_calls.load(Ordering::SeqCst), 2);
	assert_eq!(result.timings.layer_one_ms, 0);
}

#[tokio::test]
async fn breaker_status_reflects_the_open_operation() {
	let reconciler = build_reconciler(
		breaker_settings(1, 300_000),
		Arc::new(MockLayerOneSource::failing("indexer down")),
		Arc::new(MockLayerTwoSource::healthy()),
	)
	.await;

	let _ = reconciler.reconcile_latest().await;

	let status = reconciler.circuit_breaker_status();
	assert_eq!(status.len(), 1);
	assert_eq!(status[0].operation, LAYER_ONE_OP);
	assert_eq!(status[0].count, 1);
	assert!(status[0].is_open);
	assert!(status[0].last_failure.is_some());
}

#[tokio::test]
async fn tripped_layer_one_breaker_does_not_block_layer_two() {
	let layer_two = Arc::new(MockLayerTwoSource::healthy());
	let reconciler = build_reconciler(
		breaker_settings(1, 300_000),
		Arc::new(MockLayerOneSource::failing("indexer down")),
		Arc::clone(&layer_two),
	)
	.await;

	// Trips layer one; layer two keeps being fetched on every request
	let _ = reconciler.reconcile_latest().await;
	let _ = reconciler.reconcile_latest().await;
	assert_eq!(layer_two.latest_calls.load(Ordering::SeqCst), 2);

	let status = reconciler.circuit_breaker_status();
	let layer_two_status = status.iter().find(|s| s.operation == LAYER_TWO_OP);
	assert!(layer_two_status.is_none() || !layer_two_status.unwrap().is_open);
}

#[tokio::test]
async fn breaker_closes_again_after_cooldown() {
	// Fail twice to trip the breaker, then recover
	let layer_one = Arc::new(MockLayerOneSource::flaky(2));
	let reconciler = build_reconciler(
		breaker_settings(2, 50),
		Arc::clone(&layer_one),
		Arc::new(MockLayerTwoSource::healthy()),
	)
	.await;

	let _ = reconciler.reconcile_latest().await;
	let _ = reconciler.reconcile_latest().await;

	let result = reconciler.reconcile_latest().await;
	assert!(result.errors[0].contains("circuit open"));
	assert_eq!(layer_one.latest_calls.load(Ordering::SeqCst), 2);

	sleep(Duration::from_millis(80)).await;

	let result = reconciler.reconcile_latest().await;
	assert!(result.success, "errors: {:?}", result.errors);
	assert_eq!(layer_one.latest_calls.load(Ordering::SeqCst), 3);

	let status = reconciler.circuit_breaker_status();
	let layer_one_status = status
		.iter()
		.find(|s| s.operation == LAYER_ONE_OP)
		.expect("layer one breaker was tracked");
	assert_eq!(layer_one_status.count, 0);
	assert!(!layer_one_status.is_open);
}
