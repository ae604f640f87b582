//! Mock sources for examples and testing
//!
//! Scripted, in-memory implementations of the source traits so that end-to-end
//! tests exercise the whole stack without any network dependency.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use recon_types::chrono::{DateTime, Utc};
use recon_types::{
	BlockResolver, LayerOneSource, LayerOneSupply, LayerTwoSource, LayerTwoSupply, SourceError,
	SourceResult, WeiAmount,
};

/// Canonical fixture values shared by tests and examples
pub mod fixtures {
	use super::*;

	/// A healthy layer-one snapshot: 10B total, 2B locked, 8.1B circulating
	pub fn layer_one_supply() -> LayerOneSupply {
		LayerOneSupply {
			total_supply: WeiAmount::from("10000000000000000000000000000"),
			locked_supply: WeiAmount::from("2000000000000000000000000000"),
			locked_supply_genesis: WeiAmount::from("1900000000000000000000000000"),
			liquid_supply: WeiAmount::from("8000000000000000000000000000"),
			circulating_supply: WeiAmount::from("8100000000000000000000000000"),
		}
	}

	/// A healthy layer-two snapshot with a net supply of 114095110.8 units
	pub fn layer_two_supply() -> LayerTwoSupply {
		LayerTwoSupply::from_raw(
			WeiAmount::from("3344392801700000000000000000"),
			WeiAmount::from("3230297690900000000000000000"),
			WeiAmount::from("0"),
		)
		.expect("fixture amounts are well formed")
	}
}

/// Scripted layer-one source with configurable failures and per-block data
pub struct MockLayerOneSource {
	snapshot: Mutex<SourceResult<LayerOneSupply>>,
	at_block: Mutex<HashMap<u64, LayerOneSupply>>,
	/// Fail this many calls before succeeding
	failures_remaining: AtomicU32,
	pub latest_calls: AtomicU32,
	pub at_block_calls: AtomicU32,
}

impl MockLayerOneSource {
	/// Always returns the healthy fixture snapshot
	pub fn healthy() -> Self {
		Self {
			snapshot: Mutex::new(Ok(fixtures::layer_one_supply())),
			at_block: Mutex::new(HashMap::new()),
			failures_remaining: AtomicU32::new(0),
			latest_calls: AtomicU32::new(0),
			at_block_calls: AtomicU32::new(0),
		}
	}

	/// Always fails with a transport error
	pub fn failing(message: &str) -> Self {
		Self {
			snapshot: Mutex::new(Err(SourceError::Transport(message.to_string()))),
			..Self::healthy()
		}
	}

	/// Fail the first `count` calls, then serve the healthy fixture
	pub fn flaky(count: u32) -> Self {
		let mock = Self::healthy();
		mock.failures_remaining.store(count, Ordering::SeqCst);
		mock
	}

	/// Replace the snapshot served by `fetch_latest`
	pub fn set_snapshot(&self, snapshot: LayerOneSupply) {
		*self.snapshot.lock().unwrap() = Ok(snapshot);
	}

	/// Register a snapshot for a specific block
	pub fn set_block_snapshot(&self, block: u64, snapshot: LayerOneSupply) {
		self.at_block.lock().unwrap().insert(block, snapshot);
	}

	fn take_scripted_failure(&self) -> Option<SourceError> {
		let remaining = self.failures_remaining.load(Ordering::SeqCst);
		if remaining > 0 {
			self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
			Some(SourceError::Transport("scripted failure".to_string()))
		} else {
			None
		}
	}
}

#[async_trait]
impl LayerOneSource for MockLayerOneSource {
	async fn fetch_latest(&self) -> SourceResult<LayerOneSupply> {
		self.latest_calls.fetch_add(1, Ordering::SeqCst);
		if let Some(err) = self.take_scripted_failure() {
			return Err(err);
		}
		self.snapshot.lock().unwrap().clone()
	}

	async fn fetch_at_block(&self, block: u64) -> SourceResult<Option<LayerOneSupply>> {
		self.at_block_calls.fetch_add(1, Ordering::SeqCst);
		if let Some(err) = self.take_scripted_failure() {
			return Err(err);
		}
		Ok(self.at_block.lock().unwrap().get(&block).cloned())
	}
}

/// Scripted layer-two source, mirror of [`MockLayerOneSource`]
pub struct MockLayerTwoSource {
	snapshot: Mutex<SourceResult<LayerTwoSupply>>,
	at_block: Mutex<HashMap<u64, LayerTwoSupply>>,
	failures_remaining: AtomicU32,
	pub latest_calls: AtomicU32,
	pub at_block_calls: AtomicU32,
}

impl MockLayerTwoSource {
	pub fn healthy() -> Self {
		Self {
			snapshot: Mutex::new(Ok(fixtures::layer_two_supply())),
			at_block: Mutex::new(HashMap::new()),
			failures_remaining: AtomicU32::new(0),
			latest_calls: AtomicU32::new(0),
			at_block_calls: AtomicU32::new(0),
		}
	}

	pub fn failing(message: &str) -> Self {
		Self {
			snapshot: Mutex::new(Err(SourceError::Transport(message.to_string()))),
			..Self::healthy()
		}
	}

	pub fn flaky(count: u32) -> Self {
		let mock = Self::healthy();
		mock.failures_remaining.store(count, Ordering::SeqCst);
		mock
	}

	pub fn set_snapshot(&self, snapshot: LayerTwoSupply) {
		*self.snapshot.lock().unwrap() = Ok(snapshot);
	}

	pub fn set_block_snapshot(&self, block: u64, snapshot: LayerTwoSupply) {
		self.at_block.lock().unwrap().insert(block, snapshot);
	}

	fn take_scripted_failure(&self) -> Option<SourceError> {
		let remaining = self.failures_remaining.load(Ordering::SeqCst);
		if remaining > 0 {
			self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
			Some(SourceError::Transport("scripted failure".to_string()))
		} else {
			None
		}
	}
}

#[async_trait]
impl LayerTwoSource for MockLayerTwoSource {
	async fn fetch_latest(&self) -> SourceResult<LayerTwoSupply> {
		self.latest_calls.fetch_add(1, Ordering::SeqCst);
		if let Some(err) = self.take_scripted_failure() {
			return Err(err);
		}
		self.snapshot.lock().unwrap().clone()
	}

	async fn fetch_at_block(&self, block: u64) -> SourceResult<Option<LayerTwoSupply>> {
		self.at_block_calls.fetch_add(1, Ordering::SeqCst);
		if let Some(err) = self.take_scripted_failure() {
			return Err(err);
		}
		Ok(self.at_block.lock().unwrap().get(&block).cloned())
	}
}

/// Scripted block resolver
pub struct MockBlockResolver {
	block: SourceResult<Option<u64>>,
	head: u64,
}

impl MockBlockResolver {
	/// Resolves every timestamp to the given block
	pub fn resolving_to(block: u64) -> Self {
		Self {
			block: Ok(Some(block)),
			head: block,
		}
	}

	/// Never finds a block for any timestamp
	pub fn unresolving() -> Self {
		Self {
			block: Ok(None),
			head: 0,
		}
	}

	/// Fails every resolution with a transport error
	pub fn failing(message: &str) -> Self {
		Self {
			block: Err(SourceError::Transport(message.to_string())),
			head: 0,
		}
	}
}

#[async_trait]
impl BlockResolver for MockBlockResolver {
	async fn block_for_timestamp(&self, _timestamp: DateTime<Utc>) -> SourceResult<Option<u64>> {
		self.block.clone()
	}

	async fn latest_block(&self) -> SourceResult<u64> {
		Ok(self.head)
	}
}
