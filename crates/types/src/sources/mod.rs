//! Source adapter contracts
//!
//! Abstract seams between the reconciliation core and the two upstream
//! ledgers. Implementations live in `recon-adapters`; tests inject scripted
//! mocks. Timeouts are an adapter responsibility: a fetch that hangs stalls
//! the whole reconciliation, so concrete adapters bound every request.

pub mod errors;

use crate::supply::{LayerOneSupply, LayerTwoSupply};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use errors::{SourceError, SourceResult};

/// Layer-one supply facts provider
#[async_trait]
pub trait LayerOneSource: Send + Sync {
	/// Fetch the current supply snapshot
	async fn fetch_latest(&self) -> SourceResult<LayerOneSupply>;

	/// Fetch the snapshot at a specific block; `None` when the upstream has
	/// no data for that block (the orchestrator then falls back to latest)
	async fn fetch_at_block(&self, block: u64) -> SourceResult<Option<LayerOneSupply>>;
}

/// Layer-two supply facts provider
#[async_trait]
pub trait LayerTwoSource: Send + Sync {
	/// Fetch the current supply snapshot
	async fn fetch_latest(&self) -> SourceResult<LayerTwoSupply>;

	/// Fetch the snapshot at a specific block; `None` when the upstream has
	/// no data for that block
	async fn fetch_at_block(&self, block: u64) -> SourceResult<Option<LayerTwoSupply>>;
}

/// Resolver from human-supplied timestamps to ledger block numbers
#[async_trait]
pub trait BlockResolver: Send + Sync {
	/// Resolve a timestamp to the closest block at or before it; `None`
	/// when no such block is known
	async fn block_for_timestamp(&self, timestamp: DateTime<Utc>) -> SourceResult<Option<u64>>;

	/// Resolve the chain head block number
	async fn latest_block(&self) -> SourceResult<u64>;
}
