//! Recon Adapters
//!
//! Concrete HTTP implementations of the supply source traits: a layer-one
//! supply indexer, a layer-two bridge subgraph, and a block explorer used
//! for timestamp-to-block resolution. Every request carries a timeout so an
//! unresponsive upstream cannot stall a reconciliation indefinitely.

pub mod block_resolver;
pub mod layer_one;
pub mod layer_two;

pub use block_resolver::ExplorerBlockResolver;
pub use layer_one::LayerOneIndexerAdapter;
pub use layer_two::LayerTwoBridgeAdapter;

use recon_types::SourceError;
use std::time::Duration;

/// Build the shared reqwest client with the per-request timeout applied
pub(crate) fn build_client(timeout_ms: u64) -> Result<reqwest::Client, SourceError> {
	reqwest::Client::builder()
		.timeout(Duration::from_millis(timeout_ms))
		.build()
		.map_err(|e| SourceError::Transport(format!("failed to build HTTP client: {e}")))
}

/// Map a reqwest error to the source error taxonomy
pub(crate) fn transport_error(err: reqwest::Error) -> SourceError {
	SourceError::Transport(err.to_string())
}
