//! Recon Types
//!
//! Shared models and traits for the token supply reconciler.
//! This crate contains all domain models organized by business entity.

pub mod circuit_breaker;
pub mod models;
pub mod sources;
pub mod supply;

// Re-export chrono for convenience
pub use chrono;

// Re-export commonly used types for convenience
pub use models::{AmountError, WeiAmount, WEI_DECIMALS};

pub use supply::{
	LayerOneSupply, LayerTwoSupply, ReconciledSupply, ReconciliationResult, ReconciliationTimings,
};

pub use circuit_breaker::{BreakerEntry, BreakerStatus};

pub use sources::{BlockResolver, LayerOneSource, LayerTwoSource, SourceError, SourceResult};
