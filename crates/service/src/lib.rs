//! Reconciliation core: retry policy, validation and the orchestrator
//!
//! This crate owns every decision between "fetch these two snapshots" and
//! "here is the combined supply picture". It never does I/O of its own; the
//! source adapters are injected behind the trait seams in `recon-types`.

pub mod orchestrator;
pub mod reconcile;
pub mod retry;
pub mod validation;

pub use orchestrator::{
	ReconcilerTrait, ReconciliationService, LAYER_ONE_OP, LAYER_TWO_OP,
};
pub use reconcile::reconcile;
pub use retry::{Attempted, RetryError, RetryExecutor};
pub use validation::{ValidationEngine, ValidationReport};
