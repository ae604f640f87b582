//! HTTP surface of the supply reconciler
//!
//! Thin axum layer over [`recon_service::ReconcilerTrait`]; all domain
//! decisions live below this crate.

pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
