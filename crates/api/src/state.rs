//! Shared application state

use recon_service::ReconcilerTrait;
use std::sync::Arc;

/// State handed to every handler; cheap to clone
#[derive(Clone)]
pub struct AppState {
	pub reconciler: Arc<dyn ReconcilerTrait>,
}

impl AppState {
	pub fn new(reconciler: Arc<dyn ReconcilerTrait>) -> Self {
		Self { reconciler }
	}
}
