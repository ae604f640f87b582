//! Service startup logging

use std::env;
use tracing::info;

/// Logs service information at startup
pub fn log_service_info() {
	info!(
		"Supply Reconciler v{} starting on {}/{}",
		env!("CARGO_PKG_VERSION"),
		env::consts::OS,
		env::consts::ARCH
	);

	if let Ok(rust_log) = env::var("RUST_LOG") {
		info!("Log filter override: {}", rust_log);
	}
}

/// Logs startup completion with the bound address
pub fn log_startup_complete(bind_addr: &str) {
	info!("Supply Reconciler listening on http://{}", bind_addr);
}
