//! Supply Reconciler Server
//!
//! Main entry point for the reconciliation server

use supply_reconciler::ReconcilerBuilder;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	// Start the complete server with all defaults and setup handled automatically
	ReconcilerBuilder::new().start_server().await
}
