//! Test server for integration tests
//!
//! Spawns the full router over injected mock sources on an ephemeral port.

use std::sync::Arc;

use axum::Router;
use supply_reconciler::mocks::{MockBlockResolver, MockLayerOneSource, MockLayerTwoSource};
use supply_reconciler::{ReconcilerBuilder, Settings};
use tokio::task::JoinHandle;

pub struct TestServer {
	pub base_url: String,
	pub handle: JoinHandle<()>,
}

impl TestServer {
	/// Spawn a server over healthy mock sources
	#[allow(dead_code)]
	pub async fn spawn() -> Result<Self, Box<dyn std::error::Error>> {
		Self::spawn_with_sources(
			Arc::new(MockLayerOneSource::healthy()),
			Arc::new(MockLayerTwoSource::healthy()),
			Arc::new(MockBlockResolver::unresolving()),
		)
		.await
	}

	/// Spawn a server with the given sources and default settings
	pub async fn spawn_with_sources(
		layer_one: Arc<MockLayerOneSource>,
		layer_two: Arc<MockLayerTwoSource>,
		blocks: Arc<MockBlockResolver>,
	) -> Result<Self, Box<dyn std::error::Error>> {
		Self::spawn_with_settings(Settings::default(), layer_one, layer_two, blocks).await
	}

	/// Spawn a server with full control over settings and sources
	pub async fn spawn_with_settings(
		mut settings: Settings,
		layer_one: Arc<MockLayerOneSource>,
		layer_two: Arc<MockLayerTwoSource>,
		blocks: Arc<MockBlockResolver>,
	) -> Result<Self, Box<dyn std::error::Error>> {
		// Keep retries fast; individual tests override the rest
		settings.retry.base_delay_ms = 1;
		settings.retry.max_delay_ms = 2;

		let (app, _state) = ReconcilerBuilder::new()
			.with_settings(settings)
			.with_layer_one_source(layer_one)
			.with_layer_two_source(layer_two)
			.with_block_resolver(blocks)
			.start()
			.await?;

		Self::spawn_server_with_app(app).await
	}

	async fn spawn_server_with_app(app: Router) -> Result<Self, Box<dyn std::error::Error>> {
		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
		let addr = listener.local_addr()?;
		let handle = tokio::spawn(async move {
			let _ = axum::serve(listener, app).await;
		});

		Ok(Self {
			base_url: format!("http://{}", addr),
			handle,
		})
	}

	pub fn abort(&self) {
		self.handle.abort();
	}
}
