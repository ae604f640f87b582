//! Supply Reconciler Library
//!
//! Reconciles a fungible token's supply across its home ledger and a bridged
//! layer-two ledger by netting bridge flows, and serves the combined picture
//! over HTTP.

use recon_service::{ReconciliationService, RetryExecutor};
use recon_types::{BlockResolver, LayerOneSource, LayerTwoSource};

// Core domain types
pub use recon_types::{
	chrono,
	AmountError,
	BreakerStatus,
	LayerOneSupply,
	LayerTwoSupply,
	ReconciledSupply,
	ReconciliationResult,
	ReconciliationTimings,
	SourceError,
	SourceResult,
	WeiAmount,
};

// Service layer
pub use recon_service::{
	reconcile, Attempted, ReconcilerTrait, RetryError, ValidationEngine, ValidationReport,
	LAYER_ONE_OP, LAYER_TWO_OP,
};

// API layer
pub use recon_api::{create_router, AppState};

// Adapters
pub use recon_adapters::{ExplorerBlockResolver, LayerOneIndexerAdapter, LayerTwoBridgeAdapter};

// Config
pub use recon_config::{load_config, log_service_info, log_startup_complete, Settings};

// Module aliases for direct access to each layer
pub mod models {
	pub use recon_types::*;
}

pub mod config {
	pub use recon_config::*;
}

pub mod adapters {
	pub use recon_adapters::*;
}

pub mod api {
	pub use recon_api::*;
}

pub mod service {
	pub use recon_service::*;
}

pub mod mocks;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

// Re-export external dependencies for downstream callers
pub use async_trait;

/// Builder wiring settings, sources and the retry policy into a server
///
/// Sources default to the HTTP adapters configured from [`Settings`]; tests
/// inject scripted implementations instead.
#[derive(Default)]
pub struct ReconcilerBuilder {
	settings: Option<Settings>,
	layer_one: Option<Arc<dyn LayerOneSource>>,
	layer_two: Option<Arc<dyn LayerTwoSource>>,
	blocks: Option<Arc<dyn BlockResolver>>,
}

impl ReconcilerBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Set custom settings
	pub fn with_settings(mut self, settings: Settings) -> Self {
		self.settings = Some(settings);
		self
	}

	/// Inject a layer-one source, replacing the HTTP adapter
	pub fn with_layer_one_source(mut self, source: Arc<dyn LayerOneSource>) -> Self {
		self.layer_one = Some(source);
		self
	}

	/// Inject a layer-two source, replacing the HTTP adapter
	pub fn with_layer_two_source(mut self, source: Arc<dyn LayerTwoSource>) -> Self {
		self.layer_two = Some(source);
		self
	}

	/// Inject a block resolver, replacing the explorer adapter
	pub fn with_block_resolver(mut self, resolver: Arc<dyn BlockResolver>) -> Self {
		self.blocks = Some(resolver);
		self
	}

	/// Initialize tracing with configuration-based settings
	fn init_tracing_from_settings(
		&self,
		settings: &Settings,
	) -> Result<(), Box<dyn std::error::Error>> {
		use recon_config::LogFormat;

		let log_level = &settings.logging.level;
		let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
			.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

		match settings.logging.format {
			LogFormat::Json => {
				let subscriber = tracing_subscriber::fmt().json().with_env_filter(env_filter);
				if settings.logging.structured {
					subscriber.with_target(true).with_thread_ids(true).init();
				} else {
					subscriber.init();
				}
			},
			LogFormat::Pretty => {
				let subscriber = tracing_subscriber::fmt()
					.pretty()
					.with_env_filter(env_filter);
				if settings.logging.structured {
					subscriber.with_target(true).with_thread_ids(true).init();
				} else {
					subscriber.init();
				}
			},
			LogFormat::Compact => {
				let subscriber = tracing_subscriber::fmt()
					.compact()
					.with_env_filter(env_filter);
				if settings.logging.structured {
					subscriber.with_target(true).with_thread_ids(true).init();
				} else {
					subscriber.init();
				}
			},
		}

		info!(
			"Logging configuration applied: level={}, format={:?}, structured={}",
			settings.logging.level, settings.logging.format, settings.logging.structured
		);

		Ok(())
	}

	/// Build the reconciliation service and return the router with its state
	pub async fn start(self) -> Result<(axum::Router, AppState), Box<dyn std::error::Error>> {
		let settings = self.settings.clone().unwrap_or_default();
		let timeout_ms = settings.sources.request_timeout_ms;

		let layer_one: Arc<dyn LayerOneSource> = match self.layer_one {
			Some(source) => source,
			None => Arc::new(LayerOneIndexerAdapter::new(
				settings.sources.l1_endpoint.clone(),
				timeout_ms,
			)?),
		};
		let layer_two: Arc<dyn LayerTwoSource> = match self.layer_two {
			Some(source) => source,
			None => Arc::new(LayerTwoBridgeAdapter::new(
				settings.sources.l2_endpoint.clone(),
				timeout_ms,
			)?),
		};
		let blocks: Arc<dyn BlockResolver> = match self.blocks {
			Some(resolver) => resolver,
			None => Arc::new(ExplorerBlockResolver::new(
				settings.sources.explorer_endpoint.clone(),
				settings.explorer_api_key(),
				timeout_ms,
			)?),
		};

		let retry = Arc::new(RetryExecutor::new(&settings.retry, &settings.circuit_breaker));
		let reconciler = ReconciliationService::new(
			layer_one,
			layer_two,
			blocks,
			retry,
			settings.validation.enabled,
		);

		let app_state = AppState::new(Arc::new(reconciler));
		let router = create_router().with_state(app_state.clone());

		Ok((router, app_state))
	}

	/// Start the complete server: .env, config, tracing, bind and serve
	pub async fn start_server(mut self) -> Result<(), Box<dyn std::error::Error>> {
		dotenvy::dotenv().ok();

		let using_provided_settings = self.settings.is_some();
		let settings = match self.settings.take() {
			Some(settings) => settings,
			None => load_config().unwrap_or_default(),
		};

		self.init_tracing_from_settings(&settings)?;
		log_service_info();

		info!(
			"Using configuration: loaded from {}",
			if using_provided_settings {
				"provided settings"
			} else {
				"config file or defaults"
			}
		);
		info!(
			"Sources: layer one {}, layer two {}, explorer {}",
			settings.sources.l1_endpoint,
			settings.sources.l2_endpoint,
			settings.sources.explorer_endpoint
		);

		let bind_addr = settings.bind_address();
		let addr: SocketAddr = bind_addr
			.parse()
			.map_err(|e| format!("Invalid bind address '{}': {}", bind_addr, e))?;

		self.settings = Some(settings);
		let (app, _) = self.start().await?;

		let listener = tokio::net::TcpListener::bind(addr).await?;

		log_startup_complete(&bind_addr);
		info!("API endpoints available:");
		info!("  GET  /health");
		info!("  GET  /ready");
		info!("  GET  /v1/supply");
		info!("  GET  /v1/supply/historical");

		axum::serve(listener, app).await?;

		Ok(())
	}
}
