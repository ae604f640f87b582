//! Configuration settings structures

use serde::{Deserialize, Serialize};
use std::env;

/// Main application settings
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
	pub server: ServerSettings,
	pub sources: SourceSettings,
	pub retry: RetrySettings,
	pub circuit_breaker: CircuitBreakerSettings,
	pub validation: ValidationSettings,
	pub logging: LoggingSettings,
}

impl Settings {
	/// Socket address string the HTTP server binds to
	pub fn bind_address(&self) -> String {
		format!("{}:{}", self.server.host, self.server.port)
	}

	/// Explorer API key, with the environment variable taking precedence
	/// over the config file so the key never has to live on disk
	pub fn explorer_api_key(&self) -> Option<String> {
		env::var("EXPLORER_API_KEY")
			.ok()
			.filter(|key| !key.is_empty())
			.or_else(|| self.sources.explorer_api_key.clone())
	}
}

/// Server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
	pub host: String,
	pub port: u16,
}

impl Default for ServerSettings {
	fn default() -> Self {
		Self {
			host: "0.0.0.0".to_string(),
			port: 4000,
		}
	}
}

/// Upstream data source endpoints
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SourceSettings {
	/// Layer-one supply indexer base URL
	pub l1_endpoint: String,
	/// Layer-two bridge subgraph URL
	pub l2_endpoint: String,
	/// Block explorer API base URL (timestamp-to-block resolution)
	pub explorer_endpoint: String,
	/// Explorer API key; prefer the EXPLORER_API_KEY environment variable
	pub explorer_api_key: Option<String>,
	/// Per-request timeout applied by every adapter
	pub request_timeout_ms: u64,
}

impl Default for SourceSettings {
	fn default() -> Self {
		Self {
			l1_endpoint: "http://localhost:9100".to_string(),
			l2_endpoint: "http://localhost:8000/subgraphs/name/token-bridge".to_string(),
			explorer_endpoint: "https://api.etherscan.io/api".to_string(),
			explorer_api_key: None,
			request_timeout_ms: 10_000,
		}
	}
}

/// Bounded-retry and backoff configuration for source fetches
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RetrySettings {
	pub max_attempts: u32,
	pub base_delay_ms: u64,
	pub max_delay_ms: u64,
	pub backoff_multiplier: f64,
}

impl Default for RetrySettings {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			base_delay_ms: 1_000,
			max_delay_ms: 8_000,
			backoff_multiplier: 2.0,
		}
	}
}

/// Circuit breaker configuration, shared by all operation names
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CircuitBreakerSettings {
	/// Consecutive retry-exhausted calls before the circuit opens
	pub failure_threshold: u32,
	/// How long an open circuit fast-fails before permitting attempts again
	pub cooldown_ms: u64,
}

impl Default for CircuitBreakerSettings {
	fn default() -> Self {
		Self {
			failure_threshold: 5,
			cooldown_ms: 300_000,
		}
	}
}

/// Validation engine switch
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ValidationSettings {
	pub enabled: bool,
}

impl Default for ValidationSettings {
	fn default() -> Self {
		Self { enabled: true }
	}
}

/// Logging output format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	Json,
	Pretty,
	Compact,
}

/// Logging configuration consumed by the builder's tracing init
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingSettings {
	pub level: String,
	pub format: LogFormat,
	pub structured: bool,
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Compact,
			structured: false,
		}
	}
}
