//! Explorer-backed block resolver
//!
//! Resolves a human-supplied timestamp to a ledger block number using an
//! Etherscan-compatible explorer API, and the chain head via the explorer's
//! JSON-RPC proxy.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use recon_types::{BlockResolver, SourceError, SourceResult};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ExplorerResponse {
	status: String,
	message: String,
	result: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProxyResponse {
	result: Option<String>,
}

/// Etherscan-style block resolver
#[derive(Debug, Clone)]
pub struct ExplorerBlockResolver {
	client: Client,
	endpoint: String,
	api_key: Option<String>,
}

impl ExplorerBlockResolver {
	/// Create a new resolver against the given explorer API base URL
	pub fn new(
		endpoint: impl Into<String>,
		api_key: Option<String>,
		timeout_ms: u64,
	) -> Result<Self, SourceError> {
		Ok(Self {
			client: crate::build_client(timeout_ms)?,
			endpoint: endpoint.into(),
			api_key,
		})
	}

	fn key(&self) -> &str {
		self.api_key.as_deref().unwrap_or("")
	}
}

#[async_trait]
impl BlockResolver for ExplorerBlockResolver {
	async fn block_for_timestamp(&self, timestamp: DateTime<Utc>) -> SourceResult<Option<u64>> {
		let url = format!(
			"{}?module=block&action=getblocknobytime&timestamp={}&closest=before&apikey={}",
			self.endpoint,
			timestamp.timestamp(),
			self.key()
		);
		debug!("resolving block for timestamp {}", timestamp);

		let response = self
			.client
			.get(&url)
			.send()
			.await
			.map_err(crate::transport_error)?;
		if !response.status().is_success() {
			let status = response.status().as_u16();
			let message = response.text().await.unwrap_or_default();
			return Err(SourceError::UpstreamStatus { status, message });
		}

		let body = response
			.json::<ExplorerResponse>()
			.await
			.map_err(|e| SourceError::InvalidResponse(e.to_string()))?;

		// The explorer reports "no record found" as status "0"
		if body.status != "1" {
			debug!(
				"explorer found no block for timestamp {}: {}",
				timestamp, body.message
			);
			return Ok(None);
		}

		let raw = body.result.unwrap_or_default();
		let block = raw.parse::<u64>().map_err(|_| {
			SourceError::InvalidResponse(format!("explorer returned non-numeric block '{raw}'"))
		})?;

		Ok(Some(block))
	}

	async fn latest_block(&self) -> SourceResult<u64> {
		let url = format!(
			"{}?module=proxy&action=eth_blockNumber&apikey={}",
			self.endpoint,
			self.key()
		);

		let response = self
			.client
			.get(&url)
			.send()
			.await
			.map_err(crate::transport_error)?;
		if !response.status().is_success() {
			let status = response.status().as_u16();
			let message = response.text().await.unwrap_or_default();
			return Err(SourceError::UpstreamStatus { status, message });
		}

		let body = response
			.json::<ProxyResponse>()
			.await
			.map_err(|e| SourceError::InvalidResponse(e.to_string()))?;

		let raw = body.result.unwrap_or_default();
		let digits = raw.trim_start_matches("0x");
		u64::from_str_radix(digits, 16).map_err(|_| {
			SourceError::InvalidResponse(format!("explorer returned non-hex head block '{raw}'"))
		})
	}
}
