//! Layer-one supply indexer adapter
//!
//! Talks to the layer-one supply indexer's REST API. The indexer reports
//! wei-scale integer strings; amounts pass through untouched so no precision
//! is lost before validation.

use async_trait::async_trait;
use recon_types::{LayerOneSource, LayerOneSupply, SourceError, SourceResult};
use reqwest::{Client, StatusCode};
use tracing::debug;

/// REST adapter for the layer-one supply indexer
#[derive(Debug, Clone)]
pub struct LayerOneIndexerAdapter {
	client: Client,
	endpoint: String,
}

impl LayerOneIndexerAdapter {
	/// Create a new adapter against the given indexer base URL
	pub fn new(endpoint: impl Into<String>, timeout_ms: u64) -> Result<Self, SourceError> {
		Ok(Self {
			client: crate::build_client(timeout_ms)?,
			endpoint: endpoint.into().trim_end_matches('/').to_string(),
		})
	}

	async fn fetch(&self, url: String) -> SourceResult<Option<LayerOneSupply>> {
		debug!("fetching layer-one supply from {}", url);

		let response = self
			.client
			.get(&url)
			.send()
			.await
			.map_err(crate::transport_error)?;

		if response.status() == StatusCode::NOT_FOUND {
			return Ok(None);
		}
		if !response.status().is_success() {
			let status = response.status().as_u16();
			let message = response.text().await.unwrap_or_default();
			return Err(SourceError::UpstreamStatus { status, message });
		}

		let supply = response
			.json::<LayerOneSupply>()
			.await
			.map_err(|e| SourceError::InvalidResponse(e.to_string()))?;

		Ok(Some(supply))
	}
}

#[async_trait]
impl LayerOneSource for LayerOneIndexerAdapter {
	async fn fetch_latest(&self) -> SourceResult<LayerOneSupply> {
		let url = format!("{}/v1/supply/latest", self.endpoint);
		self.fetch(url).await?.ok_or_else(|| {
			SourceError::InvalidResponse("indexer has no latest supply snapshot".to_string())
		})
	}

	async fn fetch_at_block(&self, block: u64) -> SourceResult<Option<LayerOneSupply>> {
		let url = format!("{}/v1/supply/block/{}", self.endpoint, block);
		self.fetch(url).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn trims_trailing_slash_from_endpoint() {
		let adapter = LayerOneIndexerAdapter::new("http://indexer:9100/", 1000).unwrap();
		assert_eq!(adapter.endpoint, "http://indexer:9100");
	}
}
