//! Circuit breaker state types
//!
//! Per-operation-name failure bookkeeping for the retry executor. This is
//! the only state in the system that outlives a single reconciliation
//! request; the executor owns the map and is the only writer.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Consecutive-failure record for one operation name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerEntry {
	/// Consecutive retry-exhausted calls since the last success
	pub count: u32,
	/// When the most recent exhausted call finished
	pub last_failure: Option<DateTime<Utc>>,
}

impl BreakerEntry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Record one retry-exhausted call
	pub fn record_failure(&mut self) {
		self.count += 1;
		self.last_failure = Some(Utc::now());
	}

	/// Clear the record after a success or an elapsed cool-down
	pub fn reset(&mut self) {
		self.count = 0;
		self.last_failure = None;
	}

	/// Whether the cool-down window has elapsed since the last failure
	pub fn cooldown_elapsed(&self, cooldown: Duration) -> bool {
		match self.last_failure {
			Some(at) => Utc::now().signed_duration_since(at) >= cooldown,
			None => true,
		}
	}

	/// Whether the circuit for this operation is currently open
	pub fn is_open(&self, threshold: u32, cooldown: Duration) -> bool {
		self.count >= threshold && !self.cooldown_elapsed(cooldown)
	}
}

/// Read-only snapshot of one breaker, for health reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakerStatus {
	pub operation: String,
	pub count: u32,
	pub last_failure: Option<DateTime<Utc>>,
	pub is_open: bool,
}
