//! Retry executor with per-operation circuit breaking
//!
//! Wraps an arbitrary fallible async operation with bounded retries, capped
//! exponential backoff, and a per-operation-name consecutive-failure counter
//! that fast-fails an operation class for a cool-down window once its
//! failure budget is exhausted. Breaker state is the only thing shared
//! across requests; each operation name is counted independently, so tripped
//! layer-one fetches never block layer-two fetches.

use chrono::Duration as ChronoDuration;
use dashmap::DashMap;
use recon_config::{CircuitBreakerSettings, RetrySettings};
use recon_types::{BreakerEntry, BreakerStatus};
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Successful outcome of a retried operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempted<T> {
	pub value: T,
	/// 1-based attempt on which the operation succeeded
	pub attempts: u32,
	pub elapsed_ms: u64,
}

/// Failure outcome of a retried operation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RetryError {
	/// The breaker for this operation name is open; no attempt was made
	#[error("circuit open for operation '{operation}', failing fast")]
	CircuitOpen { operation: String },

	/// Every attempt failed; carries the final attempt's error
	#[error("operation '{operation}' failed after {attempts} attempts: {last_error}")]
	Exhausted {
		operation: String,
		attempts: u32,
		elapsed_ms: u64,
		last_error: String,
	},
}

impl RetryError {
	/// Wall-clock time spent inside the executor (0 for a fast-fail)
	pub fn elapsed_ms(&self) -> u64 {
		match self {
			RetryError::CircuitOpen { .. } => 0,
			RetryError::Exhausted { elapsed_ms, .. } => *elapsed_ms,
		}
	}

	pub fn is_circuit_open(&self) -> bool {
		matches!(self, RetryError::CircuitOpen { .. })
	}
}

/// Executor owning retry policy and the shared breaker map
///
/// Instantiate one per process (or per test) and share it behind an `Arc`;
/// there is deliberately no ambient global instance.
pub struct RetryExecutor {
	max_attempts: u32,
	base_delay_ms: u64,
	max_delay_ms: u64,
	backoff_multiplier: f64,
	failure_threshold: u32,
	cooldown: ChronoDuration,
	breakers: DashMap<String, BreakerEntry>,
}

impl RetryExecutor {
	/// Create an executor from retry and breaker settings
	pub fn new(retry: &RetrySettings, breaker: &CircuitBreakerSettings) -> Self {
		Self {
			max_attempts: retry.max_attempts.max(1),
			base_delay_ms: retry.base_delay_ms,
			max_delay_ms: retry.max_delay_ms,
			backoff_multiplier: retry.backoff_multiplier,
			failure_threshold: breaker.failure_threshold.max(1),
			cooldown: ChronoDuration::milliseconds(breaker.cooldown_ms as i64),
			breakers: DashMap::new(),
		}
	}

	/// Create an executor with the documented defaults
	pub fn with_defaults() -> Self {
		Self::new(&RetrySettings::default(), &CircuitBreakerSettings::default())
	}

	/// Execute `op` under the retry policy for the given operation name
	///
	/// Fast-fails with zero attempts when the breaker for `operation` is
	/// open. Otherwise runs up to `max_attempts` tries, sleeping
	/// `min(base * multiplier^(attempt-1), cap)` between them. Success at
	/// any attempt resets the breaker; exhausting every attempt increments
	/// it.
	pub async fn execute<T, E, F, Fut>(
		&self,
		operation: &str,
		mut op: F,
	) -> Result<Attempted<T>, RetryError>
	where
		F: FnMut() -> Fut,
		Fut: Future<Output = Result<T, E>>,
		E: fmt::Display,
	{
		if self.circuit_is_open(operation) {
			debug!("breaker for '{}' is open, failing fast", operation);
			return Err(RetryError::CircuitOpen {
				operation: operation.to_string(),
			});
		}

		let started = Instant::now();
		let mut last_error = String::new();

		for attempt in 1..=self.max_attempts {
			match op().await {
				Ok(value) => {
					self.record_success(operation);
					return Ok(Attempted {
						value,
						attempts: attempt,
						elapsed_ms: started.elapsed().as_millis() as u64,
					});
				},
				Err(err) => {
					last_error = err.to_string();
					warn!(
						"operation '{}' attempt {}/{} failed: {}",
						operation, attempt, self.max_attempts, last_error
					);
					if attempt < self.max_attempts {
						sleep(self.backoff_delay(attempt)).await;
					}
				},
			}
		}

		let failures = self.record_exhaustion(operation);
		if failures >= self.failure_threshold {
			warn!(
				"breaker for '{}' is now open after {} consecutive exhausted calls, cooling down for {}ms",
				operation,
				failures,
				self.cooldown.num_milliseconds()
			);
		}

		Err(RetryError::Exhausted {
			operation: operation.to_string(),
			attempts: self.max_attempts,
			elapsed_ms: started.elapsed().as_millis() as u64,
			last_error,
		})
	}

	/// Read-only snapshot of every tracked breaker, for health reporting
	pub fn status(&self) -> Vec<BreakerStatus> {
		let mut statuses: Vec<BreakerStatus> = self
			.breakers
			.iter()
			.map(|entry| BreakerStatus {
				operation: entry.key().clone(),
				count: entry.value().count,
				last_failure: entry.value().last_failure,
				is_open: entry.value().is_open(self.failure_threshold, self.cooldown),
			})
			.collect();
		statuses.sort_by(|a, b| a.operation.cmp(&b.operation));
		statuses
	}

	/// Backoff delay before the attempt following `attempt` (1-based)
	fn backoff_delay(&self, attempt: u32) -> Duration {
		let exponent = attempt.saturating_sub(1).min(32) as i32;
		let scaled = self.base_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
		Duration::from_millis(scaled.min(self.max_delay_ms as f64) as u64)
	}

	fn circuit_is_open(&self, operation: &str) -> bool {
		let Some(mut entry) = self.breakers.get_mut(operation) else {
			return false;
		};
		if entry.count < self.failure_threshold {
			return false;
		}
		if entry.cooldown_elapsed(self.cooldown) {
			info!(
				"breaker for '{}' cooled down after {} consecutive failures, permitting attempts",
				operation, entry.count
			);
			entry.reset();
			return false;
		}
		true
	}

	fn record_success(&self, operation: &str) {
		if let Some(mut entry) = self.breakers.get_mut(operation) {
			if entry.count > 0 {
				debug!(
					"operation '{}' succeeded, resetting breaker (was {})",
					operation, entry.count
				);
			}
			entry.reset();
		}
	}

	fn record_exhaustion(&self, operation: &str) -> u32 {
		let mut entry = self.breakers.entry(operation.to_string()).or_default();
		entry.record_failure();
		entry.count
	}
}
