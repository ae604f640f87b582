use axum::{extract::State, http::StatusCode, response::Json};
use recon_types::BreakerStatus;
use serde::Serialize;

use crate::state::AppState;

/// Liveness probe
pub async fn health() -> &'static str {
	"OK"
}

/// Readiness response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessResponse {
	pub status: String,
	pub circuit_breakers: Vec<BreakerStatus>,
}

/// GET /ready - degraded (503) while any circuit breaker is open
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
	let circuit_breakers = state.reconciler.circuit_breaker_status();
	let all_closed = circuit_breakers.iter().all(|b| !b.is_open);

	let status = if all_closed { "ready" } else { "degraded" };
	let code = if all_closed {
		StatusCode::OK
	} else {
		StatusCode::SERVICE_UNAVAILABLE
	};
	(
		code,
		Json(ReadinessResponse {
			status: status.to_string(),
			circuit_breakers,
		}),
	)
}
