use axum::{
	extract::{Query, State},
	http::StatusCode,
	response::Json,
};
use chrono::{DateTime, TimeZone, Utc};
use recon_types::ReconciliationResult;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::state::AppState;

/// GET /v1/supply - reconcile against the current head of both ledgers
pub async fn get_supply(
	State(state): State<AppState>,
) -> (StatusCode, Json<ReconciliationResult>) {
	let result = state.reconciler.reconcile_latest().await;
	let code = if result.success {
		StatusCode::OK
	} else {
		StatusCode::SERVICE_UNAVAILABLE
	};
	(code, Json(result))
}

#[derive(Debug, Deserialize)]
pub struct HistoricalQuery {
	/// RFC 3339 timestamp or unix seconds
	pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct BadRequestResponse {
	pub error: String,
}

/// GET /v1/supply/historical?timestamp=... - reconcile as of a point in time
pub async fn get_historical_supply(
	State(state): State<AppState>,
	Query(query): Query<HistoricalQuery>,
) -> Result<(StatusCode, Json<ReconciliationResult>), (StatusCode, Json<BadRequestResponse>)> {
	let timestamp = parse_timestamp(&query.timestamp).ok_or_else(|| {
		(
			StatusCode::BAD_REQUEST,
			Json(BadRequestResponse {
				error: format!(
					"timestamp '{}' is neither RFC 3339 nor unix seconds",
					query.timestamp
				),
			}),
		)
	})?;

	debug!("historical reconciliation requested for {}", timestamp);
	let result = state.reconciler.reconcile_at_timestamp(timestamp).await;
	let code = if result.success {
		StatusCode::OK
	} else {
		StatusCode::SERVICE_UNAVAILABLE
	};
	Ok((code, Json(result)))
}

/// Accept RFC 3339 first, then fall back to unix seconds
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
	if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
		return Some(parsed.with_timezone(&Utc));
	}
	let seconds: i64 = raw.parse().ok()?;
	Utc.timestamp_opt(seconds, 0).single()
}
