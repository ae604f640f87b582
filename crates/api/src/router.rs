use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
	cors::CorsLayer,
	limit::RequestBodyLimitLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};
use tracing::Level;

use crate::handlers::{get_historical_supply, get_supply, health, ready};
use crate::state::AppState;

pub fn create_router() -> Router<AppState> {
	let cors = CorsLayer::permissive();
	let body_limit = RequestBodyLimitLayer::new(64 * 1024);
	let trace = TraceLayer::new_for_http()
		.make_span_with(|req: &axum::http::Request<_>| {
			let req_id = req
				.headers()
				.get("x-request-id")
				.and_then(|v| v.to_str().ok())
				.unwrap_or("-");
			tracing::info_span!(
				"http_request",
				method = %req.method(),
				uri = %req.uri(),
				req_id
			)
		})
		.on_request(tower_http::trace::DefaultOnRequest::new().level(Level::INFO))
		.on_response(
			tower_http::trace::DefaultOnResponse::new()
				.level(Level::INFO)
				.latency_unit(tower_http::LatencyUnit::Millis),
		);
	let req_id = ServiceBuilder::new()
		.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
		.layer(PropagateRequestIdLayer::x_request_id());

	Router::new()
		.route("/health", get(health))
		.route("/ready", get(ready))
		.route("/v1/supply", get(get_supply))
		.route("/v1/supply/historical", get(get_historical_supply))
		.layer(cors)
		.layer(trace)
		.layer(req_id)
		.layer(body_limit)
}
