//! HTTP facade: `GET /api/v1/orders` and `GET /healthz`.

// crates.io
use axum::{
	Extension, Json, Router,
	extract::{Query, Request, State},
	http::{HeaderValue, StatusCode},
	middleware::{self, Next},
	response::{IntoResponse, Response},
	routing::get,
};
use uuid::Uuid;
// self
use crate::{
	_prelude::*,
	service::{OrderService, PeriodRequest},
};

/// Header echoed on every response.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id stored as a request extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Builds the router over `service`.
pub fn router(service: OrderService) -> Router {
	Router::new()
		.route("/api/v1/orders", get(order_totals))
		.route("/healthz", get(healthz))
		.layer(middleware::from_fn(request_id))
		.with_state(service)
}

/// Reuses the caller's `x-request-id` or assigns a fresh UUID v4, and echoes it back.
pub async fn request_id(mut req: Request, next: Next) -> Response {
	let id = req
		.headers()
		.get(REQUEST_ID_HEADER)
		.and_then(|value| value.to_str().ok())
		.filter(|value| !value.is_empty())
		.map_or_else(|| Uuid::new_v4().to_string(), String::from);

	req.extensions_mut().insert(RequestId(id.clone()));

	let mut res = next.run(req).await;

	if let Ok(value) = HeaderValue::from_str(&id) {
		res.headers_mut().insert(REQUEST_ID_HEADER, value);
	}

	res
}

async fn order_totals(
	State(service): State<OrderService>,
	Extension(RequestId(request_id)): Extension<RequestId>,
	Query(query): Query<HashMap<String, String>>,
) -> Response {
	let period = match PeriodRequest::from_query(&query) {
		Ok(period) => period,
		Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
	};

	match service.totals(&period).await {
		Ok(totals) => Json(totals).into_response(),
		Err(e) if e.is_validation() => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
		Err(e) => {
			tracing::error!(%request_id, error = %e, "order totals failed");

			(StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
		},
	}
}

async fn healthz() -> &'static str {
	"ok"
}
