//! `OrderService.GetTotalOrders` contract.
//!
//! Message and status shapes mirror the protobuf service so a transport adapter can map them
//! one to one; validation here is stricter about zero fields than the HTTP facade.

// self
use crate::{
	_prelude::*,
	service::{OrderService, PeriodRequest},
};

/// `GetTotalOrders` request message. Zero means "unset".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
	/// Year of the first month.
	pub year1: i32,
	/// First month.
	pub month1: i32,
	/// Year of the last month.
	pub year2: i32,
	/// Last month.
	pub month2: i32,
}
impl OrderRequest {
	fn validate(&self) -> Result<PeriodRequest, RpcStatus> {
		if [self.year1, self.month1, self.year2, self.month2].contains(&0) {
			return Err(RpcStatus::invalid_argument("Missing date parameters"));
		}

		let (Ok(month1), Ok(month2)) = (u8::try_from(self.month1), u8::try_from(self.month2))
		else {
			return Err(RpcStatus::invalid_argument("Invalid month parameter"));
		};

		if !(1..=12).contains(&month1) || !(1..=12).contains(&month2) {
			return Err(RpcStatus::invalid_argument("Invalid month parameter"));
		}
		if (self.year1, month1) > (self.year2, month2) {
			return Err(RpcStatus::invalid_argument("Invalid date range"));
		}

		Ok(PeriodRequest { year1: self.year1, month1, year2: self.year2, month2 })
	}
}

/// `GetTotalOrders` response message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderResponse {
	/// Gross total.
	pub total_bruto: f64,
	/// Fee total.
	pub sale_fee_total: f64,
	/// Average fee rate; always `0` for Shopee, whose fees are not computed.
	pub median_tax: f64,
	/// Net total.
	pub total_liquido: f64,
	/// `"{month1}/{year1} a {month2}/{year2}"`.
	pub period_processed: String,
}

/// Status codes used by the contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RpcCode {
	/// Caller input was rejected before any upstream call.
	InvalidArgument,
	/// Fetching or aggregating failed.
	Internal,
}
impl RpcCode {
	/// gRPC canonical name.
	pub const fn as_str(self) -> &'static str {
		match self {
			RpcCode::InvalidArgument => "INVALID_ARGUMENT",
			RpcCode::Internal => "INTERNAL",
		}
	}
}
impl Display for RpcCode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Error status returned by the contract.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("{code}: {message}")]
pub struct RpcStatus {
	/// Status code.
	pub code: RpcCode,
	/// Human-readable message.
	pub message: String,
}
impl RpcStatus {
	/// Builds an `INVALID_ARGUMENT` status.
	pub fn invalid_argument(message: impl Into<String>) -> Self {
		Self { code: RpcCode::InvalidArgument, message: message.into() }
	}

	/// Builds an `INTERNAL` status.
	pub fn internal(message: impl Into<String>) -> Self {
		Self { code: RpcCode::Internal, message: message.into() }
	}
}

impl OrderService {
	/// Handles one `GetTotalOrders` call.
	pub async fn get_total_orders(&self, request: OrderRequest) -> Result<OrderResponse, RpcStatus> {
		let period = request.validate()?;
		let totals = self.totals(&period).await.map_err(|e| {
			if e.is_validation() {
				RpcStatus::invalid_argument(e.to_string())
			} else {
				RpcStatus::internal(format!("failed to fetch orders: {e}"))
			}
		})?;

		Ok(OrderResponse {
			total_bruto: totals.gross_total,
			sale_fee_total: totals.fee_total,
			median_tax: totals.average_fee_rate,
			total_liquido: totals.net_total,
			period_processed: format!(
				"{}/{} a {}/{}",
				request.month1, request.year1, request.month2, request.year2
			),
		})
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::{
		error::TransportError,
		orders::{LineItem, Order, OrderStatus},
		service::{DateRange, OrdersBackend, OrdersFuture},
	};

	#[derive(Default)]
	struct FixedBackend {
		calls: AtomicUsize,
		fail: bool,
	}
	impl OrdersBackend for FixedBackend {
		fn marketplace(&self) -> &str {
			"mercadolibre"
		}

		fn fetch_orders<'a>(&'a self, _range: &'a DateRange) -> OrdersFuture<'a> {
			Box::pin(async move {
				self.calls.fetch_add(1, Ordering::SeqCst);

				if self.fail {
					return Err(TransportError::Api {
						error: "error_server".into(),
						message: "down".into(),
					}
					.into());
				}

				Ok(vec![Order {
					order_id: "1".into(),
					status: OrderStatus::Paid,
					created_at: macros::datetime!(2025-02-22 10:00 UTC),
					paid_amount: 20.0,
					shipping_cost: 0.0,
					shipping_reference: None,
					line_items: vec![LineItem {
						item_id: "MLB1".into(),
						category_id: None,
						quantity: 2,
						unit_price: 10.0,
						listing_type: None,
						sale_fee: 2.0,
						sku: None,
					}],
				}])
			})
		}
	}

	#[tokio::test]
	async fn invalid_requests_never_reach_the_backend() {
		let backend = Arc::new(FixedBackend::default());
		let service = OrderService::new(backend.clone());
		let cases = [
			(OrderRequest { year1: 0, month1: 1, year2: 2025, month2: 2 }, "Missing date parameters"),
			(OrderRequest { year1: 2025, month1: 13, year2: 2025, month2: 2 }, "Invalid month parameter"),
			(OrderRequest { year1: 2025, month1: 1, year2: 2025, month2: -1 }, "Invalid month parameter"),
			(OrderRequest { year1: 2025, month1: 5, year2: 2025, month2: 2 }, "Invalid date range"),
		];

		for (request, message) in cases {
			let status = service.get_total_orders(request).await.expect_err("Request is invalid.");

			assert_eq!(status, RpcStatus::invalid_argument(message));
		}

		assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn valid_request_reports_totals_and_period() {
		let service = OrderService::new(Arc::new(FixedBackend::default()));
		let response = service
			.get_total_orders(OrderRequest { year1: 2025, month1: 2, year2: 2025, month2: 3 })
			.await
			.expect("Request should succeed.");

		assert_eq!(response.total_bruto, 20.0);
		assert_eq!(response.sale_fee_total, 2.0);
		assert_eq!(response.total_liquido, 18.0);
		assert!((response.median_tax - 0.1).abs() < 1e-12);
		assert_eq!(response.period_processed, "2/2025 a 3/2025");
	}

	#[tokio::test]
	async fn backend_failures_are_internal() {
		let service =
			OrderService::new(Arc::new(FixedBackend { calls: AtomicUsize::new(0), fail: true }));
		let status = service
			.get_total_orders(OrderRequest { year1: 2025, month1: 2, year2: 2025, month2: 3 })
			.await
			.expect_err("Backend failure must surface.");

		assert_eq!(status.code, RpcCode::Internal);
		assert!(status.message.starts_with("failed to fetch orders: "));
	}
}
