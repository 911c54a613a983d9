//! Shopee order pipeline: date windows, cursor order lists, batched detail lookups.
//!
//! Orders come back without marketplace fees (see [`crate::orders::parse::shopee`]), so
//! Shopee totals carry gross and net amounts only.

// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	fetch::AuthenticatedFetcher,
	orders::{CursorWalker, DateWindows, Order, parse::shopee},
	provider,
	service::{DateRange, OrdersBackend, OrdersFuture},
};

const ORDER_LIST_PATH: &str = "/api/v2/order/get_order_list";
const ORDER_DETAIL_PATH: &str = "/api/v2/order/get_order_detail";
const DETAIL_FIELDS: &str = "item_list,package_list,total_amount,actual_shipping_fee";

/// Order serial numbers accepted by one `get_order_detail` call.
pub const DETAIL_BATCH_SIZE: usize = 50;
/// Pause between detail batches.
pub const DEFAULT_BATCH_DELAY: StdDuration = StdDuration::from_millis(300);

/// Orders of the authorized shop.
#[derive(Clone, Debug)]
pub struct ShopeeOrders {
	fetcher: AuthenticatedFetcher,
	walker: CursorWalker,
	batch_delay: StdDuration,
	window_span: Duration,
}
impl ShopeeOrders {
	/// Creates a source with 15-day windows and the default batch delay.
	pub fn new(fetcher: AuthenticatedFetcher) -> Self {
		Self {
			fetcher,
			walker: CursorWalker::new(),
			batch_delay: DEFAULT_BATCH_DELAY,
			window_span: DateWindows::DEFAULT_SPAN,
		}
	}

	/// Overrides page size and page cap of the order list walk.
	pub fn with_walker(mut self, walker: CursorWalker) -> Self {
		self.walker = walker;

		self
	}

	/// Overrides the pause between detail batches; zero disables it.
	pub fn with_batch_delay(mut self, delay: StdDuration) -> Self {
		self.batch_delay = delay;

		self
	}

	/// Overrides the longest window sent to `get_order_list`.
	pub fn with_window_span(mut self, span: Duration) -> Self {
		self.window_span = span;

		self
	}

	/// Fetches every order created within `range`.
	pub async fn fetch_all(&self, range: &DateRange) -> Result<Vec<Order>> {
		let mut serials = Vec::new();

		for (from, to) in DateWindows::new(range.from, range.to).with_span(self.window_span) {
			serials.extend(self.order_serials(from, to).await?);
		}

		let mut orders = Vec::with_capacity(serials.len());

		for (index, batch) in serials.chunks(DETAIL_BATCH_SIZE).enumerate() {
			if index > 0 && !self.batch_delay.is_zero() {
				tokio::time::sleep(self.batch_delay).await;
			}

			orders.extend(self.order_details(batch).await?);
		}

		tracing::info!(serials = serials.len(), orders = orders.len(), "shopee orders fetched");

		Ok(orders)
	}

	async fn order_serials(&self, from: OffsetDateTime, to: OffsetDateTime) -> Result<Vec<String>> {
		let time_from = from.unix_timestamp().to_string();
		let time_to = to.unix_timestamp().to_string();

		self.walker
			.collect(ORDER_LIST_PATH, |cursor, page_size| {
				let mut url = self.fetcher.api_url(ORDER_LIST_PATH);

				url.query_pairs_mut()
					.append_pair("time_range_field", "create_time")
					.append_pair("time_from", &time_from)
					.append_pair("time_to", &time_to)
					.append_pair("page_size", &page_size.to_string())
					.append_pair("cursor", &cursor);

				async move {
					let bytes = self.fetcher.get(url).await?;

					shopee::order_list_page(&bytes)
				}
			})
			.await
	}

	async fn order_details(&self, serials: &[String]) -> Result<Vec<Order>> {
		let mut url = self.fetcher.api_url(ORDER_DETAIL_PATH);

		url.query_pairs_mut()
			.append_pair("order_sn_list", &serials.join(","))
			.append_pair("response_optional_fields", DETAIL_FIELDS);

		let bytes = self.fetcher.get(url).await?;

		tracing::debug!(batch = serials.len(), "order detail batch fetched");

		shopee::order_detail_page(&bytes)
	}
}
impl OrdersBackend for ShopeeOrders {
	fn marketplace(&self) -> &str {
		provider::shopee::PROVIDER_ID
	}

	fn fetch_orders<'a>(&'a self, range: &'a DateRange) -> OrdersFuture<'a> {
		Box::pin(self.fetch_all(range))
	}
}
