//! Mercado Libre order search, shipment costs, and listing ids.

// std
use std::path::PathBuf;
// self
use crate::{
	_prelude::*,
	fetch::AuthenticatedFetcher,
	orders::{
		OffsetWalker, Order,
		parse::mercadolibre::{self, ShipmentCost},
		snapshot,
	},
	provider,
	service::{DateRange, OrdersBackend, OrdersFuture},
};

const SEARCH_PATH: &str = "/orders/search";
const SEARCH_STATUSES: &str = "paid,confirmed";

/// Orders of the authenticated seller, read through `/orders/search`.
#[derive(Clone, Debug)]
pub struct MercadoLibreOrders {
	fetcher: AuthenticatedFetcher,
	walker: OffsetWalker,
	snapshot_path: Option<PathBuf>,
}
impl MercadoLibreOrders {
	/// Creates a source with the default offset walker that snapshots to
	/// [`snapshot::DEFAULT_SNAPSHOT_FILE`] in the working directory.
	pub fn new(fetcher: AuthenticatedFetcher) -> Self {
		Self {
			fetcher,
			walker: OffsetWalker::new(),
			snapshot_path: Some(PathBuf::from(snapshot::DEFAULT_SNAPSHOT_FILE)),
		}
	}

	/// Overrides page size and page cap.
	pub fn with_walker(mut self, walker: OffsetWalker) -> Self {
		self.walker = walker;

		self
	}

	/// Writes every assembled order set to `path`, replacing the previous file.
	pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.snapshot_path = Some(path.into());

		self
	}

	/// Skips the snapshot file entirely.
	pub fn without_snapshot(mut self) -> Self {
		self.snapshot_path = None;

		self
	}

	/// Fetches every paid or confirmed order created within `range`.
	pub async fn fetch_all(&self, range: &DateRange) -> Result<Vec<Order>> {
		let seller = self.seller_id().await?;
		let from = query_timestamp(range.from);
		let to = query_timestamp(range.to);
		let orders = self
			.walker
			.collect(SEARCH_PATH, |offset, limit| {
				let mut url = self.fetcher.api_url(SEARCH_PATH);

				url.query_pairs_mut()
					.append_pair("seller", &seller)
					.append_pair("limit", &limit.to_string())
					.append_pair("offset", &offset.to_string())
					.append_pair("order.date_created.from", &from)
					.append_pair("order.date_created.to", &to)
					.append_pair("order.status", SEARCH_STATUSES);

				async move {
					let bytes = self.fetcher.get(url).await?;

					Ok(mercadolibre::search_page(&bytes)?.orders)
				}
			})
			.await?;

		tracing::info!(%seller, orders = orders.len(), "mercado libre orders fetched");

		if let Some(path) = &self.snapshot_path {
			snapshot::write_snapshot(path, &orders)?;
		}

		Ok(orders)
	}

	/// Seller-side cost of shipment `shipment_id`.
	pub async fn shipment_cost(&self, shipment_id: &str) -> Result<ShipmentCost> {
		let url = self.fetcher.api_url(&format!("/shipments/{shipment_id}/costs"));
		let bytes = self.fetcher.get(url).await?;

		mercadolibre::shipment_costs(&bytes)
	}

	/// Ids of every listing owned by the seller.
	pub async fn item_ids(&self) -> Result<Vec<String>> {
		let seller = self.seller_id().await?;
		let path = format!("/users/{seller}/items/search");

		self.walker
			.collect(&path, |offset, limit| {
				let mut url = self.fetcher.api_url(&path);

				url.query_pairs_mut()
					.append_pair("offset", &offset.to_string())
					.append_pair("limit", &limit.to_string());

				async move {
					let bytes = self.fetcher.get(url).await?;

					mercadolibre::item_ids_page(&bytes)
				}
			})
			.await
	}

	async fn seller_id(&self) -> Result<String> {
		Ok(self.fetcher.broker().credential().await?.owner_id.to_string())
	}
}
impl OrdersBackend for MercadoLibreOrders {
	fn marketplace(&self) -> &str {
		provider::mercadolibre::PROVIDER_ID
	}

	fn fetch_orders<'a>(&'a self, range: &'a DateRange) -> OrdersFuture<'a> {
		Box::pin(self.fetch_all(range))
	}
}

/// Renders `instant` the way `/orders/search` expects: UTC, millisecond precision, and a
/// `-00:00` suffix.
fn query_timestamp(instant: OffsetDateTime) -> String {
	let utc = instant.to_offset(time::UtcOffset::UTC);

	format!(
		"{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}-00:00",
		utc.year(),
		u8::from(utc.month()),
		utc.day(),
		utc.hour(),
		utc.minute(),
		utc.second(),
		utc.millisecond(),
	)
}
