//! Mercado Libre payloads: order search pages, shipment costs, and listing id pages.

// crates.io
use time::format_description::well_known::Rfc3339;
// self
use crate::{
	_prelude::*,
	error::{DecodeError, decode_json},
	orders::{LineItem, Order, OrderStatus, parse::lenient_f64},
};

const SEARCH_CONTEXT: &str = "order search page";

/// `paging` block of an order search response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
	/// Orders matching the query.
	#[serde(default)]
	pub total: u64,
	/// Offset of this page.
	#[serde(default)]
	pub offset: u64,
	/// Page size the server applied.
	#[serde(default)]
	pub limit: u64,
}

/// One decoded `/orders/search` page.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchPage {
	/// Orders on this page, in response order.
	pub orders: Vec<Order>,
	/// Server-side paging counters.
	pub paging: Paging,
}

/// Seller-side cost of one shipment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipmentCost {
	/// Cost charged to the seller before discounts.
	pub cost: f64,
	/// Extra charge for Flex delivery.
	pub charge_flex: f64,
	/// Σ promoted discounts.
	pub discount: f64,
	/// `max(cost − discount, 0)`.
	pub final_cost: f64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
	#[serde(default)]
	results: Vec<WireOrder>,
	#[serde(default)]
	paging: Paging,
}

#[derive(Debug, Deserialize)]
struct WireOrder {
	id: u64,
	#[serde(default)]
	status: String,
	date_created: String,
	#[serde(default, deserialize_with = "lenient_f64")]
	shipping_cost: Option<f64>,
	#[serde(default, deserialize_with = "lenient_f64")]
	paid_amount: Option<f64>,
	#[serde(default)]
	shipping: Option<WireShipping>,
	#[serde(default)]
	order_items: Vec<WireOrderItem>,
}

#[derive(Debug, Deserialize)]
struct WireShipping {
	#[serde(default)]
	id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct WireOrderItem {
	item: WireItem,
	#[serde(default)]
	quantity: Option<u32>,
	#[serde(default, deserialize_with = "lenient_f64")]
	unit_price: Option<f64>,
	#[serde(default, deserialize_with = "lenient_f64")]
	sale_fee: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WireItem {
	id: String,
	#[serde(default)]
	category_id: Option<String>,
	#[serde(default)]
	listing_type_id: Option<String>,
	#[serde(default)]
	seller_sku: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CostsResponse {
	#[serde(default)]
	senders: Vec<WireSender>,
}

#[derive(Debug, Deserialize)]
struct WireSender {
	#[serde(default, deserialize_with = "lenient_f64")]
	cost: Option<f64>,
	#[serde(default)]
	charges: Option<WireCharges>,
	#[serde(default)]
	discounts: Vec<WireDiscount>,
}

#[derive(Debug, Deserialize)]
struct WireCharges {
	#[serde(default, deserialize_with = "lenient_f64")]
	charge_flex: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WireDiscount {
	#[serde(default, deserialize_with = "lenient_f64")]
	promoted_amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ItemSearchResponse {
	#[serde(default)]
	results: Vec<String>,
}

/// Decodes an `/orders/search` response.
pub fn search_page(bytes: &[u8]) -> Result<SearchPage> {
	let response: SearchResponse = decode_json(SEARCH_CONTEXT, bytes)?;
	let orders = response.results.into_iter().map(into_order).collect::<Result<Vec<_>>>()?;

	Ok(SearchPage { orders, paging: response.paging })
}

/// Decodes a `/shipments/{id}/costs` response using the first sender.
pub fn shipment_costs(bytes: &[u8]) -> Result<ShipmentCost> {
	let response: CostsResponse = decode_json("shipment costs", bytes)?;
	let sender = response
		.senders
		.into_iter()
		.next()
		.ok_or(DecodeError::InvalidField { context: "shipment costs", field: "senders" })?;
	let cost = sender.cost.unwrap_or_default();
	let discount = sender.discounts.iter().filter_map(|d| d.promoted_amount).sum::<f64>();

	Ok(ShipmentCost {
		cost,
		charge_flex: sender.charges.and_then(|c| c.charge_flex).unwrap_or_default(),
		discount,
		final_cost: (cost - discount).max(0.0),
	})
}

/// Decodes a `/users/{id}/items/search` page into listing ids.
pub fn item_ids_page(bytes: &[u8]) -> Result<Vec<String>> {
	let response: ItemSearchResponse = decode_json("item search page", bytes)?;

	Ok(response.results)
}

fn into_order(wire: WireOrder) -> Result<Order> {
	let created_at = OffsetDateTime::parse(&wire.date_created, &Rfc3339)
		.map_err(|_| DecodeError::InvalidField { context: SEARCH_CONTEXT, field: "date_created" })?;
	let line_items = wire
		.order_items
		.into_iter()
		.map(|line| LineItem {
			item_id: line.item.id,
			category_id: line.item.category_id,
			quantity: line.quantity.unwrap_or_default(),
			unit_price: line.unit_price.unwrap_or_default(),
			listing_type: line.item.listing_type_id,
			sale_fee: line.sale_fee.unwrap_or_default(),
			sku: line.item.seller_sku.filter(|sku| !sku.is_empty()),
		})
		.collect();

	Ok(Order {
		order_id: wire.id.to_string(),
		status: OrderStatus::from_label(&wire.status),
		created_at,
		paid_amount: wire.paid_amount.unwrap_or_default(),
		shipping_cost: wire.shipping_cost.unwrap_or_default(),
		shipping_reference: wire.shipping.and_then(|s| s.id).map(|id| id.to_string()),
		line_items,
	})
}
