//! Shopee payloads: `get_order_list` cursor pages and `get_order_detail` batches.
//!
//! Shopee reports failures inside `200 OK` bodies, so every envelope is checked for a
//! non-empty `error` before its `response` is used.
//!
//! Fees are not computed for Shopee: `get_order_detail` carries no per-item commission, so every
//! line item has `sale_fee == 0.0`. A Shopee period therefore reports `SaleFeeTotal` and
//! `MedianTax` as `0`, which means "not computed" rather than "no fees charged".

// self
use crate::{
	_prelude::*,
	error::{DecodeError, TransportError, decode_json},
	orders::{CursorPage, LineItem, Order, OrderStatus, parse::lenient_f64},
};

const DETAIL_CONTEXT: &str = "order detail batch";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
	#[serde(default)]
	error: String,
	#[serde(default)]
	message: String,
	#[serde(default = "Option::default")]
	response: Option<T>,
}
impl<T> Envelope<T> {
	fn into_response(self) -> Result<Option<T>> {
		if self.error.is_empty() {
			Ok(self.response)
		} else {
			Err(TransportError::Api { error: self.error, message: self.message }.into())
		}
	}
}

#[derive(Debug, Default, Deserialize)]
struct OrderListResponse {
	#[serde(default)]
	more: bool,
	#[serde(default)]
	next_cursor: String,
	#[serde(default)]
	order_list: Vec<OrderSerial>,
}

#[derive(Debug, Deserialize)]
struct OrderSerial {
	order_sn: String,
}

#[derive(Debug, Default, Deserialize)]
struct OrderDetailResponse {
	#[serde(default)]
	order_list: Vec<WireOrder>,
}

#[derive(Debug, Deserialize)]
struct WireOrder {
	order_sn: String,
	#[serde(default)]
	order_status: String,
	create_time: i64,
	#[serde(default, deserialize_with = "lenient_f64")]
	total_amount: Option<f64>,
	#[serde(default, deserialize_with = "lenient_f64")]
	actual_shipping_fee: Option<f64>,
	#[serde(default)]
	package_list: Vec<WirePackage>,
	#[serde(default)]
	item_list: Vec<WireItem>,
}

#[derive(Debug, Deserialize)]
struct WirePackage {
	#[serde(default)]
	package_number: String,
}

#[derive(Debug, Deserialize)]
struct WireItem {
	item_id: u64,
	#[serde(default)]
	item_sku: String,
	#[serde(default)]
	model_sku: String,
	#[serde(default)]
	model_quantity_purchased: Option<u32>,
	#[serde(default, deserialize_with = "lenient_f64")]
	model_discounted_price: Option<f64>,
}

/// Decodes a `get_order_list` response into order serial numbers.
pub fn order_list_page(bytes: &[u8]) -> Result<CursorPage<String>> {
	let envelope: Envelope<OrderListResponse> = decode_json("order list page", bytes)?;
	let response = envelope.into_response()?.unwrap_or_default();

	Ok(CursorPage {
		items: response.order_list.into_iter().map(|order| order.order_sn).collect(),
		next_cursor: response.next_cursor,
		more: response.more,
	})
}

/// Decodes a `get_order_detail` response into normalized orders.
///
/// Shopee exposes no per-item marketplace fee here, so `sale_fee` is zero.
pub fn order_detail_page(bytes: &[u8]) -> Result<Vec<Order>> {
	let envelope: Envelope<OrderDetailResponse> = decode_json(DETAIL_CONTEXT, bytes)?;

	envelope.into_response()?.unwrap_or_default().order_list.into_iter().map(into_order).collect()
}

fn into_order(wire: WireOrder) -> Result<Order> {
	let created_at = OffsetDateTime::from_unix_timestamp(wire.create_time)
		.map_err(|_| DecodeError::InvalidField { context: DETAIL_CONTEXT, field: "create_time" })?;
	let line_items = wire
		.item_list
		.into_iter()
		.map(|item| {
			let sku = [item.model_sku, item.item_sku].into_iter().find(|sku| !sku.is_empty());

			LineItem {
				item_id: item.item_id.to_string(),
				category_id: None,
				quantity: item.model_quantity_purchased.unwrap_or_default(),
				unit_price: item.model_discounted_price.unwrap_or_default(),
				listing_type: None,
				sale_fee: 0.0,
				sku,
			}
		})
		.collect();

	Ok(Order {
		order_id: wire.order_sn,
		status: OrderStatus::from_label(&wire.order_status),
		created_at,
		paid_amount: wire.total_amount.unwrap_or_default(),
		shipping_cost: wire.actual_shipping_fee.unwrap_or_default(),
		shipping_reference: wire
			.package_list
			.into_iter()
			.map(|package| package.package_number)
			.find(|number| !number.is_empty()),
		line_items,
	})
}
