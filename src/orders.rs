//! Normalized order model shared by both marketplaces, plus the listing pipeline pieces.
//!
//! `paging` walks offset and cursor listings, `parse` turns provider payloads into [`Order`]s,
//! `aggregate` sums them, and `snapshot` dumps an assembled set to disk.

pub mod aggregate;
pub mod paging;
pub mod parse;
pub mod snapshot;

pub use aggregate::*;
pub use paging::*;

// self
use crate::_prelude::*;

/// Order lifecycle status normalized across marketplaces.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
	/// Payment approved.
	Paid,
	/// Order confirmed but not yet paid out.
	Confirmed,
	/// Awaiting buyer payment.
	PaymentRequired,
	/// Payment is being processed.
	PaymentInProcess,
	/// Handed to the carrier.
	Shipped,
	/// Delivered and closed.
	Completed,
	/// Cancelled by buyer, seller, or marketplace.
	Cancelled,
	/// Any label without a normalized counterpart, kept verbatim.
	Other(String),
}
impl OrderStatus {
	/// Normalizes a provider label (`paid`, `READY_TO_SHIP`, ...).
	pub fn from_label(label: &str) -> Self {
		match label.trim().to_ascii_lowercase().as_str() {
			"paid" | "ready_to_ship" | "processed" => Self::Paid,
			"confirmed" => Self::Confirmed,
			"payment_required" | "unpaid" => Self::PaymentRequired,
			"payment_in_process" => Self::PaymentInProcess,
			"shipped" | "to_confirm_receive" => Self::Shipped,
			"completed" => Self::Completed,
			"cancelled" => Self::Cancelled,
			_ => Self::Other(label.to_owned()),
		}
	}

	/// Canonical label.
	pub fn as_str(&self) -> &str {
		match self {
			Self::Paid => "paid",
			Self::Confirmed => "confirmed",
			Self::PaymentRequired => "payment_required",
			Self::PaymentInProcess => "payment_in_process",
			Self::Shipped => "shipped",
			Self::Completed => "completed",
			Self::Cancelled => "cancelled",
			Self::Other(label) => label,
		}
	}
}
impl From<String> for OrderStatus {
	fn from(label: String) -> Self {
		Self::from_label(&label)
	}
}
impl From<OrderStatus> for String {
	fn from(status: OrderStatus) -> Self {
		status.as_str().to_owned()
	}
}
impl Display for OrderStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// One marketplace order.
///
/// `paid_amount` is what the buyer paid and is never reconciled against the line items.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
	/// Marketplace order id (Shopee order serial number).
	pub order_id: String,
	/// Normalized status.
	pub status: OrderStatus,
	/// Creation instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	/// Amount paid by the buyer.
	pub paid_amount: f64,
	/// Shipping cost charged on the order; zero when the marketplace reports none.
	pub shipping_cost: f64,
	/// Shipment id (Mercado Libre) or package number (Shopee).
	pub shipping_reference: Option<String>,
	/// Purchased items.
	pub line_items: Vec<LineItem>,
}

/// One purchased item within an [`Order`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
	/// Listing id.
	pub item_id: String,
	/// Marketplace category, when reported.
	pub category_id: Option<String>,
	/// Units purchased.
	pub quantity: u32,
	/// Price per unit.
	pub unit_price: f64,
	/// Listing type (e.g. `gold_special`), when reported.
	pub listing_type: Option<String>,
	/// Marketplace fee charged for this line.
	pub sale_fee: f64,
	/// Seller SKU, when set.
	pub sku: Option<String>,
}
impl LineItem {
	/// `unit_price × quantity`.
	pub fn gross(&self) -> f64 {
		self.unit_price * f64::from(self.quantity)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn labels_from_both_marketplaces_normalize() {
		assert_eq!(OrderStatus::from_label("paid"), OrderStatus::Paid);
		assert_eq!(OrderStatus::from_label("READY_TO_SHIP"), OrderStatus::Paid);
		assert_eq!(OrderStatus::from_label("UNPAID"), OrderStatus::PaymentRequired);
		assert_eq!(OrderStatus::from_label("SHIPPED"), OrderStatus::Shipped);
		assert_eq!(OrderStatus::from_label("COMPLETED"), OrderStatus::Completed);
		assert_eq!(OrderStatus::from_label("cancelled"), OrderStatus::Cancelled);
		assert_eq!(OrderStatus::from_label("IN_CANCEL"), OrderStatus::Other("IN_CANCEL".into()));
	}

	#[test]
	fn status_serializes_as_its_label() {
		let json = serde_json::to_string(&OrderStatus::PaymentInProcess)
			.expect("Status should serialize.");

		assert_eq!(json, "\"payment_in_process\"");

		let parsed: OrderStatus =
			serde_json::from_str("\"confirmed\"").expect("Status should deserialize.");

		assert_eq!(parsed, OrderStatus::Confirmed);
	}
}
