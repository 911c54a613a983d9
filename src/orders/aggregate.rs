//! Financial totals over a set of orders.

// self
use crate::{_prelude::*, orders::Order};

/// Gross, fee, and net totals of a set of orders.
///
/// Serialized with the keys the HTTP facade has always returned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateTotals {
	/// Σ `unit_price × quantity` over every line item.
	#[serde(rename = "TotalBruto")]
	pub gross_total: f64,
	/// Σ `sale_fee` over every line item.
	#[serde(rename = "SaleFeeTotal")]
	pub fee_total: f64,
	/// `fee_total / gross_total`, or `0.0` when nothing was sold.
	///
	/// Shopee orders carry no fees, so Shopee periods always report `0.0` here.
	#[serde(rename = "MedianTax")]
	pub average_fee_rate: f64,
	/// `gross_total − fee_total`.
	#[serde(rename = "TotalLiquido")]
	pub net_total: f64,
}
impl AggregateTotals {
	/// Builds totals from raw sums, deriving net and rate.
	pub fn from_sums(gross_total: f64, fee_total: f64) -> Self {
		let average_fee_rate = if gross_total == 0.0 { 0.0 } else { fee_total / gross_total };

		Self { gross_total, fee_total, average_fee_rate, net_total: gross_total - fee_total }
	}

	/// Combines two totals; the rate is recomputed from the merged sums.
	pub fn merge(self, other: Self) -> Self {
		Self::from_sums(self.gross_total + other.gross_total, self.fee_total + other.fee_total)
	}
}

/// Sums every line item of `orders`. No status filtering happens here.
pub fn aggregate<'a, I>(orders: I) -> AggregateTotals
where
	I: IntoIterator<Item = &'a Order>,
{
	let (gross, fee) = orders
		.into_iter()
		.flat_map(|order| &order.line_items)
		.fold((0.0, 0.0), |(gross, fee), item| (gross + item.gross(), fee + item.sale_fee));

	AggregateTotals::from_sums(gross, fee)
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::orders::{LineItem, OrderStatus};

	fn item(quantity: u32, unit_price: f64, sale_fee: f64) -> LineItem {
		LineItem {
			item_id: "MLB1".into(),
			category_id: None,
			quantity,
			unit_price,
			listing_type: None,
			sale_fee,
			sku: None,
		}
	}

	fn order(id: &str, line_items: Vec<LineItem>) -> Order {
		Order {
			order_id: id.into(),
			status: OrderStatus::Paid,
			created_at: macros::datetime!(2025-02-21 10:00 UTC),
			paid_amount: 0.0,
			shipping_cost: 0.0,
			shipping_reference: None,
			line_items,
		}
	}

	#[test]
	fn aggregates_the_reference_example() {
		let orders = vec![order("1", vec![item(2, 10.0, 1.0)]), order("2", vec![item(1, 5.0, 0.5)])];
		let totals = aggregate(&orders);

		assert_eq!(totals.gross_total, 25.0);
		assert_eq!(totals.fee_total, 1.5);
		assert_eq!(totals.net_total, 23.5);
		assert!((totals.average_fee_rate - 0.06).abs() < 1e-12);
	}

	#[test]
	fn zero_gross_yields_zero_rate() {
		let totals = aggregate(&[order("1", vec![])]);

		assert_eq!(totals, AggregateTotals::default());
		assert_eq!(aggregate(&Vec::<Order>::new()).average_fee_rate, 0.0);
	}

	#[test]
	fn aggregation_is_linear_over_concatenation() {
		let a = vec![order("1", vec![item(3, 7.5, 2.0), item(1, 4.0, 0.25)])];
		let b = vec![order("2", vec![item(2, 12.0, 1.5)]), order("3", vec![item(5, 1.0, 0.0)])];
		let whole = aggregate(a.iter().chain(&b));
		let merged = aggregate(&a).merge(aggregate(&b));

		assert!((whole.gross_total - merged.gross_total).abs() < 1e-9);
		assert!((whole.fee_total - merged.fee_total).abs() < 1e-9);
		assert!((whole.net_total - merged.net_total).abs() < 1e-9);
		assert!((whole.average_fee_rate - merged.average_fee_rate).abs() < 1e-12);
	}

	#[test]
	fn serializes_with_facade_keys() {
		let json = serde_json::to_value(AggregateTotals::from_sums(25.0, 1.5))
			.expect("Totals should serialize.");

		assert_eq!(json["TotalBruto"], 25.0);
		assert_eq!(json["SaleFeeTotal"], 1.5);
		assert_eq!(json["TotalLiquido"], 23.5);
		assert!(json.get("MedianTax").is_some());
	}
}
