//! Pretty-printed JSON dump of an assembled order set.

// std
use std::{fs, path::Path};
// self
use crate::{_prelude::*, orders::Order, store::StoreError};

/// File the assembled order set is written to unless another path is configured.
pub const DEFAULT_SNAPSHOT_FILE: &str = "all_orders.json";

/// Writes `orders` to `path`, replacing any previous snapshot.
pub fn write_snapshot(path: &Path, orders: &[Order]) -> Result<()> {
	let serialized = serde_json::to_vec_pretty(orders).map_err(|e| StoreError::Serialization {
		message: format!("Failed to serialize order snapshot: {e}"),
	})?;

	fs::write(path, serialized).map_err(|e| StoreError::Backend {
		message: format!("Failed to write {}: {e}", path.display()),
	})?;

	tracing::debug!(path = %path.display(), orders = orders.len(), "order snapshot written");

	Ok(())
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::orders::OrderStatus;

	#[test]
	fn snapshot_is_overwritten_and_reloadable() {
		let path = env::temp_dir().join(format!("seller_ledger_snapshot_{}.json", process::id()));
		let order = Order {
			order_id: "2000001".into(),
			status: OrderStatus::Paid,
			created_at: macros::datetime!(2025-02-21 10:00 UTC),
			paid_amount: 25.0,
			shipping_cost: 0.0,
			shipping_reference: None,
			line_items: Vec::new(),
		};

		write_snapshot(&path, &[order.clone(), order.clone()]).expect("First snapshot should write.");
		write_snapshot(&path, &[order.clone()]).expect("Second snapshot should write.");

		let reloaded: Vec<Order> = serde_json::from_slice(
			&fs::read(&path).expect("Snapshot should be readable."),
		)
		.expect("Snapshot should deserialize.");

		assert_eq!(reloaded, vec![order]);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary snapshot {}: {e}", path.display())
		});
	}
}
