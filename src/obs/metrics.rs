// self
use crate::obs::{FlowKind, FlowOutcome};

/// Counts one flow outcome for `marketplace` via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, marketplace: &str, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"seller_ledger_flow_total",
			"flow" => kind.as_str(),
			"marketplace" => marketplace.to_owned(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, marketplace, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_flow_outcome_without_recorder_is_silent() {
		record_flow_outcome(FlowKind::OrderFetch, "shopee", FlowOutcome::Failure);
	}
}
