//! Observability helpers for ledger flows.
//!
//! Spans are named `seller_ledger.flow` and carry the `flow` (token grant or listing),
//! `marketplace`, and `stage` (call site) fields. Enable the `metrics` feature to increment the
//! `seller_ledger_flow_total` counter for every attempt/success/failure, labeled by `flow`,
//! `marketplace`, and `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Flow kinds observed by the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Interactive authorization-code exchange.
	AuthorizationCode,
	/// Refresh-token exchange.
	Refresh,
	/// Paginated order listing.
	OrderFetch,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::AuthorizationCode => "authorization_code",
			FlowKind::Refresh => "refresh",
			FlowKind::OrderFetch => "order_fetch",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside a flow span for `marketplace`, recording attempt and final outcome.
pub async fn observe<T, Fut>(
	kind: FlowKind,
	marketplace: &str,
	stage: &'static str,
	fut: Fut,
) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = FlowSpan::new(kind, marketplace, stage);

	record_flow_outcome(kind, marketplace, FlowOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_flow_outcome(kind, marketplace, FlowOutcome::Success),
		Err(e) => {
			::tracing::warn!(flow = kind.as_str(), marketplace, stage, error = %e, "flow failed");
			record_flow_outcome(kind, marketplace, FlowOutcome::Failure);
		},
	}

	result
}
