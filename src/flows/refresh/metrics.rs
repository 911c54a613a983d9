// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for token exchanges performed by a broker.
#[derive(Debug, Default)]
pub struct ExchangeMetrics {
	attempts: AtomicU64,
	authorizations: AtomicU64,
	refreshes: AtomicU64,
	failures: AtomicU64,
}
impl ExchangeMetrics {
	/// Returns the total number of exchange attempts (code and refresh).
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of successful authorization-code exchanges.
	pub fn authorizations(&self) -> u64 {
		self.authorizations.load(Ordering::Relaxed)
	}

	/// Returns the number of successful refresh exchanges.
	pub fn refreshes(&self) -> u64 {
		self.refreshes.load(Ordering::Relaxed)
	}

	/// Returns the number of failed exchanges.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_authorization(&self) {
		self.authorizations.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh(&self) {
		self.refreshes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}
}
