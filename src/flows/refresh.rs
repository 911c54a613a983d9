//! Refresh-token exchange for an expired credential.
//!
//! Exactly one exchange is made per expiry. The replacement is persisted before it is handed
//! back, so the in-memory slot and the store never disagree after a successful refresh.

mod metrics;

pub use metrics::ExchangeMetrics;

// self
use crate::{
	_prelude::*,
	auth::Credential,
	flows::{TokenBroker, TokenState},
	obs::{self, FlowKind},
};

impl TokenBroker {
	pub(crate) async fn refresh_credential(&self, current: &Credential) -> Result<Credential> {
		self.set_state(TokenState::Refreshing);
		self.metrics.record_attempt();

		let exchange = async {
			let refreshed = self.strategy.refresh(&self.http, current).await?;

			self.store.save(refreshed.clone()).await?;

			tracing::info!(
				provider = %refreshed.provider,
				owner = %refreshed.owner_id,
				expires_at = %refreshed.expires_at,
				"credential refreshed"
			);

			Ok(refreshed)
		};
		let result =
			obs::observe(FlowKind::Refresh, &current.provider, "refresh_credential", exchange).await;

		match &result {
			Ok(_) => self.metrics.record_refresh(),
			Err(_) => self.metrics.record_failure(),
		}

		result
	}
}
