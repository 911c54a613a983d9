//! Token lifecycle: load, authorize, refresh, persist.
//!
//! [`TokenBroker`] owns the single credential of one marketplace connection. Callers ask it
//! for a usable access token; the broker decides whether the stored record can be reused,
//! needs a refresh, or requires the seller to authorize the application again.

pub mod authorize;
pub mod refresh;

pub use authorize::*;
pub use refresh::*;

// self
use crate::{
	_prelude::*,
	auth::{Credential, TokenSecret},
	error::AuthError,
	http::ReqwestHttpClient,
	provider::ProviderStrategy,
	store::CredentialStore,
};

/// Observable lifecycle state of a [`TokenBroker`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenState {
	/// Nothing has been requested yet.
	Uninitialized,
	/// Reading the credential store.
	Loading,
	/// A usable credential is cached.
	Authorized,
	/// Waiting for the seller to approve access and paste the redirect URL.
	AwaitingUserAction,
	/// Exchanging the refresh token.
	Refreshing,
	/// The last attempt failed; the next call starts over from the cached slot.
	Unrecoverable,
}

/// Single-flight owner of one marketplace credential.
///
/// The credential slot sits behind an async mutex, so concurrent callers share one load,
/// authorization, or refresh instead of racing the provider.
pub struct TokenBroker {
	strategy: Arc<dyn ProviderStrategy>,
	store: Arc<dyn CredentialStore>,
	prompt: Option<Arc<dyn AuthorizationPrompt>>,
	http: ReqwestHttpClient,
	slot: AsyncMutex<Option<Credential>>,
	state: Mutex<TokenState>,
	metrics: Arc<ExchangeMetrics>,
	refresh_margin: Duration,
	reauthorize_on_rejection: bool,
}
impl TokenBroker {
	/// Creates a broker without an interactive prompt.
	pub fn new(
		strategy: Arc<dyn ProviderStrategy>,
		store: Arc<dyn CredentialStore>,
		http: ReqwestHttpClient,
	) -> Self {
		Self {
			strategy,
			store,
			prompt: None,
			http,
			slot: AsyncMutex::new(None),
			state: Mutex::new(TokenState::Uninitialized),
			metrics: Default::default(),
			refresh_margin: Duration::ZERO,
			reauthorize_on_rejection: false,
		}
	}

	/// Attaches the prompt used when no reusable credential exists.
	pub fn with_prompt(mut self, prompt: Arc<dyn AuthorizationPrompt>) -> Self {
		self.prompt = Some(prompt);

		self
	}

	/// Refreshes this long before `expires_at` (defaults to zero).
	pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
		self.refresh_margin = if margin.is_negative() { Duration::ZERO } else { margin };

		self
	}

	/// Falls back to interactive authorization when the provider rejects a refresh token.
	pub fn with_reauthorize_on_rejection(mut self, enabled: bool) -> Self {
		self.reauthorize_on_rejection = enabled;

		self
	}

	/// Strategy used for exchanges and request signing.
	pub fn strategy(&self) -> &Arc<dyn ProviderStrategy> {
		&self.strategy
	}

	/// HTTP client shared with the token endpoints.
	pub fn http_client(&self) -> &ReqwestHttpClient {
		&self.http
	}

	/// Exchange counters.
	pub fn metrics(&self) -> &Arc<ExchangeMetrics> {
		&self.metrics
	}

	/// Current lifecycle state.
	pub fn state(&self) -> TokenState {
		*self.state.lock()
	}

	/// Returns a currently valid access token.
	pub async fn access_token(&self) -> Result<TokenSecret> {
		Ok(self.credential().await?.access_token)
	}

	/// Returns the full credential, loading, authorizing, or refreshing it first when needed.
	pub async fn credential(&self) -> Result<Credential> {
		let mut slot = self.slot.lock().await;

		if slot.is_none() {
			self.set_state(TokenState::Loading);

			*slot = self.load_stored().await;
		}

		let now = OffsetDateTime::now_utc();
		let credential = match slot.as_ref() {
			Some(current) if !current.is_expired_at(now + self.refresh_margin) => current.clone(),
			Some(current) => match self.refresh_credential(current).await {
				Ok(refreshed) => refreshed,
				Err(e) if self.reauthorize_on_rejection && is_rejection(&e) => {
					tracing::warn!(error = %e, "refresh rejected, falling back to authorization");

					self.authorize_interactively().await.map_err(|e| self.fail(e))?
				},
				Err(e) => return Err(self.fail(e)),
			},
			None => self.authorize_interactively().await.map_err(|e| self.fail(e))?,
		};

		*slot = Some(credential.clone());

		self.set_state(TokenState::Authorized);

		Ok(credential)
	}

	async fn load_stored(&self) -> Option<Credential> {
		let provider = &self.strategy.descriptor().id;

		match self.store.load().await {
			Ok(Some(credential)) if credential.provider != *provider => {
				tracing::warn!(
					stored = %credential.provider,
					%provider,
					"stored credential belongs to another provider"
				);

				None
			},
			Ok(Some(credential)) if !credential.is_complete() => {
				tracing::warn!(%provider, "stored credential is incomplete");

				None
			},
			Ok(credential) => credential,
			Err(e) => {
				tracing::warn!(%provider, error = %e, "stored credential is unreadable");

				None
			},
		}
	}

	fn set_state(&self, state: TokenState) {
		*self.state.lock() = state;
	}

	fn fail(&self, error: Error) -> Error {
		self.set_state(TokenState::Unrecoverable);

		error
	}
}
impl Debug for TokenBroker {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenBroker")
			.field("provider", &self.strategy.descriptor().id)
			.field("state", &self.state())
			.field("prompt_set", &self.prompt.is_some())
			.field("refresh_margin", &self.refresh_margin)
			.field("reauthorize_on_rejection", &self.reauthorize_on_rejection)
			.finish()
	}
}

fn is_rejection(error: &Error) -> bool {
	matches!(error, Error::Auth(AuthError::Rejected { .. }))
}
