//! The persisted marketplace credential, its lifecycle helpers, and builder.

// self
use crate::{
	_prelude::*,
	auth::{OwnerId, ProviderId, TokenSecret},
};

const DEFAULT_TOKEN_TYPE: &str = "bearer";

/// Lifecycle status for a credential at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialStatus {
	/// Access token may be sent as is.
	Active,
	/// Access token reached `expires_at` and must be refreshed.
	Expired,
}

/// Errors produced by [`CredentialBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CredentialBuilderError {
	/// No (or a blank) access token was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// No (or a blank) refresh token was provided.
	#[error("Refresh token is required.")]
	MissingRefreshToken,
	/// No expiry (absolute or relative) was configured.
	#[error("Expiry must be supplied via expires_at or expires_in.")]
	MissingExpiry,
}

/// Latest token pair issued for one marketplace connection.
///
/// Records are replaced wholesale on every exchange and never patched in place.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
	/// Provider that issued the tokens.
	pub provider: ProviderId,
	/// Seller or shop the tokens act for.
	pub owner_id: OwnerId,
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Refresh token secret used to mint the next access token.
	pub refresh_token: TokenSecret,
	/// Token type reported by the provider.
	#[serde(default = "default_token_type")]
	pub token_type: String,
	/// Space-delimited scopes reported by the provider, possibly empty.
	#[serde(default)]
	pub scope: String,
	/// Instant the exchange completed.
	#[serde(with = "time::serde::rfc3339")]
	pub issued_at: OffsetDateTime,
	/// Authoritative expiry used for refresh decisions.
	#[serde(with = "time::serde::rfc3339")]
	pub expires_at: OffsetDateTime,
}
impl Credential {
	/// Returns a builder for a credential owned by `owner_id` at `provider`.
	pub fn builder(provider: ProviderId, owner_id: OwnerId) -> CredentialBuilder {
		CredentialBuilder::new(provider, owner_id)
	}

	/// Both tokens are present, so the record can be reused or refreshed without a login.
	pub fn is_complete(&self) -> bool {
		!self.access_token.is_blank() && !self.refresh_token.is_blank()
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> CredentialStatus {
		if instant >= self.expires_at { CredentialStatus::Expired } else { CredentialStatus::Active }
	}

	/// Returns `true` if the credential has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), CredentialStatus::Expired)
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("provider", &self.provider)
			.field("owner_id", &self.owner_id)
			.field("access_token", &"<redacted>")
			.field("refresh_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("scope", &self.scope)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Builder for [`Credential`].
#[derive(Clone, Debug)]
pub struct CredentialBuilder {
	provider: ProviderId,
	owner_id: OwnerId,
	access_token: Option<TokenSecret>,
	refresh_token: Option<TokenSecret>,
	token_type: Option<String>,
	scope: String,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
}
impl CredentialBuilder {
	fn new(provider: ProviderId, owner_id: OwnerId) -> Self {
		Self {
			provider,
			owner_id,
			access_token: None,
			refresh_token: None,
			token_type: None,
			scope: String::new(),
			issued_at: None,
			expires_at: None,
			expires_in: None,
		}
	}

	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Overrides the token type (defaults to `bearer`).
	pub fn token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = Some(token_type.into());

		self
	}

	/// Sets the granted scope string.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = scope.into();

		self
	}

	/// Sets the issued-at instant.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a relative expiry duration from the issued instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Consumes the builder and produces a [`Credential`].
	pub fn build(self) -> Result<Credential, CredentialBuilderError> {
		let access_token = self
			.access_token
			.filter(|token| !token.is_blank())
			.ok_or(CredentialBuilderError::MissingAccessToken)?;
		let refresh_token = self
			.refresh_token
			.filter(|token| !token.is_blank())
			.ok_or(CredentialBuilderError::MissingRefreshToken)?;
		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let expires_at = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => instant,
			(None, Some(delta)) => issued_at + delta,
			(None, None) => return Err(CredentialBuilderError::MissingExpiry),
		};

		Ok(Credential {
			provider: self.provider,
			owner_id: self.owner_id,
			access_token,
			refresh_token,
			token_type: self.token_type.unwrap_or_else(default_token_type),
			scope: self.scope,
			issued_at,
			expires_at,
		})
	}
}

fn default_token_type() -> String {
	DEFAULT_TOKEN_TYPE.into()
}
