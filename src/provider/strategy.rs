//! Provider strategy hooks used by the token broker and the authenticated fetcher.
//!
//! A strategy owns everything marketplace-specific about authentication: the authorize URL,
//! the callback rules, both token exchanges, and how an API request is authenticated. Flows
//! and fetchers stay marketplace agnostic.

// self
use crate::{
	_prelude::*,
	auth::Credential,
	error::AuthError,
	http::ReqwestHttpClient,
	provider::ProviderDescriptor,
};

/// Future returned by [`ProviderStrategy`] token exchanges.
pub type ExchangeFuture<'a> = Pin<Box<dyn Future<Output = Result<Credential>> + 'a + Send>>;

/// Parameters extracted from the redirect URL the seller lands on after granting access.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationCallback {
	/// Authorization code to exchange.
	pub code: String,
	/// Shop the seller authorized (Shopee only).
	pub shop_id: Option<String>,
	/// Echoed `state`, when the provider returns one.
	pub state: Option<String>,
}
impl AuthorizationCallback {
	/// Parses a pasted redirect URL.
	pub fn parse(input: &str) -> Result<Self, AuthError> {
		let url = Url::parse(input.trim()).map_err(|e| AuthError::InvalidCallback {
			reason: format!("pasted value is not a URL ({e})"),
		})?;
		let mut code = None;
		let mut shop_id = None;
		let mut state = None;

		for (key, value) in url.query_pairs() {
			let value = value.trim();

			if value.is_empty() {
				continue;
			}

			match key.as_ref() {
				"code" => code = Some(value.to_owned()),
				"shop_id" => shop_id = Some(value.to_owned()),
				"state" => state = Some(value.to_owned()),
				_ => {},
			}
		}

		let code = code.ok_or_else(|| AuthError::InvalidCallback {
			reason: "redirect URL has no `code` parameter".into(),
		})?;

		Ok(Self { code, shop_id, state })
	}
}

/// Marketplace-specific authentication behavior.
pub trait ProviderStrategy: Send + Sync {
	/// Endpoints the strategy talks to.
	fn descriptor(&self) -> &ProviderDescriptor;

	/// Builds the page URL the seller opens to grant access.
	fn authorization_url(&self, state: &str, now: OffsetDateTime) -> Result<Url>;

	/// Checks a parsed callback before its code is exchanged.
	///
	/// The default requires the callback to echo the `state` that was sent; a missing `state`
	/// counts as a mismatch whenever one was issued.
	fn validate_callback(&self, callback: &AuthorizationCallback, expected_state: &str) -> Result<()> {
		match callback.state.as_deref() {
			Some(state) if state == expected_state => Ok(()),
			None if expected_state.is_empty() => Ok(()),
			_ => Err(AuthError::StateMismatch.into()),
		}
	}

	/// Exchanges the callback's authorization code for the first credential.
	fn exchange_code<'a>(
		&'a self,
		http: &'a ReqwestHttpClient,
		callback: &'a AuthorizationCallback,
	) -> ExchangeFuture<'a>;

	/// Exchanges the refresh token of `current` for a replacement credential.
	fn refresh<'a>(&'a self, http: &'a ReqwestHttpClient, current: &'a Credential)
	-> ExchangeFuture<'a>;

	/// Authenticates an outgoing API request with `credential`.
	fn sign_request(
		&self,
		request: &mut ReqwestRequest,
		credential: &Credential,
		now: OffsetDateTime,
	) -> Result<()>;
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn callback_parse_extracts_code_shop_and_state() {
		let callback = AuthorizationCallback::parse(
			" https://app.example.com/callback?code=TG-abc&shop_id=998877&state=xyz\n",
		)
		.expect("Callback should parse.");

		assert_eq!(callback.code, "TG-abc");
		assert_eq!(callback.shop_id.as_deref(), Some("998877"));
		assert_eq!(callback.state.as_deref(), Some("xyz"));
	}

	#[test]
	fn callback_parse_requires_a_url_with_code() {
		assert!(matches!(
			AuthorizationCallback::parse("TG-abc"),
			Err(AuthError::InvalidCallback { .. })
		));
		assert!(matches!(
			AuthorizationCallback::parse("https://app.example.com/callback?code="),
			Err(AuthError::InvalidCallback { .. })
		));
	}
}
