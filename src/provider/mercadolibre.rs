//! Mercado Libre: standard OAuth 2.0 token endpoint plus bearer-authenticated API calls.

// crates.io
use reqwest::header::{AUTHORIZATION, HeaderValue};
// self
use crate::{
	_prelude::*,
	auth::{Credential, ProviderId},
	error::{ConfigError, TransportError},
	http::ReqwestHttpClient,
	oauth::BasicFacade,
	provider::{
		AuthorizationCallback, ClientCredentials, ExchangeFuture, GrantType, ProviderDescriptor,
		ProviderStrategy,
	},
};

/// Provider identifier used in descriptors and credential files.
pub const PROVIDER_ID: &str = "mercadolibre";

const AUTHORIZATION_ENDPOINT: &str = "https://auth.mercadolivre.com.br/authorization";
const TOKEN_ENDPOINT: &str = "https://api.mercadolibre.com/oauth/token";
const API_BASE: &str = "https://api.mercadolibre.com";

/// Mercado Libre strategy.
#[derive(Clone, Debug)]
pub struct MercadoLibre {
	descriptor: ProviderDescriptor,
	credentials: ClientCredentials,
}
impl MercadoLibre {
	/// Creates a strategy for `descriptor` using the registered application credentials.
	pub fn new(descriptor: ProviderDescriptor, credentials: ClientCredentials) -> Self {
		Self { descriptor, credentials }
	}

	/// Production endpoints (Brazil authorization site).
	pub fn default_descriptor() -> Result<ProviderDescriptor, ConfigError> {
		Ok(ProviderDescriptor::builder(ProviderId::new(PROVIDER_ID)?)
			.authorization_endpoint(Url::parse(AUTHORIZATION_ENDPOINT)?)
			.token_endpoint(Url::parse(TOKEN_ENDPOINT)?)
			.api_base(Url::parse(API_BASE)?)
			.build()?)
	}
}
impl ProviderStrategy for MercadoLibre {
	fn descriptor(&self) -> &ProviderDescriptor {
		&self.descriptor
	}

	fn authorization_url(&self, state: &str, _now: OffsetDateTime) -> Result<Url> {
		let mut url = self.descriptor.endpoints.authorization.clone();

		url.query_pairs_mut()
			.append_pair("response_type", "code")
			.append_pair("client_id", &self.credentials.client_id)
			.append_pair("redirect_uri", self.credentials.redirect_uri.as_str())
			.append_pair("state", state);

		Ok(url)
	}

	fn exchange_code<'a>(
		&'a self,
		http: &'a ReqwestHttpClient,
		callback: &'a AuthorizationCallback,
	) -> ExchangeFuture<'a> {
		Box::pin(async move {
			BasicFacade::from_descriptor(
				&self.descriptor,
				&self.credentials,
				GrantType::AuthorizationCode,
				http,
			)?
			.exchange_code(&callback.code)
			.await
		})
	}

	fn refresh<'a>(
		&'a self,
		http: &'a ReqwestHttpClient,
		current: &'a Credential,
	) -> ExchangeFuture<'a> {
		Box::pin(async move {
			BasicFacade::from_descriptor(
				&self.descriptor,
				&self.credentials,
				GrantType::RefreshToken,
				http,
			)?
			.refresh(current)
			.await
		})
	}

	fn sign_request(
		&self,
		request: &mut ReqwestRequest,
		credential: &Credential,
		_now: OffsetDateTime,
	) -> Result<()> {
		let mut value =
			HeaderValue::from_str(&format!("Bearer {}", credential.access_token.expose()))
				.map_err(TransportError::network)?;

		value.set_sensitive(true);
		request.headers_mut().insert(AUTHORIZATION, value);

		Ok(())
	}
}
