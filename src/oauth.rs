//! `oauth2` crate facade for providers whose token endpoint follows RFC 6749.
//!
//! Mercado Libre accepts form-encoded `authorization_code` and `refresh_token` grants with the
//! client secret in the request body and returns the seller id as an extra `user_id` field.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, Client, ClientId, ClientSecret, EndpointNotSet,
	EndpointSet, ExtraTokenFields, HttpClientError, RedirectUrl, RefreshToken, RequestTokenError,
	StandardRevocableToken, StandardTokenResponse, TokenResponse, TokenUrl,
	basic::{
		BasicErrorResponse, BasicRequestTokenError, BasicRevocationErrorResponse,
		BasicTokenIntrospectionResponse, BasicTokenType,
	},
};
// self
use crate::{
	_prelude::*,
	auth::{Credential, OwnerId},
	error::{AuthError, ConfigError, DecodeError, TransportError, body_preview},
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot},
	provider::{ClientCredentials, GrantType, ProviderDescriptor},
};

type OwnerTokenResponse = StandardTokenResponse<OwnerFields, BasicTokenType>;
type ConfiguredClient = Client<
	BasicErrorResponse,
	OwnerTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	EndpointSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointSet,
>;

/// Extra token response fields carrying the account owner.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OwnerFields {
	/// Seller id; numeric on the wire but kept loosely typed.
	#[serde(default)]
	pub user_id: Option<serde_json::Value>,
}
impl OwnerFields {
	fn owner(&self) -> Option<String> {
		match self.user_id.as_ref()? {
			serde_json::Value::Number(n) => Some(n.to_string()),
			serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
			_ => None,
		}
	}
}
impl ExtraTokenFields for OwnerFields {}

/// Token-endpoint client bound to one descriptor and grant.
pub(crate) struct BasicFacade<'a> {
	oauth_client: ConfiguredClient,
	descriptor: &'a ProviderDescriptor,
	http_client: &'a ReqwestHttpClient,
}
impl<'a> BasicFacade<'a> {
	pub(crate) fn from_descriptor(
		descriptor: &'a ProviderDescriptor,
		credentials: &ClientCredentials,
		grant: GrantType,
		http_client: &'a ReqwestHttpClient,
	) -> Result<Self> {
		let token_endpoint = match grant {
			GrantType::AuthorizationCode => &descriptor.endpoints.token,
			GrantType::RefreshToken => &descriptor.endpoints.refresh,
		};
		let auth_url = AuthUrl::new(descriptor.endpoints.authorization.to_string())
			.map_err(ConfigError::from)?;
		let token_url = TokenUrl::new(token_endpoint.to_string()).map_err(ConfigError::from)?;
		let redirect_url =
			RedirectUrl::new(credentials.redirect_uri.to_string()).map_err(ConfigError::from)?;
		let oauth_client = Client::new(ClientId::new(credentials.client_id.clone()))
			.set_client_secret(ClientSecret::new(credentials.client_secret.expose().to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_redirect_uri(redirect_url)
			.set_auth_type(AuthType::RequestBody);

		Ok(Self { oauth_client, descriptor, http_client })
	}

	/// Exchanges an authorization code for the first credential.
	pub(crate) async fn exchange_code(&self, code: &str) -> Result<Credential> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone());
		let response = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.request_async(&instrumented)
			.await
			.map_err(|err| self.map_request_error(GrantType::AuthorizationCode, meta.take(), err))?;
		let owner = response
			.extra_fields()
			.owner()
			.ok_or(AuthError::IncompleteResponse { field: "user_id" })?;

		self.credential_from(response, owner, None)
	}

	/// Exchanges the refresh token of `current`, keeping it when no replacement is issued.
	pub(crate) async fn refresh(&self, current: &Credential) -> Result<Credential> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone());
		let refresh_secret = RefreshToken::new(current.refresh_token.expose().to_owned());
		let response = self
			.oauth_client
			.exchange_refresh_token(&refresh_secret)
			.request_async(&instrumented)
			.await
			.map_err(|err| self.map_request_error(GrantType::RefreshToken, meta.take(), err))?;
		let owner = response.extra_fields().owner().unwrap_or_else(|| current.owner_id.to_string());

		self.credential_from(response, owner, Some(current))
	}

	fn credential_from(
		&self,
		response: OwnerTokenResponse,
		owner: String,
		previous: Option<&Credential>,
	) -> Result<Credential> {
		let expires_in = response
			.expires_in()
			.ok_or(AuthError::IncompleteResponse { field: "expires_in" })?
			.as_secs();
		let expires_in = i64::try_from(expires_in)
			.ok()
			.filter(|secs| *secs > 0)
			.ok_or(AuthError::IncompleteResponse { field: "expires_in" })?;
		let owner_id =
			OwnerId::new(owner).map_err(|_| AuthError::IncompleteResponse { field: "user_id" })?;
		let scope = response
			.scopes()
			.map(|scopes| scopes.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(" "))
			.or_else(|| previous.map(|p| p.scope.clone()))
			.unwrap_or_default();
		let refresh = response
			.refresh_token()
			.map(|token| token.secret().to_owned())
			.or_else(|| previous.map(|p| p.refresh_token.expose().to_owned()))
			.ok_or(AuthError::IncompleteResponse { field: "refresh_token" })?;

		Credential::builder(self.descriptor.id.clone(), owner_id)
			.access_token(response.access_token().secret().to_owned())
			.refresh_token(refresh)
			.token_type(response.token_type().as_ref())
			.scope(scope)
			.issued_at(OffsetDateTime::now_utc())
			.expires_in(Duration::seconds(expires_in))
			.build()
			.map_err(|e| ConfigError::from(e).into())
	}

	fn map_request_error(
		&self,
		grant: GrantType,
		meta: Option<ResponseMetadata>,
		err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
	) -> Error {
		let status = meta.and_then(|m| m.status);
		let rejected = |body: String| -> Error {
			AuthError::Rejected {
				provider: self.descriptor.id.to_string(),
				grant: grant.as_str(),
				status,
				body,
			}
			.into()
		};

		match err {
			RequestTokenError::ServerResponse(response) => {
				let body = match response.error_description() {
					Some(description) => format!("{}: {description}", response.error().as_ref()),
					None => response.error().as_ref().to_owned(),
				};

				rejected(body)
			},
			RequestTokenError::Parse(source, body) => match status {
				Some(code) if !(200..300).contains(&code) => rejected(body_preview(&body)),
				_ => DecodeError::Json { context: "token response", source }.into(),
			},
			RequestTokenError::Request(error) => map_transport_error(error),
			RequestTokenError::Other(message) => rejected(message),
		}
	}
}

fn map_transport_error(err: HttpClientError<ReqwestError>) -> Error {
	match err {
		HttpClientError::Reqwest(inner) => TransportError::from(*inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Http(inner) => TransportError::network(inner).into(),
		HttpClientError::Other(message) =>
			TransportError::network(std::io::Error::other(message)).into(),
		_ => TransportError::network(std::io::Error::other("unknown HTTP client error")).into(),
	}
}
