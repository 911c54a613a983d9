//! Shopee Open Platform v2: signed JSON token calls and signed shop-level queries.
//!
//! Shopee does not follow RFC 6749. Token calls are JSON `POST`s whose query carries
//! `partner_id`, `timestamp`, and `sign`, and failures may arrive as `200 OK` with a
//! non-empty `error` field. The credential owner is the authorized shop.

// self
use crate::{
	_prelude::*,
	auth::{Credential, OwnerId, ProviderId},
	error::{AuthError, ConfigError, DecodeError, TransportError, body_preview, decode_json},
	http::ReqwestHttpClient,
	provider::{
		AuthorizationCallback, ClientCredentials, ExchangeFuture, GrantType, ProviderDescriptor,
		ProviderStrategy, signing,
	},
};

/// Provider identifier used in descriptors and credential files.
pub const PROVIDER_ID: &str = "shopee";

const API_BASE: &str = "https://partner.shopeemobile.com";
const AUTHORIZATION_PATH: &str = "/api/v2/shop/auth_partner";
const TOKEN_PATH: &str = "/api/v2/auth/token/get";
const REFRESH_PATH: &str = "/api/v2/auth/access_token/get";

/// Shopee strategy.
#[derive(Clone, Debug)]
pub struct Shopee {
	descriptor: ProviderDescriptor,
	credentials: ClientCredentials,
	partner_id: i64,
}
impl Shopee {
	/// Creates a strategy; `credentials.client_id` must be the numeric partner id.
	pub fn new(
		descriptor: ProviderDescriptor,
		credentials: ClientCredentials,
	) -> Result<Self, ConfigError> {
		let partner_id = credentials.client_id.trim().parse::<i64>().map_err(|e| {
			ConfigError::InvalidEnvVar { name: "APP_ID_SHP", reason: e.to_string() }
		})?;

		Ok(Self { descriptor, credentials, partner_id })
	}

	/// Production endpoints.
	pub fn default_descriptor() -> Result<ProviderDescriptor, ConfigError> {
		Self::descriptor_at(Url::parse(API_BASE)?)
	}

	/// Endpoints rooted at `base`, which hosts both the token and the shop APIs.
	pub fn descriptor_at(base: Url) -> Result<ProviderDescriptor, ConfigError> {
		Ok(ProviderDescriptor::builder(ProviderId::new(PROVIDER_ID)?)
			.authorization_endpoint(base.join(AUTHORIZATION_PATH)?)
			.token_endpoint(base.join(TOKEN_PATH)?)
			.refresh_endpoint(base.join(REFRESH_PATH)?)
			.api_base(base)
			.build()?)
	}

	/// Numeric partner id.
	pub fn partner_id(&self) -> i64 {
		self.partner_id
	}

	fn sign(&self, base: &str) -> Result<String> {
		Ok(signing::signature(self.credentials.client_secret.expose().as_bytes(), base)?)
	}

	fn signed_token_url(&self, endpoint: &Url, timestamp: i64) -> Result<Url> {
		let sign =
			self.sign(&signing::base_string(self.partner_id, endpoint.path(), timestamp, None))?;
		let mut url = endpoint.clone();

		url.query_pairs_mut()
			.append_pair("partner_id", &self.partner_id.to_string())
			.append_pair("timestamp", &timestamp.to_string())
			.append_pair("sign", &sign);

		Ok(url)
	}

	async fn post_token(
		&self,
		http: &ReqwestHttpClient,
		grant: GrantType,
		body: serde_json::Value,
	) -> Result<TokenResponse> {
		let endpoint = match grant {
			GrantType::AuthorizationCode => &self.descriptor.endpoints.token,
			GrantType::RefreshToken => &self.descriptor.endpoints.refresh,
		};
		let url = self.signed_token_url(endpoint, OffsetDateTime::now_utc().unix_timestamp())?;
		let response = http.post(url).json(&body).send().await.map_err(TransportError::from)?;
		let status = response.status().as_u16();
		let bytes = response.bytes().await.map_err(TransportError::from)?;
		let rejected = |body: String| AuthError::Rejected {
			provider: self.descriptor.id.to_string(),
			grant: grant.as_str(),
			status: Some(status),
			body,
		};

		if !(200..300).contains(&status) {
			return Err(rejected(body_preview(&bytes)).into());
		}

		let token: TokenResponse = decode_json("token response", &bytes)?;

		if !token.error.is_empty() {
			return Err(rejected(format!("{}: {}", token.error, token.message)).into());
		}

		Ok(token)
	}

	fn credential_from(
		&self,
		token: TokenResponse,
		fallback_owner: &str,
		previous: Option<&Credential>,
	) -> Result<Credential> {
		if token.expire_in <= 0 {
			return Err(AuthError::IncompleteResponse { field: "expire_in" }.into());
		}

		let owner = token
			.shop_id_list
			.first()
			.copied()
			.or(token.shop_id.filter(|id| *id > 0))
			.map(|id| id.to_string())
			.unwrap_or_else(|| fallback_owner.to_owned());
		let owner_id =
			OwnerId::new(owner).map_err(|_| AuthError::IncompleteResponse { field: "shop_id" })?;
		let refresh_token = if token.refresh_token.is_empty() {
			previous
				.map(|p| p.refresh_token.expose().to_owned())
				.ok_or(AuthError::IncompleteResponse { field: "refresh_token" })?
		} else {
			token.refresh_token
		};

		if token.access_token.is_empty() {
			return Err(AuthError::IncompleteResponse { field: "access_token" }.into());
		}

		Credential::builder(self.descriptor.id.clone(), owner_id)
			.access_token(token.access_token)
			.refresh_token(refresh_token)
			.token_type("bearer")
			.issued_at(OffsetDateTime::now_utc())
			.expires_in(Duration::seconds(token.expire_in))
			.build()
			.map_err(|e| ConfigError::from(e).into())
	}
}
impl ProviderStrategy for Shopee {
	fn descriptor(&self) -> &ProviderDescriptor {
		&self.descriptor
	}

	fn authorization_url(&self, _state: &str, now: OffsetDateTime) -> Result<Url> {
		let endpoint = &self.descriptor.endpoints.authorization;
		let timestamp = now.unix_timestamp();
		let sign =
			self.sign(&signing::base_string(self.partner_id, endpoint.path(), timestamp, None))?;
		let mut url = endpoint.clone();

		url.query_pairs_mut()
			.append_pair("partner_id", &self.partner_id.to_string())
			.append_pair("redirect", self.credentials.redirect_uri.as_str())
			.append_pair("timestamp", &timestamp.to_string())
			.append_pair("sign", &sign);

		Ok(url)
	}

	fn validate_callback(&self, callback: &AuthorizationCallback, _expected_state: &str) -> Result<()> {
		match callback.shop_id.as_deref().map(str::parse::<i64>) {
			Some(Ok(_)) => Ok(()),
			Some(Err(_)) =>
				Err(AuthError::InvalidCallback { reason: "`shop_id` is not numeric".into() }.into()),
			None => Err(AuthError::InvalidCallback {
				reason: "redirect URL has no `shop_id` parameter".into(),
			}
			.into()),
		}
	}

	fn exchange_code<'a>(
		&'a self,
		http: &'a ReqwestHttpClient,
		callback: &'a AuthorizationCallback,
	) -> ExchangeFuture<'a> {
		Box::pin(async move {
			let shop = callback.shop_id.as_deref().unwrap_or_default();
			let shop_id = shop.parse::<i64>().map_err(|_| AuthError::InvalidCallback {
				reason: "`shop_id` is missing or not numeric".into(),
			})?;
			let body = serde_json::json!({
				"code": callback.code,
				"shop_id": shop_id,
				"partner_id": self.partner_id,
			});
			let token = self.post_token(http, GrantType::AuthorizationCode, body).await?;

			self.credential_from(token, shop, None)
		})
	}

	fn refresh<'a>(
		&'a self,
		http: &'a ReqwestHttpClient,
		current: &'a Credential,
	) -> ExchangeFuture<'a> {
		Box::pin(async move {
			let shop_id = shop_id_of(current)?;
			let body = serde_json::json!({
				"refresh_token": current.refresh_token.expose(),
				"shop_id": shop_id,
				"partner_id": self.partner_id,
			});
			let token = self.post_token(http, GrantType::RefreshToken, body).await?;

			self.credential_from(token, &current.owner_id, Some(current))
		})
	}

	fn sign_request(
		&self,
		request: &mut ReqwestRequest,
		credential: &Credential,
		now: OffsetDateTime,
	) -> Result<()> {
		let shop_id = shop_id_of(credential)?;
		let timestamp = now.unix_timestamp();
		let access_token = credential.access_token.expose();
		let sign = self.sign(&signing::base_string(
			self.partner_id,
			request.url().path(),
			timestamp,
			Some((access_token, shop_id)),
		))?;

		request
			.url_mut()
			.query_pairs_mut()
			.append_pair("partner_id", &self.partner_id.to_string())
			.append_pair("timestamp", &timestamp.to_string())
			.append_pair("access_token", access_token)
			.append_pair("shop_id", &shop_id.to_string())
			.append_pair("sign", &sign);

		Ok(())
	}
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
	#[serde(default)]
	access_token: String,
	#[serde(default)]
	refresh_token: String,
	#[serde(default)]
	expire_in: i64,
	#[serde(default)]
	shop_id_list: Vec<i64>,
	#[serde(default)]
	shop_id: Option<i64>,
	#[serde(default)]
	error: String,
	#[serde(default)]
	message: String,
}

fn shop_id_of(credential: &Credential) -> Result<i64> {
	i64::try_from(credential.owner_id.as_u64())
		.map_err(|_| DecodeError::InvalidField { context: "stored credential", field: "owner_id" }.into())
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashMap;
	// crates.io
	use reqwest::Method;
	use time::macros;
	// self
	use super::*;
	use crate::auth::TokenSecret;

	fn strategy() -> Shopee {
		Shopee::new(
			Shopee::default_descriptor().expect("Default descriptor should build."),
			ClientCredentials {
				client_id: "2001887".into(),
				client_secret: TokenSecret::new("partner-key"),
				redirect_uri: Url::parse("https://app.example.com/shopee").expect("URL."),
			},
		)
		.expect("Strategy should build.")
	}

	#[test]
	fn partner_id_must_be_numeric() {
		let err = Shopee::new(
			Shopee::default_descriptor().expect("Default descriptor should build."),
			ClientCredentials {
				client_id: "partner".into(),
				client_secret: TokenSecret::new("k"),
				redirect_uri: Url::parse("https://app.example.com/shopee").expect("URL."),
			},
		)
		.expect_err("Non-numeric partner id must be rejected.");

		assert!(matches!(err, ConfigError::InvalidEnvVar { name: "APP_ID_SHP", .. }));
	}

	#[test]
	fn authorization_url_is_signed_over_the_auth_partner_path() {
		let now = macros::datetime!(2025-03-21 12:00 UTC);
		let url = strategy().authorization_url("ignored", now).expect("Authorize URL should build.");
		let query = url.query_pairs().into_owned().collect::<HashMap<_, _>>();
		let expected = signing::signature(
			b"partner-key",
			&signing::base_string(2001887, AUTHORIZATION_PATH, now.unix_timestamp(), None),
		)
		.expect("Signing should succeed.");

		assert_eq!(url.path(), AUTHORIZATION_PATH);
		assert_eq!(query["partner_id"], "2001887");
		assert_eq!(query["redirect"], "https://app.example.com/shopee");
		assert_eq!(query["timestamp"], now.unix_timestamp().to_string());
		assert_eq!(query["sign"], expected);
	}

	#[test]
	fn callback_requires_a_numeric_shop_id() {
		let strategy = strategy();
		let mut callback =
			AuthorizationCallback { code: "c0de".into(), shop_id: None, state: None };

		assert!(strategy.validate_callback(&callback, "").is_err());

		callback.shop_id = Some("abc".into());

		assert!(strategy.validate_callback(&callback, "").is_err());

		callback.shop_id = Some("998877".into());

		assert!(strategy.validate_callback(&callback, "").is_ok());
	}

	#[test]
	fn sign_request_appends_shop_query_parameters() {
		let now = macros::datetime!(2025-03-21 12:00 UTC);
		let credential = Credential::builder(
			ProviderId::new(PROVIDER_ID).expect("Provider fixture should be valid."),
			OwnerId::new("998877").expect("Owner fixture should be valid."),
		)
		.access_token("shp-access")
		.refresh_token("shp-refresh")
		.expires_in(Duration::hours(4))
		.build()
		.expect("Credential fixture should build.");
		let mut request = ReqwestRequest::new(
			Method::GET,
			Url::parse("https://partner.shopeemobile.com/api/v2/order/get_order_list?page_size=50")
				.expect("URL."),
		);

		strategy()
			.sign_request(&mut request, &credential, now)
			.expect("Signing should succeed.");

		let query = request.url().query_pairs().into_owned().collect::<HashMap<_, _>>();
		let expected = signing::signature(
			b"partner-key",
			&signing::base_string(
				2001887,
				"/api/v2/order/get_order_list",
				now.unix_timestamp(),
				Some(("shp-access", 998877)),
			),
		)
		.expect("Signing should succeed.");

		assert_eq!(query["page_size"], "50");
		assert_eq!(query["access_token"], "shp-access");
		assert_eq!(query["shop_id"], "998877");
		assert_eq!(query["sign"], expected);
	}

	#[test]
	fn missing_refresh_token_keeps_the_previous_one() {
		let strategy = strategy();
		let previous = Credential::builder(
			ProviderId::new(PROVIDER_ID).expect("Provider fixture should be valid."),
			OwnerId::new("998877").expect("Owner fixture should be valid."),
		)
		.access_token("old-access")
		.refresh_token("old-refresh")
		.expires_in(Duration::hours(4))
		.build()
		.expect("Credential fixture should build.");
		let token: TokenResponse =
			serde_json::from_str(r#"{"access_token":"new-access","expire_in":14400,"error":""}"#)
				.expect("Token fixture should parse.");
		let refreshed = strategy
			.credential_from(token, &previous.owner_id, Some(&previous))
			.expect("Refresh result should build.");

		assert_eq!(refreshed.access_token.expose(), "new-access");
		assert_eq!(refreshed.refresh_token.expose(), "old-refresh");
		assert_eq!(refreshed.owner_id.as_ref(), "998877");
	}
}
