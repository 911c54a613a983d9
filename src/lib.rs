//! Marketplace seller ledger: OAuth token lifecycle, paginated order fetches, and fee/net
//! totals for Mercado Libre and Shopee behind a small HTTP facade and an RPC-shaped contract.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod auth;
pub mod config;
pub mod error;
pub mod fetch;
pub mod flows;
pub mod http;
pub mod market;
pub mod oauth;
pub mod obs;
pub mod orders;
pub mod provider;
pub mod server;
pub mod service;
pub mod store;
#[doc(hidden)]
pub mod _preludet {
	//! Fixtures shared by unit and integration tests.

	pub use crate::_prelude::*;

	// std
	use std::time::Duration as StdDuration;
	// self
	use crate::{
		auth::{Credential, OwnerId, ProviderId, TokenSecret},
		flows::{AuthorizationPrompt, PromptFuture},
		http::ReqwestHttpClient,
		provider::{ClientCredentials, MercadoLibre, ProviderDescriptor, Shopee, mercadolibre},
	};

	/// Redirect URI registered by the test applications.
	pub const TEST_REDIRECT_URI: &str = "https://app.example.com/callback";
	/// Numeric Shopee partner id used by the fixtures.
	pub const TEST_PARTNER_ID: i64 = 2001887;
	/// Shopee partner key used by the fixtures.
	pub const TEST_PARTNER_KEY: &str = "partner-key";

	/// HTTP client with a short timeout for mock servers.
	pub fn test_http_client() -> ReqwestHttpClient {
		ReqwestHttpClient::with_timeout(StdDuration::from_secs(5))
			.expect("Test HTTP client should build.")
	}

	/// Mercado Libre descriptor whose endpoints live under `base` (e.g. a mock server URL).
	pub fn mercadolibre_descriptor(base: &str) -> ProviderDescriptor {
		let base = Url::parse(base).expect("Mock base URL should parse.");

		ProviderDescriptor::builder(
			ProviderId::new(mercadolibre::PROVIDER_ID).expect("Provider id should be valid."),
		)
		.authorization_endpoint(base.join("/authorization").expect("Authorize URL should join."))
		.token_endpoint(base.join("/oauth/token").expect("Token URL should join."))
		.api_base(base)
		.build()
		.expect("Mock Mercado Libre descriptor should build.")
	}

	/// Mercado Libre strategy against `base`.
	pub fn mercadolibre_strategy(base: &str) -> MercadoLibre {
		MercadoLibre::new(
			mercadolibre_descriptor(base),
			ClientCredentials {
				client_id: "5551234".into(),
				client_secret: TokenSecret::new("ml-secret"),
				redirect_uri: Url::parse(TEST_REDIRECT_URI).expect("Redirect URI should parse."),
			},
		)
	}

	/// Shopee strategy against `base`.
	pub fn shopee_strategy(base: &str) -> Shopee {
		let descriptor = Shopee::descriptor_at(Url::parse(base).expect("Mock base URL should parse."))
			.expect("Mock Shopee descriptor should build.");

		Shopee::new(
			descriptor,
			ClientCredentials {
				client_id: TEST_PARTNER_ID.to_string(),
				client_secret: TokenSecret::new(TEST_PARTNER_KEY),
				redirect_uri: Url::parse(TEST_REDIRECT_URI).expect("Redirect URI should parse."),
			},
		)
		.expect("Mock Shopee strategy should build.")
	}

	/// Credential for `provider`/`owner` that expires `expires_in` from now.
	pub fn seed_credential(
		provider: &str,
		owner: &str,
		access: &str,
		refresh: &str,
		expires_in: Duration,
	) -> Credential {
		let now = OffsetDateTime::now_utc();

		Credential::builder(
			ProviderId::new(provider).expect("Provider fixture should be valid."),
			OwnerId::new(owner).expect("Owner fixture should be valid."),
		)
		.access_token(access)
		.refresh_token(refresh)
		.token_type("Bearer")
		.issued_at(now - Duration::hours(6))
		.expires_at(now + expires_in)
		.build()
		.expect("Seed credential should build.")
	}

	/// Prompt that "approves" every authorize URL by answering with a redirect carrying `code`,
	/// the echoed `state`, and any extra parameters.
	#[derive(Debug)]
	pub struct ScriptedPrompt {
		code: String,
		extra: Vec<(String, String)>,
		echo_state: bool,
		seen: Mutex<Vec<Url>>,
	}
	impl ScriptedPrompt {
		/// Answers with `code`.
		pub fn approving(code: impl Into<String>) -> Self {
			Self { code: code.into(), extra: Vec::new(), echo_state: true, seen: Default::default() }
		}

		/// Drops `state` from the redirect.
		pub fn without_state(mut self) -> Self {
			self.echo_state = false;

			self
		}

		/// Adds a query parameter to the redirect (e.g. Shopee's `shop_id`).
		pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
			self.extra.push((key.into(), value.into()));

			self
		}

		/// Authorize URLs presented so far.
		pub fn requests(&self) -> Vec<Url> {
			self.seen.lock().clone()
		}
	}
	impl AuthorizationPrompt for ScriptedPrompt {
		fn request_authorization<'a>(&'a self, url: &'a Url) -> PromptFuture<'a> {
			Box::pin(async move {
				self.seen.lock().push(url.clone());

				let mut redirect = Url::parse(TEST_REDIRECT_URI).expect("Redirect URI should parse.");

				{
					let mut pairs = redirect.query_pairs_mut();

					pairs.append_pair("code", &self.code);

					for (key, value) in &self.extra {
						pairs.append_pair(key, value);
					}
					if let Some((_, state)) = url
						.query_pairs()
						.find(|(key, _)| key == "state")
						.filter(|_| self.echo_state)
					{
						pairs.append_pair("state", &state);
					}
				}

				Ok(redirect.to_string())
			})
		}
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError, Request as ReqwestRequest};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
