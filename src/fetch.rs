//! Authenticated marketplace calls.

// crates.io
use reqwest::{Method, header::CONTENT_TYPE};
// self
use crate::{
	_prelude::*,
	error::{TransportError, redact_query},
	flows::TokenBroker,
	http::ReqwestHttpClient,
};

/// Sends marketplace API requests authenticated with the broker's credential.
///
/// Only `200` and `201` count as success. Nothing is retried.
#[derive(Clone, Debug)]
pub struct AuthenticatedFetcher {
	broker: Arc<TokenBroker>,
	http: ReqwestHttpClient,
}
impl AuthenticatedFetcher {
	/// Creates a fetcher that shares the broker's HTTP client.
	pub fn new(broker: Arc<TokenBroker>) -> Self {
		let http = broker.http_client().clone();

		Self { broker, http }
	}

	/// Uses a dedicated HTTP client for API calls.
	pub fn with_http_client(mut self, http: ReqwestHttpClient) -> Self {
		self.http = http;

		self
	}

	/// Broker supplying credentials.
	pub fn broker(&self) -> &Arc<TokenBroker> {
		&self.broker
	}

	/// Resolves `path` against the provider's API base.
	pub fn api_url(&self, path: &str) -> Url {
		self.broker.strategy().descriptor().api_url(path)
	}

	/// Sends `GET url` and returns the raw body.
	pub async fn get(&self, url: Url) -> Result<Vec<u8>> {
		self.send(Method::GET, url, None).await
	}

	/// Sends a request with an optional JSON body and returns the raw response body.
	pub async fn send(
		&self,
		method: Method,
		url: Url,
		body: Option<&serde_json::Value>,
	) -> Result<Vec<u8>> {
		let credential = self.broker.credential().await?;
		let mut builder =
			self.http.request(method, url.clone()).header(CONTENT_TYPE, "application/json");

		if let Some(body) = body {
			builder = builder.json(body);
		}

		let mut request = builder.build().map_err(TransportError::from)?;

		self.broker.strategy().sign_request(&mut request, &credential, OffsetDateTime::now_utc())?;

		tracing::debug!(method = %request.method(), url = %redact_query(&url), "calling marketplace");

		let response = self.http.execute(request).await.map_err(TransportError::from)?;
		let status = response.status().as_u16();
		let bytes = response.bytes().await.map_err(TransportError::from)?;

		if !matches!(status, 200 | 201) {
			return Err(TransportError::status(status, &url, &bytes).into());
		}

		Ok(bytes.to_vec())
	}
}
