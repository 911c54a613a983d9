// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use seller_ledger::{
	_preludet::*,
	error::TransportError,
	fetch::AuthenticatedFetcher,
	flows::TokenBroker,
	provider::ProviderStrategy,
	reqwest::Method,
	store::MemoryStore,
};

fn fetcher(strategy: Arc<dyn ProviderStrategy>, provider: &str, owner: &str) -> AuthenticatedFetcher {
	let store = MemoryStore::with_credential(seed_credential(
		provider,
		owner,
		"live-access",
		"live-refresh",
		Duration::hours(6),
	));

	AuthenticatedFetcher::new(Arc::new(TokenBroker::new(strategy, Arc::new(store), test_http_client())))
}

#[tokio::test]
async fn mercadolibre_calls_carry_a_bearer_token() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/users/me")
				.header("authorization", "Bearer live-access")
				.header("content-type", "application/json");
			then.status(200).body(r#"{"id":123456789}"#);
		})
		.await;
	let fetcher =
		fetcher(Arc::new(mercadolibre_strategy(&server.base_url())), "mercadolibre", "123456789");
	let body = fetcher.get(fetcher.api_url("/users/me")).await.expect("Fetch should succeed.");

	mock.assert_async().await;

	assert_eq!(body, br#"{"id":123456789}"#);
}

#[tokio::test]
async fn created_counts_as_success_and_bodies_are_sent_as_json() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/items").json_body(json!({ "title": "Mate" }));
			then.status(201).body(r#"{"id":"MLB1"}"#);
		})
		.await;
	let fetcher =
		fetcher(Arc::new(mercadolibre_strategy(&server.base_url())), "mercadolibre", "123456789");
	let body = fetcher
		.send(Method::POST, fetcher.api_url("/items"), Some(&json!({ "title": "Mate" })))
		.await
		.expect("201 should count as success.");

	mock.assert_async().await;

	assert_eq!(body, br#"{"id":"MLB1"}"#);
}

#[tokio::test]
async fn other_statuses_surface_the_body_without_the_query() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/orders/search");
			then.status(403).body("forbidden for seller");
		})
		.await;
	let fetcher =
		fetcher(Arc::new(mercadolibre_strategy(&server.base_url())), "mercadolibre", "123456789");
	let mut url = fetcher.api_url("/orders/search");

	url.set_query(Some("seller=123456789&offset=0"));

	let err = fetcher.get(url).await.expect_err("403 must fail.");

	mock.assert_async().await;

	match err {
		Error::Transport(TransportError::Status { status, url, body }) => {
			assert_eq!(status, 403);
			assert_eq!(url, server.url("/orders/search"));
			assert_eq!(body, "forbidden for seller");
		},
		other => panic!("Unexpected error: {other:?}."),
	}
}

#[tokio::test]
async fn shopee_calls_carry_the_signed_shop_query() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/v2/shop/get_shop_info")
				.query_param("partner_id", TEST_PARTNER_ID.to_string())
				.query_param("access_token", "live-access")
				.query_param("shop_id", "998877")
				.query_param_exists("timestamp")
				.query_param_exists("sign");
			then.status(200).body(r#"{"error":"","shop_name":"Loja"}"#);
		})
		.await;
	let fetcher = fetcher(Arc::new(shopee_strategy(&server.base_url())), "shopee", "998877");

	fetcher
		.get(fetcher.api_url("/api/v2/shop/get_shop_info"))
		.await
		.expect("Signed fetch should succeed.");

	mock.assert_async().await;
}
