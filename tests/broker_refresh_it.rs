// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use seller_ledger::{
	_preludet::*,
	error::AuthError,
	flows::{TokenBroker, TokenState},
	store::MemoryStore,
};

fn expired_mercadolibre() -> MemoryStore {
	MemoryStore::with_credential(seed_credential(
		"mercadolibre",
		"123456789",
		"APP_USR-old",
		"TG-old",
		Duration::seconds(-60),
	))
}

#[tokio::test]
async fn mercadolibre_expired_credential_is_refreshed_once() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/token")
				.form_urlencoded_tuple("grant_type", "refresh_token")
				.form_urlencoded_tuple("refresh_token", "TG-old");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"access_token": "APP_USR-new",
				"token_type": "bearer",
				"expires_in": 21600,
				"refresh_token": "TG-new"
			}));
		})
		.await;
	let store = expired_mercadolibre();
	let broker = TokenBroker::new(
		Arc::new(mercadolibre_strategy(&server.base_url())),
		Arc::new(store.clone()),
		test_http_client(),
	);

	for _ in 0..3 {
		let token = broker.access_token().await.expect("Refreshed token should be served.");

		assert_eq!(token.expose(), "APP_USR-new");
	}

	mock.assert_calls_async(1).await;

	let persisted = store.snapshot().expect("Refreshed credential should be persisted.");

	assert_eq!(persisted.access_token.expose(), "APP_USR-new");
	assert_eq!(persisted.refresh_token.expose(), "TG-new");
	assert_eq!(&*persisted.owner_id, "123456789");
	assert!(persisted.expires_at > OffsetDateTime::now_utc() + Duration::hours(5));
	assert_eq!(store.saves(), 1);
	assert_eq!(broker.metrics().refreshes(), 1);
}

#[tokio::test]
async fn mercadolibre_rejected_refresh_is_fatal_by_default() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(400).header("content-type", "application/json").json_body(json!({
				"error": "invalid_grant",
				"error_description": "Error validating grant."
			}));
		})
		.await;
	let store = expired_mercadolibre();
	let prompt = Arc::new(ScriptedPrompt::approving("TG-code"));
	let broker = TokenBroker::new(
		Arc::new(mercadolibre_strategy(&server.base_url())),
		Arc::new(store.clone()),
		test_http_client(),
	)
	.with_prompt(prompt.clone());
	let err = broker.access_token().await.expect_err("Rejected refresh must fail.");

	mock.assert_async().await;

	match err {
		Error::Auth(AuthError::Rejected { grant, status, body, .. }) => {
			assert_eq!(grant, "refresh_token");
			assert_eq!(status, Some(400));
			assert!(body.starts_with("invalid_grant"));
		},
		other => panic!("Unexpected error: {other:?}."),
	}

	assert!(prompt.requests().is_empty());
	assert_eq!(store.saves(), 0);
	assert_eq!(broker.state(), TokenState::Unrecoverable);
}

#[tokio::test]
async fn mercadolibre_rejected_refresh_can_fall_back_to_authorization() {
	let server = MockServer::start_async().await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/token")
				.form_urlencoded_tuple("grant_type", "refresh_token");
			then.status(400).header("content-type", "application/json").json_body(json!({
				"error": "invalid_grant"
			}));
		})
		.await;
	let exchange = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/token")
				.form_urlencoded_tuple("grant_type", "authorization_code");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"access_token": "APP_USR-again",
				"token_type": "bearer",
				"expires_in": 21600,
				"user_id": 123456789,
				"refresh_token": "TG-again"
			}));
		})
		.await;
	let store = expired_mercadolibre();
	let prompt = Arc::new(ScriptedPrompt::approving("TG-code"));
	let broker = TokenBroker::new(
		Arc::new(mercadolibre_strategy(&server.base_url())),
		Arc::new(store.clone()),
		test_http_client(),
	)
	.with_prompt(prompt.clone())
	.with_reauthorize_on_rejection(true);
	let token = broker.access_token().await.expect("Fallback authorization should succeed.");

	refresh.assert_async().await;
	exchange.assert_async().await;

	assert_eq!(token.expose(), "APP_USR-again");
	assert_eq!(prompt.requests().len(), 1);
	assert_eq!(store.saves(), 1);
	assert_eq!(broker.state(), TokenState::Authorized);
}

#[tokio::test]
async fn shopee_refresh_keeps_the_shop_and_signs_the_call() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/v2/auth/access_token/get")
				.query_param("partner_id", TEST_PARTNER_ID.to_string())
				.query_param_exists("sign");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"access_token": "shp-new",
				"refresh_token": "shp-refresh-2",
				"expire_in": 14400,
				"shop_id": 998877,
				"partner_id": TEST_PARTNER_ID,
				"error": "",
				"message": ""
			}));
		})
		.await;
	let store = MemoryStore::with_credential(seed_credential(
		"shopee",
		"998877",
		"shp-old",
		"shp-refresh",
		Duration::seconds(-1),
	));
	let broker = TokenBroker::new(
		Arc::new(shopee_strategy(&server.base_url())),
		Arc::new(store.clone()),
		test_http_client(),
	);
	let credential = broker.credential().await.expect("Shopee refresh should succeed.");

	mock.assert_async().await;

	assert_eq!(credential.access_token.expose(), "shp-new");
	assert_eq!(credential.refresh_token.expose(), "shp-refresh-2");
	assert_eq!(&*credential.owner_id, "998877");
	assert_eq!(
		store.snapshot().expect("Refreshed credential should be persisted.").access_token.expose(),
		"shp-new"
	);
}

#[tokio::test]
async fn credential_of_another_provider_is_ignored() {
	let server = MockServer::start_async().await;
	let store = MemoryStore::with_credential(seed_credential(
		"shopee",
		"998877",
		"shp-access",
		"shp-refresh",
		Duration::hours(1),
	));
	let broker = TokenBroker::new(
		Arc::new(mercadolibre_strategy(&server.base_url())),
		Arc::new(store),
		test_http_client(),
	);
	let err = broker.access_token().await.expect_err("Foreign credential must not be used.");

	assert!(matches!(err, Error::Auth(AuthError::InteractionUnavailable { .. })));
}
