// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use beer_client::{
	_preludet::*,
	auth::TokenStatus,
	cache::CacheKey,
	error::{AuthorizationError, RemoteError},
	registration::RegistrationId,
};

const TOKEN_PATH: &str = "/oauth2/token";

fn empty_page() -> serde_json::Value {
	json!({"content": [], "number": 0, "size": 25, "totalElements": 0})
}

#[tokio::test]
async fn token_is_cached_across_requests() {
	let server = MockServer::start_async().await;
	let (client, cache) = build_reqwest_test_client(&server.base_url(), &server.url(TOKEN_PATH));
	let token = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.body_includes("grant_type=client_credentials")
				.body_includes("client_id=test");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"cc-token\",\"token_type\":\"bearer\",\"expires_in\":1800}",
			);
		})
		.await;
	let api = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/beer").header("authorization", "Bearer cc-token");
			then.status(200).json_body(empty_page());
		})
		.await;

	client.list_all_beers().await.expect("First listing should succeed.");
	client.list_all_beers().await.expect("Second listing should reuse the token.");

	token.assert_calls_async(1).await;
	api.assert_calls_async(2).await;

	let stored = cache
		.peek(&CacheKey::new(&RegistrationId::default(), TEST_CLIENT_ID))
		.expect("Issued token should be cached.");

	assert_eq!(stored.access_token.expose(), "cc-token");
	assert_eq!(stored.status(), TokenStatus::Active);
}

#[tokio::test]
async fn concurrent_requests_share_one_exchange() {
	let server = MockServer::start_async().await;
	let (client, _cache) = build_reqwest_test_client(&server.base_url(), &server.url(TOKEN_PATH));
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"guard-token\",\"token_type\":\"bearer\",\"expires_in\":900}",
			);
		})
		.await;
	let api = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/beer").header("authorization", "Bearer guard-token");
			then.status(200).json_body(empty_page());
		})
		.await;
	let (first, second) = tokio::join!(client.list_all_beers(), client.list_all_beers());

	first.expect("First concurrent listing should succeed.");
	second.expect("Second concurrent listing should succeed.");

	token.assert_calls_async(1).await;
	api.assert_calls_async(2).await;
}

#[tokio::test]
async fn rejected_client_never_reaches_the_api() {
	let server = MockServer::start_async().await;
	let (client, cache) = build_reqwest_test_client(&server.base_url(), &server.url(TOKEN_PATH));
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_client\"}");
		})
		.await;
	let api = server
		.mock_async(|when, then| {
			when.path("/api/v1/beer");
			then.status(200).json_body(empty_page());
		})
		.await;
	let err = client.list_all_beers().await.expect_err("Rejected credentials must surface.");

	assert!(matches!(err, Error::Authorization(AuthorizationError::InvalidClient { .. })));
	assert!(cache.is_empty());

	token.assert_async().await;
	api.assert_calls_async(0).await;
}

#[tokio::test]
async fn token_without_expiry_is_rejected() {
	let server = MockServer::start_async().await;
	let (client, _cache) = build_reqwest_test_client(&server.base_url(), &server.url(TOKEN_PATH));
	let _token = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"forever\",\"token_type\":\"bearer\"}");
		})
		.await;
	let api = server
		.mock_async(|when, then| {
			when.path("/api/v1/beer");
			then.status(200).json_body(empty_page());
		})
		.await;
	let err = client.list_all_beers().await.expect_err("Token without expiry must be rejected.");

	assert!(matches!(
		err,
		Error::Authorization(AuthorizationError::InvalidTokenResponse { .. })
	));

	api.assert_calls_async(0).await;
}

#[tokio::test]
async fn token_endpoint_outage_reports_status() {
	let server = MockServer::start_async().await;
	let (client, _cache) = build_reqwest_test_client(&server.base_url(), &server.url(TOKEN_PATH));
	let _token = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(503)
				.header("content-type", "application/json")
				.header("retry-after", "7")
				.body("{\"error\":\"temporarily_unavailable\"}");
		})
		.await;
	let err = client.list_all_beers().await.expect_err("Token endpoint outage must surface.");

	match err {
		Error::Authorization(AuthorizationError::TokenEndpoint { status, retry_after, .. }) => {
			assert_eq!(status, Some(503));
			assert_eq!(retry_after, Some(Duration::seconds(7)));
		},
		other => panic!("Unexpected error: {other:?}."),
	}
}

#[tokio::test]
async fn unauthorized_response_evicts_the_token() {
	let server = MockServer::start_async().await;
	let (client, cache) = build_reqwest_test_client(&server.base_url(), &server.url(TOKEN_PATH));
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"revoked\",\"token_type\":\"bearer\",\"expires_in\":1800}",
			);
		})
		.await;
	let api = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/beer").header("authorization", "Bearer revoked");
			then.status(401).body("token revoked");
		})
		.await;

	for _ in 0..2 {
		let err = client.list_all_beers().await.expect_err("Unauthorized listing must fail.");

		assert!(matches!(err, Error::Remote(RemoteError::Status { status: 401, .. })));
		assert!(cache.is_empty());
	}

	token.assert_calls_async(2).await;
	api.assert_calls_async(2).await;
}
