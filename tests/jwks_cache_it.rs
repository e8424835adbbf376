mod common;

// crates.io
use httpmock::prelude::*;
use idp_auth::error::{Error, TransientError};
use serde_json::json;
// self
use common::Signer;

#[tokio::test]
async fn key_set_is_fetched_once_across_validations() {
	let server = MockServer::start_async().await;
	let client = common::client(&server);
	let jwks = common::mount_jwks(&server).await;
	let token = common::sign(
		&json!({ "sub": "svc-1", "iss": "https://acme.example.com", "aud": "api" }),
		Signer::Trusted,
	);

	assert!(!client.jwks().is_cached());

	for _ in 0..3 {
		client.validate_access_token(&token).await.expect("Trusted token should validate.");
	}

	jwks.assert_calls_async(1).await;

	assert!(client.jwks().is_cached());
}

#[tokio::test]
async fn clones_share_the_cached_key_set() {
	let server = MockServer::start_async().await;
	let client = common::client(&server);
	let jwks = common::mount_jwks(&server).await;
	let token = common::sign(&json!({ "sub": "svc-1" }), Signer::Trusted);
	let clone = client.clone();

	client.validate_access_token(&token).await.expect("Trusted token should validate.");
	clone.validate_access_token(&token).await.expect("Clone should reuse the cached key set.");
	jwks.assert_calls_async(1).await;
}

#[tokio::test]
async fn failed_fetch_is_not_cached() {
	let server = MockServer::start_async().await;
	let client = common::client(&server);
	let token = common::sign(&json!({ "sub": "svc-1" }), Signer::Trusted);
	let mut failing = server
		.mock_async(|when, then| {
			when.method(GET).path("/keys");
			then.status(500).body("boom");
		})
		.await;
	let err = client.validate_access_token(&token).await.expect_err("Key set outage should fail.");

	failing.assert_calls_async(1).await;

	assert!(
		matches!(
			err,
			Error::Transient(TransientError::UnexpectedStatus { endpoint: "jwks", status: 500 })
		),
		"Unexpected error: {err:?}"
	);
	assert!(!client.jwks().is_cached());

	failing.delete_async().await;

	let jwks = common::mount_jwks(&server).await;

	client.validate_access_token(&token).await.expect("Recovered key set should validate.");
	jwks.assert_calls_async(1).await;

	assert!(client.jwks().is_cached());
}

#[tokio::test]
async fn malformed_key_set_is_a_parse_failure() {
	let server = MockServer::start_async().await;
	let client = common::client(&server);
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/keys");
			then.status(200).header("content-type", "application/json").body(r#"{"keys":"none"}"#);
		})
		.await;
	let err = client.jwks().key_set().await.expect_err("Malformed key set should fail.");

	assert!(
		matches!(err, Error::Transient(TransientError::ResponseParse { endpoint: "jwks", .. })),
		"Unexpected error: {err:?}"
	);
}

#[tokio::test]
async fn concurrent_first_calls_share_one_fetch() {
	let server = MockServer::start_async().await;
	let client = common::client(&server);
	let jwks = common::mount_jwks(&server).await;
	let (first, second) = tokio::join!(client.jwks().key_set(), client.jwks().key_set());
	let first = first.expect("First caller should receive the key set.");
	let second = second.expect("Second caller should receive the key set.");

	assert!(std::sync::Arc::ptr_eq(&first, &second));

	jwks.assert_calls_async(1).await;
}
