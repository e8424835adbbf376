mod common;

// crates.io
use httpmock::prelude::*;
use idp_auth::{
	error::Error,
	flows::{AuthenticationOptions, AuthorizationUrlOptions},
	pkce::{PkceOptions, PkcePair},
};
use serde_json::json;
// self
use common::{CLIENT_ID, CLIENT_SECRET, Signer};

const REDIRECT_URI: &str = "https://app.example.com/callback";
const REDIRECT_URI_ENCODED: &str = "https%3A%2F%2Fapp.example.com%2Fcallback";
const VERIFIER: &str = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";

#[tokio::test]
async fn authorization_code_exchange_returns_verified_user() {
	let server = MockServer::start_async().await;
	let client = common::client(&server);
	let pkce = PkcePair::generate(&PkceOptions {
		code_verifier: Some(VERIFIER.into()),
		..Default::default()
	})
	.expect("PKCE pair should build from a valid verifier.");
	let url = client.authorization_url(
		REDIRECT_URI,
		&AuthorizationUrlOptions {
			state: Some("state-123".into()),
			code_challenge: Some(pkce.challenge().into()),
			code_challenge_method: Some(pkce.method().as_str().into()),
			..Default::default()
		},
	);

	assert!(url.as_str().starts_with(&server.url("/oauth/authorize")));
	assert!(
		url.query_pairs()
			.any(|(k, v)| k == "code_challenge" && v == "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM")
	);

	let id_token = common::sign(
		&json!({
			"sub": "user-42",
			"iss": server.base_url(),
			"aud": CLIENT_ID,
			"exp": common::unix_now() + 3600,
			"email": "ada@example.com",
			"email_verified": true,
			"organization_id": "org-1",
		}),
		Signer::Trusted,
	);
	let jwks = common::mount_jwks(&server).await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/token")
				.header("content-type", "application/x-www-form-urlencoded")
				.body(format!(
					"client_id={CLIENT_ID}&client_secret={CLIENT_SECRET}&code=auth-code-1\
					 &code_verifier={VERIFIER}&grant_type=authorization_code\
					 &redirect_uri={REDIRECT_URI_ENCODED}"
				));
			then.status(200).header("content-type", "application/json").body(
				json!({
					"access_token": "access-1",
					"id_token": id_token,
					"refresh_token": "refresh-1",
					"expires_in": 3600,
				})
				.to_string(),
			);
		})
		.await;
	let response = client
		.authenticate_with_code(
			"auth-code-1",
			REDIRECT_URI,
			&AuthenticationOptions { code_verifier: Some(pkce.verifier().into()) },
		)
		.await
		.expect("Code exchange should succeed.");

	token.assert_async().await;
	jwks.assert_async().await;

	assert_eq!(response.user.sub.as_deref(), Some("user-42"));
	assert_eq!(response.user.email.as_deref(), Some("ada@example.com"));
	assert!(response.user.email_verified);
	assert_eq!(response.user.get("organization_id"), Some(&json!("org-1")));
	assert_eq!(response.tokens.access_token.expose(), "access-1");
	assert_eq!(response.tokens.refresh_token.as_ref().map(|t| t.expose()), Some("refresh-1"));
	assert_eq!(response.tokens.expires_in, 3600);
}

#[tokio::test]
async fn rejected_code_maps_to_invalid_grant() {
	let server = MockServer::start_async().await;
	let client = common::client(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(400)
				.header("content-type", "application/json")
				.body(r#"{"error":"invalid_grant","error_description":"code expired"}"#);
		})
		.await;
	let err = client
		.authenticate_with_code("stale-code", REDIRECT_URI, &Default::default())
		.await
		.expect_err("Rejected code should fail.");

	mock.assert_async().await;

	assert!(matches!(err, Error::InvalidGrant { .. }), "Unexpected error: {err:?}");
}

#[tokio::test]
async fn id_token_signed_by_unknown_key_is_rejected() {
	let server = MockServer::start_async().await;
	let client = common::client(&server);
	let id_token = common::sign(
		&json!({ "sub": "user-42", "exp": common::unix_now() + 3600 }),
		Signer::Rogue,
	);
	let _jwks = common::mount_jwks(&server).await;
	let _token = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(json!({ "access_token": "access-1", "id_token": id_token }).to_string());
		})
		.await;
	let err = client
		.authenticate_with_code("auth-code-1", REDIRECT_URI, &Default::default())
		.await
		.expect_err("Forged ID token should fail.");

	assert!(
		matches!(err, Error::Token(idp_auth::token::TokenError::SignatureInvalid)),
		"Unexpected error: {err:?}"
	);
}

#[tokio::test]
async fn server_errors_are_transient() {
	let server = MockServer::start_async().await;
	let client = common::client(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(503).header("retry-after", "5").body("upstream unavailable");
		})
		.await;
	let err = client
		.authenticate_with_code("auth-code-1", REDIRECT_URI, &Default::default())
		.await
		.expect_err("Server error should fail.");

	mock.assert_async().await;

	assert!(matches!(err, Error::Transient(_)), "Unexpected error: {err:?}");
}
