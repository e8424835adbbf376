//! Shared fixtures for integration tests: mock environment clients, RSA signing keys, and the
//! key set the mock `/keys` endpoint serves.

#![allow(dead_code)]

// crates.io
use httpmock::prelude::*;
use idp_auth::{
	AuthClient,
	config::ClientConfig,
	jsonwebtoken::{self, Algorithm, EncodingKey, Header},
};
use serde_json::{Value, json};

pub const CLIENT_ID: &str = "client-it";
pub const CLIENT_SECRET: &str = "secret-it";
pub const TRUSTED_KID: &str = "trusted-kid";

const TRUSTED_PEM: &str = include_str!("../fixtures/trusted.pem");
const ROGUE_PEM: &str = include_str!("../fixtures/rogue.pem");
const TRUSTED_N: &str = "9M8yLzp9IA2PtUP_OeUWeSYn1dhERAdxd-ayBvejoDC_xxpPYDniVIzFu4OAvhs6YkMyENQG-rXAHYMilGIpYHCCHtj2r7vdoIM3RxotXVLdnmoIhN8tn6dXfBdsSSSnmYL-SsxEBQezGoAsY1D4G7sgP7mtIPOys8z8LPA5PCJyjcEIibuQqQtLZMI17yt5tbBWxuKgij6f0ob3id1iofyyr_4MS4tQ1ezcEyoHv0hekD4_DGzAZBU3gveWU96hnoh5qdpCc75N9RK73rM_QZf7Q-ZsQuAU9xwnU-p7ut3rPAwrVt7uGeNTt-ceWvsSikA407HGDJVKCKfQ2RWGvw";

/// Which private key signs a test token.
#[derive(Clone, Copy, Debug)]
pub enum Signer {
	/// Key published by the mock key-set endpoint.
	Trusted,
	/// Key the mock environment has never published.
	Rogue,
}

/// Key-set document containing only the trusted key.
pub fn trusted_jwks() -> Value {
	json!({
		"keys": [{
			"kty": "RSA",
			"kid": TRUSTED_KID,
			"use": "sig",
			"alg": "RS256",
			"n": TRUSTED_N,
			"e": "AQAB",
		}]
	})
}

/// Signs `claims` as an RS256 JWT carrying the trusted `kid`.
pub fn sign(claims: &Value, signer: Signer) -> String {
	let pem = match signer {
		Signer::Trusted => TRUSTED_PEM,
		Signer::Rogue => ROGUE_PEM,
	};
	let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("Fixture PEM should load.");
	let mut header = Header::new(Algorithm::RS256);

	header.kid = Some(TRUSTED_KID.into());

	jsonwebtoken::encode(&header, claims, &key).expect("Fixture token should sign.")
}

/// Current Unix time in seconds.
pub fn unix_now() -> i64 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.expect("System clock should be after the Unix epoch.")
		.as_secs() as i64
}

/// Client pointed at the mock environment, with the test secret configured.
pub fn client(server: &MockServer) -> AuthClient {
	let config = ClientConfig::builder(server.base_url(), CLIENT_ID)
		.client_secret(CLIENT_SECRET)
		.build()
		.expect("Mock environment config should build.");

	AuthClient::new(config).expect("Mock environment client should build.")
}

/// Client pointed at the mock environment without a secret.
pub fn public_client(server: &MockServer) -> AuthClient {
	let config = ClientConfig::builder(server.base_url(), CLIENT_ID)
		.build()
		.expect("Mock environment config should build.");

	AuthClient::new(config).expect("Mock environment client should build.")
}

/// Mounts the trusted key set at `/keys`.
pub async fn mount_jwks(server: &MockServer) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(GET).path("/keys");
			then.status(200)
				.header("content-type", "application/json")
				.body(trusted_jwks().to_string());
		})
		.await
}

/// Mounts a client-credentials grant answering with `access_token`.
pub async fn mount_client_credentials<'a>(
	server: &'a MockServer,
	access_token: &str,
) -> httpmock::Mock<'a> {
	let body = json!({ "access_token": access_token, "expires_in": 3600 }).to_string();

	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/token")
				.header("content-type", "application/x-www-form-urlencoded")
				.body(format!(
					"client_id={CLIENT_ID}&client_secret={CLIENT_SECRET}&grant_type=client_credentials"
				));
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await
}
