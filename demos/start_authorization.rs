//! Builds an authorization URL with a fresh PKCE pair, then verifies a signed webhook the way a
//! receiving endpoint would.

// std
use std::{
	collections::HashMap,
	time::{SystemTime, UNIX_EPOCH},
};
// crates.io
use color_eyre::Result;
// self
use idp_auth::{
	AuthClient,
	config::ClientConfig,
	flows::AuthorizationUrlOptions,
	pkce::PkceOptions,
	webhook,
};

fn main() -> Result<()> {
	color_eyre::install()?;

	let config = ClientConfig::builder("https://acme.example.com", "demo-client").build()?;
	let client = AuthClient::new(config)?;
	let pkce = client.generate_pkce(&PkceOptions::default())?;
	let url = client.authorization_url(
		"https://app.example.com/oauth/callback",
		&AuthorizationUrlOptions {
			state: Some("demo-state".into()),
			code_challenge: Some(pkce.challenge().into()),
			code_challenge_method: Some(pkce.method().as_str().into()),
			..Default::default()
		},
	);

	println!("Send your user to {url}.");
	println!("Keep the verifier for the callback; the challenge is {}.", pkce.challenge());

	let secret = "whsec_ZGVtby13ZWJob29rLXNlY3JldA==";
	let payload = br#"{"type":"organization.created"}"#;
	let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as i64;
	let signature =
		webhook::compute_signature(&webhook::decode_secret(secret)?, "msg_demo", timestamp, payload)?;
	let headers = HashMap::from([
		("webhook-id".to_owned(), "msg_demo".to_owned()),
		("webhook-timestamp".to_owned(), timestamp.to_string()),
		("webhook-signature".to_owned(), format!("v1,{signature}")),
	]);

	client.verify_webhook_payload(secret, &headers, payload)?;

	println!("Webhook msg_demo verified.");

	Ok(())
}
