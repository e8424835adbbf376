// std
use std::collections::HashMap;
// crates.io
use color_eyre::Result;
use idp_auth::{
	AuthClient,
	config::ClientConfig,
	error::{Error, ValidationError},
	pkce::{self, PkceOptions},
	reqwest::header::{HeaderMap, HeaderValue},
	webhook::{self, WebhookError, WebhookHeaders},
};

const SECRET: &str = "whsec_dGVzdHNlY3JldA==";
const PAYLOAD: &[u8] = br#"{"type":"user.created","data":{"id":"usr_1"}}"#;

fn client() -> Result<AuthClient> {
	let config = ClientConfig::builder("https://acme.example.com", "client-it").build()?;

	Ok(AuthClient::new(config)?)
}

fn signed_headers(id: &str, timestamp: i64, payload: &[u8]) -> Result<HashMap<String, String>> {
	let key = webhook::decode_secret(SECRET)?;
	let signature = webhook::compute_signature(&key, id, timestamp, payload)?;

	Ok(HashMap::from([
		("webhook-id".to_owned(), id.to_owned()),
		("webhook-timestamp".to_owned(), timestamp.to_string()),
		("webhook-signature".to_owned(), format!("v0,ignored v1,{signature}")),
	]))
}

fn unix_now() -> i64 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.map(|elapsed| elapsed.as_secs() as i64)
		.unwrap_or_default()
}

#[test]
fn signed_delivery_verifies_through_client() -> Result<()> {
	let client = client()?;
	let headers = signed_headers("msg_1", unix_now(), PAYLOAD)?;

	client.verify_webhook_payload(SECRET, &headers, PAYLOAD)?;
	client.verify_interceptor_payload(SECRET, &headers, PAYLOAD)?;

	Ok(())
}

#[test]
fn tampered_payload_is_rejected() -> Result<()> {
	let client = client()?;
	let headers = signed_headers("msg_1", unix_now(), PAYLOAD)?;
	let err = client
		.verify_webhook_payload(SECRET, &headers, br#"{"type":"user.deleted"}"#)
		.expect_err("Tampered payload should fail.");

	assert!(matches!(err, Error::Webhook(WebhookError::InvalidSignature)), "{err:?}");

	Ok(())
}

#[test]
fn stale_and_future_deliveries_are_rejected() -> Result<()> {
	let client = client()?;
	let stale = signed_headers("msg_1", unix_now() - 3600, PAYLOAD)?;
	let future = signed_headers("msg_1", unix_now() + 3600, PAYLOAD)?;

	assert!(matches!(
		client.verify_webhook_payload(SECRET, &stale, PAYLOAD),
		Err(Error::Webhook(WebhookError::TimestampTooOld))
	));
	assert!(matches!(
		client.verify_webhook_payload(SECRET, &future, PAYLOAD),
		Err(Error::Webhook(WebhookError::TimestampTooNew))
	));

	Ok(())
}

#[test]
fn missing_header_is_reported_before_crypto() -> Result<()> {
	let client = client()?;
	let mut headers = signed_headers("msg_1", unix_now(), PAYLOAD)?;

	headers.remove("webhook-signature");

	assert!(matches!(
		client.verify_webhook_payload("not-a-secret", &headers, PAYLOAD),
		Err(Error::Webhook(WebhookError::MissingHeaders))
	));

	Ok(())
}

#[test]
fn http_header_map_is_accepted() -> Result<()> {
	let timestamp = unix_now();
	let key = webhook::decode_secret(SECRET)?;
	let signature = webhook::compute_signature(&key, "msg_2", timestamp, PAYLOAD)?;
	let mut map = HeaderMap::new();

	map.insert("webhook-id", HeaderValue::from_static("msg_2"));
	map.insert("webhook-timestamp", HeaderValue::try_from(timestamp.to_string())?);
	map.insert("webhook-signature", HeaderValue::try_from(format!("v1,{signature}"))?);

	let headers = WebhookHeaders::from_header_map(&map)?;

	webhook::verify_payload_signature(SECRET, &headers, PAYLOAD)?;

	Ok(())
}

#[test]
fn generated_pkce_pair_is_consistent() -> Result<()> {
	let client = client()?;
	let pair = client.generate_pkce(&PkceOptions {
		verifier_length: Some(pkce::MAX_VERIFIER_LEN),
		..Default::default()
	})?;

	assert_eq!(pair.verifier().len(), pkce::MAX_VERIFIER_LEN);
	assert_eq!(pair.challenge(), pkce::compute_challenge(pair.verifier()));
	assert_eq!(pair.method().as_str(), "S256");

	pkce::validate_code_verifier(pair.verifier())?;

	Ok(())
}

#[test]
fn pkce_rejects_plain_method_and_short_verifiers() -> Result<()> {
	let client = client()?;
	let plain = client
		.generate_pkce(&PkceOptions { code_challenge_method: Some("plain".into()), ..Default::default() })
		.expect_err("Plain method should be refused.");
	let short = client
		.generate_pkce(&PkceOptions { code_verifier: Some("short".into()), ..Default::default() })
		.expect_err("Short verifier should be refused.");

	assert!(matches!(plain, Error::Validation(ValidationError::UnsupportedChallengeMethod { .. })));
	assert!(matches!(short, Error::Validation(ValidationError::VerifierLength { length: 5, .. })));

	Ok(())
}
