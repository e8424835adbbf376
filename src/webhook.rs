//! HMAC-SHA256 verification for webhook deliveries and interceptor payloads.
//!
//! A delivery carries `webhook-id`, `webhook-timestamp`, and `webhook-signature`. The signed
//! content is `"{id}.{timestamp}.{payload}"`; the signature header holds space-separated
//! `version,base64` pairs, any `v1` pair of which may match. Timestamps more than
//! [`WEBHOOK_TOLERANCE`] away from the local clock are rejected in either direction.

// std
use std::num::ParseIntError;
// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use reqwest::header::HeaderMap;
use sha2::Sha256;
// self
use crate::{
	_prelude::*,
	obs::{self, FlowKind},
};

type HmacSha256 = Hmac<Sha256>;

/// Maximum distance between the delivery timestamp and the local clock.
pub const WEBHOOK_TOLERANCE: Duration = Duration::minutes(5);
/// The only signature scheme tag accepted.
pub const SIGNATURE_VERSION: &str = "v1";

/// Header carrying the delivery identifier.
pub const WEBHOOK_ID_HEADER: &str = "webhook-id";
/// Header carrying the Unix timestamp of the delivery.
pub const WEBHOOK_TIMESTAMP_HEADER: &str = "webhook-timestamp";
/// Header carrying the versioned signatures.
pub const WEBHOOK_SIGNATURE_HEADER: &str = "webhook-signature";

/// Signed payload verification failures.
#[derive(Debug, ThisError)]
pub enum WebhookError {
	/// One of the three webhook headers is absent or empty.
	#[error("Missing required headers.")]
	MissingHeaders,
	/// Secret is not of the form `prefix_base64key`.
	#[error("Invalid secret.")]
	InvalidSecret,
	/// Secret key material is not valid base64.
	#[error("Secret key material is not valid base64.")]
	SecretDecode(#[from] base64::DecodeError),
	/// Timestamp header is not a Unix epoch integer.
	#[error("Message timestamp is not a Unix epoch integer.")]
	InvalidTimestamp(#[source] ParseIntError),
	/// Timestamp is older than the tolerance window.
	#[error("Message timestamp too old.")]
	TimestampTooOld,
	/// Timestamp is further in the future than the tolerance window.
	#[error("Message timestamp too new.")]
	TimestampTooNew,
	/// No `v1` signature matches the recomputed one.
	#[error("Invalid signature.")]
	InvalidSignature,
}

/// The three headers a signed delivery carries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookHeaders {
	/// `webhook-id`.
	pub id: String,
	/// `webhook-timestamp`.
	pub timestamp: String,
	/// `webhook-signature`.
	pub signature: String,
}
impl WebhookHeaders {
	/// Reads the headers from a plain name-to-value map (exact, lowercase names).
	pub fn from_map(headers: &HashMap<String, String>) -> Result<Self, WebhookError> {
		Self::from_lookup(|name| headers.get(name).map(String::as_str))
	}

	/// Reads the headers from an HTTP header map.
	pub fn from_header_map(headers: &HeaderMap) -> Result<Self, WebhookError> {
		Self::from_lookup(|name| headers.get(name).and_then(|value| value.to_str().ok()))
	}

	fn from_lookup<'a, F>(lookup: F) -> Result<Self, WebhookError>
	where
		F: Fn(&str) -> Option<&'a str>,
	{
		let read = |name| {
			lookup(name)
				.filter(|value| !value.is_empty())
				.map(str::to_owned)
				.ok_or(WebhookError::MissingHeaders)
		};

		Ok(Self {
			id: read(WEBHOOK_ID_HEADER)?,
			timestamp: read(WEBHOOK_TIMESTAMP_HEADER)?,
			signature: read(WEBHOOK_SIGNATURE_HEADER)?,
		})
	}
}

/// Verifies a signed payload against the local clock.
pub fn verify_payload_signature(
	secret: &str,
	headers: &WebhookHeaders,
	payload: &[u8],
) -> Result<(), WebhookError> {
	verify_payload_signature_at(secret, headers, payload, OffsetDateTime::now_utc())
}

/// Verifies a signed payload against an explicit clock.
pub fn verify_payload_signature_at(
	secret: &str,
	headers: &WebhookHeaders,
	payload: &[u8],
	now: OffsetDateTime,
) -> Result<(), WebhookError> {
	obs::observe_sync(FlowKind::Webhook, "verify", || {
		if headers.id.is_empty() || headers.timestamp.is_empty() || headers.signature.is_empty() {
			return Err(WebhookError::MissingHeaders);
		}

		let key = decode_secret(secret)?;
		let timestamp = verify_timestamp(&headers.timestamp, now)?;
		let mac = signing_mac(&key, &headers.id, timestamp, payload)?;
		let matched = headers
			.signature
			.split(' ')
			.filter_map(|pair| pair.split_once(','))
			.filter(|(version, _)| *version == SIGNATURE_VERSION)
			.filter_map(|(_, value)| STANDARD.decode(value).ok())
			.any(|candidate| mac.clone().verify_slice(&candidate).is_ok());

		if matched { Ok(()) } else { Err(WebhookError::InvalidSignature) }
	})
}

/// Computes the base64 `v1` signature value for a delivery.
pub fn compute_signature(
	key: &[u8],
	id: &str,
	timestamp: i64,
	payload: &[u8],
) -> Result<String, WebhookError> {
	let mac = signing_mac(key, id, timestamp, payload)?;

	Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Splits `prefix_base64key` at the first `_` and decodes the remainder.
pub fn decode_secret(secret: &str) -> Result<Vec<u8>, WebhookError> {
	let (_, encoded) = secret.split_once('_').ok_or(WebhookError::InvalidSecret)?;

	Ok(STANDARD.decode(encoded)?)
}

fn verify_timestamp(raw: &str, now: OffsetDateTime) -> Result<i64, WebhookError> {
	let timestamp = raw.parse::<i64>().map_err(WebhookError::InvalidTimestamp)?;
	let now = now.unix_timestamp();
	let tolerance = WEBHOOK_TOLERANCE.whole_seconds();

	if now.saturating_sub(timestamp) > tolerance {
		return Err(WebhookError::TimestampTooOld);
	}
	if timestamp > now.saturating_add(tolerance) {
		return Err(WebhookError::TimestampTooNew);
	}

	Ok(timestamp)
}

fn signing_mac(
	key: &[u8],
	id: &str,
	timestamp: i64,
	payload: &[u8],
) -> Result<HmacSha256, WebhookError> {
	let mut mac = HmacSha256::new_from_slice(key).map_err(|_| WebhookError::InvalidSecret)?;

	mac.update(format!("{id}.{timestamp}.").as_bytes());
	mac.update(payload);

	Ok(mac)
}
