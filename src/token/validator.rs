//! Compact JWT validation restricted to RS256.
//!
//! One generic core serves every claims shape: the signature is verified against the key set
//! returned by a [`KeySetProvider`], the payload is decoded once into a [`ClaimMap`], `exp`
//! is enforced from that map, and only then is the typed view projected.

// std
use std::collections::HashSet;
// crates.io
use jsonwebtoken::{
	Algorithm, DecodingKey, Validation,
	errors::ErrorKind,
	jwk::{AlgorithmParameters, Jwk, JwkSet},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	jwks::KeySetProvider,
	obs::{self, FlowKind},
	token::{Audience, ClaimMap, Claims, TokenError},
};

/// Validates `token` against the keys served by `keys` and projects its claims into `T`.
pub async fn validate<T, K>(token: &str, keys: &K) -> Result<Claims<T>>
where
	T: DeserializeOwned,
	K: ?Sized + KeySetProvider,
{
	obs::observe(FlowKind::TokenValidation, "validate", async {
		let key_set = keys.key_set().await?;

		Ok(verify_with_key_set(token, &key_set, OffsetDateTime::now_utc())?)
	})
	.await
}

/// Synchronous core of [`validate`], evaluated against an explicit key set and clock.
pub fn verify_with_key_set<T>(
	token: &str,
	key_set: &JwkSet,
	now: OffsetDateTime,
) -> Result<Claims<T>, TokenError>
where
	T: DeserializeOwned,
{
	let raw = verify_signature(token, key_set)?;

	check_expiry(&raw, now)?;

	Claims::from_map(raw)
}

/// Enforces the `exp` claim when present.
///
/// A missing `exp` passes. A non-numeric `exp` is [`TokenError::MalformedExpiry`]; a numeric
/// one at or before `now` is [`TokenError::Expired`].
pub fn check_expiry(raw: &ClaimMap, now: OffsetDateTime) -> Result<(), TokenError> {
	let Some(exp) = raw.get("exp") else {
		return Ok(());
	};
	let Value::Number(exp) = exp else {
		return Err(TokenError::MalformedExpiry);
	};
	let exp = exp.as_f64().ok_or(TokenError::MalformedExpiry)?;

	if now.unix_timestamp() as f64 >= exp {
		return Err(TokenError::Expired { expired_at: exp as i64 });
	}

	Ok(())
}

/// Requires `audience` to intersect `accepted`; an empty `accepted` list always passes.
pub fn ensure_audience<S>(audience: &Audience, accepted: &[S]) -> Result<(), TokenError>
where
	S: AsRef<str>,
{
	if audience.intersects(accepted) { Ok(()) } else { Err(TokenError::AudienceMismatch) }
}

fn verify_signature(token: &str, key_set: &JwkSet) -> Result<ClaimMap, TokenError> {
	let header = jsonwebtoken::decode_header(token).map_err(TokenError::Malformed)?;

	if header.alg != Algorithm::RS256 {
		return Err(TokenError::UnsupportedAlgorithm { algorithm: format!("{:?}", header.alg) });
	}

	let validation = signature_only_validation();

	for jwk in candidate_keys(key_set, header.kid.as_deref()) {
		let Ok(key) = DecodingKey::from_jwk(jwk) else {
			obs::debug_event!(kid = ?jwk.common.key_id, "Skipping unusable signing key.");

			continue;
		};

		match jsonwebtoken::decode::<ClaimMap>(token, &key, &validation) {
			Ok(data) => return Ok(data.claims),
			Err(e) if matches!(e.kind(), ErrorKind::InvalidSignature) => continue,
			Err(e) => return Err(TokenError::Malformed(e)),
		}
	}

	Err(TokenError::SignatureInvalid)
}

fn candidate_keys<'a>(key_set: &'a JwkSet, kid: Option<&'a str>) -> impl Iterator<Item = &'a Jwk> {
	key_set.keys.iter().filter(move |jwk| {
		matches!(jwk.algorithm, AlgorithmParameters::RSA(_))
			&& kid.is_none_or(|kid| jwk.common.key_id.as_deref() == Some(kid))
	})
}

// Claim checks run on the decoded map so every claims shape is treated alike.
fn signature_only_validation() -> Validation {
	let mut validation = Validation::new(Algorithm::RS256);

	validation.validate_exp = false;
	validation.validate_nbf = false;
	validation.validate_aud = false;
	validation.required_spec_claims = HashSet::new();

	validation
}
