//! PKCE (RFC 7636) verifier and challenge generation.
//!
//! Only the `S256` method is supported. A generated verifier maps each random byte onto the
//! unreserved URI character set; a caller-supplied verifier is validated and used verbatim.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, error::ValidationError};

/// Shortest verifier RFC 7636 allows.
pub const MIN_VERIFIER_LEN: usize = 43;
/// Longest verifier RFC 7636 allows.
pub const MAX_VERIFIER_LEN: usize = 128;
/// Length of generated verifiers unless overridden.
pub const DEFAULT_VERIFIER_LEN: usize = 64;

const VERIFIER_CHARSET: &[u8] =
	b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

/// Supported PKCE challenge methods.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PkceCodeChallengeMethod {
	/// SHA-256 based PKCE (RFC 7636 S256).
	#[default]
	S256,
}
impl PkceCodeChallengeMethod {
	/// Returns the RFC 7636 identifier for the challenge method.
	pub fn as_str(self) -> &'static str {
		match self {
			PkceCodeChallengeMethod::S256 => "S256",
		}
	}

	/// Resolves a caller-supplied method literal; empty means `S256`, matching is
	/// case-insensitive.
	pub fn parse(method: &str) -> Result<Self, ValidationError> {
		if method.is_empty() || method.eq_ignore_ascii_case("S256") {
			Ok(Self::S256)
		} else {
			Err(ValidationError::UnsupportedChallengeMethod { method: method.into() })
		}
	}
}
impl Display for PkceCodeChallengeMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Inputs for [`PkcePair::generate`].
#[derive(Clone, Debug, Default)]
pub struct PkceOptions {
	/// Challenge method literal; `None` or empty means `S256`.
	pub code_challenge_method: Option<String>,
	/// Length of the generated verifier; ignored when `code_verifier` is set.
	pub verifier_length: Option<usize>,
	/// Precomputed verifier used verbatim after validation.
	pub code_verifier: Option<String>,
}

/// Verifier, challenge, and method produced together.
#[derive(Clone, PartialEq, Eq)]
pub struct PkcePair {
	verifier: String,
	challenge: String,
	method: PkceCodeChallengeMethod,
}
impl PkcePair {
	/// Resolves `options` into a verifier/challenge pair.
	pub fn generate(options: &PkceOptions) -> Result<Self, ValidationError> {
		let method =
			PkceCodeChallengeMethod::parse(options.code_challenge_method.as_deref().unwrap_or(""))?;

		match options.code_verifier.as_deref().filter(|v| !v.is_empty()) {
			Some(verifier) => Self::from_verifier(verifier, method),
			None => {
				let verifier =
					generate_code_verifier(options.verifier_length.unwrap_or(DEFAULT_VERIFIER_LEN))?;
				let challenge = compute_challenge(&verifier);

				Ok(Self { verifier, challenge, method })
			},
		}
	}

	/// Validates `verifier` and recomputes its challenge.
	pub fn from_verifier(
		verifier: impl Into<String>,
		method: PkceCodeChallengeMethod,
	) -> Result<Self, ValidationError> {
		let verifier = verifier.into();

		validate_code_verifier(&verifier)?;

		let challenge = compute_challenge(&verifier);

		Ok(Self { verifier, challenge, method })
	}

	/// Secret verifier sent with the token request.
	pub fn verifier(&self) -> &str {
		&self.verifier
	}

	/// Challenge sent with the authorization request.
	pub fn challenge(&self) -> &str {
		&self.challenge
	}

	/// Challenge method the pair was derived with.
	pub fn method(&self) -> PkceCodeChallengeMethod {
		self.method
	}
}
impl Debug for PkcePair {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PkcePair")
			.field("verifier", &"<redacted>")
			.field("challenge", &self.challenge)
			.field("method", &self.method)
			.finish()
	}
}

/// Checks the RFC 7636 length bounds and unreserved character set.
pub fn validate_code_verifier(verifier: &str) -> Result<(), ValidationError> {
	let length = verifier.chars().count();

	if !(MIN_VERIFIER_LEN..=MAX_VERIFIER_LEN).contains(&length) {
		return Err(ValidationError::VerifierLength {
			length,
			min: MIN_VERIFIER_LEN,
			max: MAX_VERIFIER_LEN,
		});
	}
	if !verifier.bytes().all(|b| VERIFIER_CHARSET.contains(&b)) {
		return Err(ValidationError::VerifierCharset);
	}

	Ok(())
}

/// `BASE64URL(SHA256(verifier))` without padding.
pub fn compute_challenge(verifier: &str) -> String {
	URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

fn generate_code_verifier(length: usize) -> Result<String, ValidationError> {
	if !(MIN_VERIFIER_LEN..=MAX_VERIFIER_LEN).contains(&length) {
		return Err(ValidationError::VerifierLength {
			length,
			min: MIN_VERIFIER_LEN,
			max: MAX_VERIFIER_LEN,
		});
	}

	let mut bytes = vec![0_u8; length];

	rand::rng().fill_bytes(&mut bytes);

	Ok(bytes
		.into_iter()
		.map(|b| char::from(VERIFIER_CHARSET[usize::from(b) % VERIFIER_CHARSET.len()]))
		.collect())
}
