//! Signed JWT validation against the service's key set, and the claim shapes it produces.

pub mod claims;
pub mod validator;

pub use claims::*;
pub use validator::*;

// self
use crate::_prelude::*;

/// Failures raised while validating a compact JWT.
///
/// Signature, expiry, and malformed-expiry failures are distinct variants so callers can tell
/// tampering apart from a token that merely needs re-issuing.
#[derive(Debug, ThisError)]
pub enum TokenError {
	/// Token header names an algorithm other than RS256.
	#[error("Token algorithm {algorithm} is not supported; only RS256 is accepted.")]
	UnsupportedAlgorithm {
		/// Algorithm named in the token header.
		algorithm: String,
	},
	/// Token is not a well-formed compact JWS.
	#[error("Token is malformed.")]
	Malformed(#[source] jsonwebtoken::errors::Error),
	/// No trusted key verifies the signature.
	#[error("Token signature is invalid.")]
	SignatureInvalid,
	/// The `exp` claim is present but not numeric.
	#[error("Token exp claim is not numeric.")]
	MalformedExpiry,
	/// The `exp` instant has passed.
	#[error("Token has expired.")]
	Expired {
		/// Expiry instant carried by the token.
		expired_at: i64,
	},
	/// None of the accepted audiences appear in the `aud` claim.
	#[error("None of the expected audiences were found in the token aud claim.")]
	AudienceMismatch,
	/// Payload does not match the requested claims shape.
	#[error("Token claims do not match the expected shape.")]
	ClaimsShape(#[source] serde_path_to_error::Error<serde_json::Error>),
}
