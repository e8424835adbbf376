//! Crate-level error types shared across flows, token validation, webhooks, and RPC execution.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Caller input rejected before any network call.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Temporary upstream failure; retry with backoff.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// JWT parsing, signature, or claim failure.
	#[error(transparent)]
	Token(#[from] crate::token::TokenError),
	/// Signed webhook or interceptor payload failed verification.
	#[error(transparent)]
	Webhook(#[from] crate::webhook::WebhookError),
	/// RPC failure surfaced untouched by the executor.
	#[error(transparent)]
	Rpc(#[from] crate::rpc::RpcFailure),

	/// RPC rejected the request arguments; carries the aggregated field violations.
	#[error("{message}")]
	InvalidArgument {
		/// Top-level message followed by one `field: description` line per violation.
		message: String,
	},
	/// Token endpoint rejected the grant (e.g., bad code or refresh token).
	#[error("Token endpoint rejected the grant: {reason}.")]
	InvalidGrant {
		/// Server- or client-supplied reason string.
		reason: String,
	},
	/// Client authentication failed or credentials are malformed.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Server- or client-supplied reason string.
		reason: String,
	},
}

/// Configuration failures raised while assembling clients and requests.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Client configuration is invalid.
	#[error(transparent)]
	Client(#[from] crate::config::ClientConfigError),
	/// A header value contains characters HTTP does not allow.
	#[error("Header value is invalid.")]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Malformed caller input detected before any network call.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// Authorization code exchange requires both a code and a redirect URI.
	#[error("Authorization code and redirect URI are required.")]
	MissingCodeOrRedirectUri,
	/// Refresh grant requires a refresh token.
	#[error("Refresh token is required.")]
	MissingRefreshToken,
	/// Client credentials grant requires a configured client secret.
	#[error("Client secret is required for client authentication.")]
	MissingClientSecret,
	/// Only the `S256` PKCE challenge method is supported.
	#[error("Unsupported code challenge method `{method}`; only S256 is supported.")]
	UnsupportedChallengeMethod {
		/// Method literal supplied by the caller.
		method: String,
	},
	/// PKCE verifier length falls outside the RFC 7636 bounds.
	#[error("Code verifier length must be between {min} and {max}, got {length}.")]
	VerifierLength {
		/// Offending length.
		length: usize,
		/// Inclusive lower bound.
		min: usize,
		/// Inclusive upper bound.
		max: usize,
	},
	/// PKCE verifier contains a character outside `[A-Za-z0-9-._~]`.
	#[error("Code verifier must contain only unreserved URI characters [A-Z a-z 0-9 - . _ ~].")]
	VerifierCharset,
}

/// Temporary failure variants (safe to retry).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Token endpoint returned an unexpected but non-fatal response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Endpoint responded with a status the client does not handle.
	#[error("The {endpoint} endpoint returned HTTP {status}.")]
	UnexpectedStatus {
		/// Endpoint label.
		endpoint: &'static str,
		/// HTTP status code.
		status: u16,
	},
	/// Endpoint responded with malformed JSON that could not be parsed.
	#[error("The {endpoint} endpoint returned malformed JSON.")]
	ResponseParse {
		/// Endpoint label.
		endpoint: &'static str,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, timeout).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the identity service.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The client-wide HTTP timeout elapsed.
	#[error("Request to the identity service timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout { source: Box::new(e) } } else { Self::network(e) }
	}
}
