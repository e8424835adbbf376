//! Token endpoint error classification.
//!
//! Structured OAuth fields (`error`, `error_description`) win, then body text hints, and
//! finally the HTTP status code.

// self
use crate::{_prelude::*, error::TransientError, http::ResponseMetadata, oauth::GrantType};

/// Canonical token endpoint error categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenErrorKind {
	/// Grant rejected (bad code, refresh token, or scope).
	InvalidGrant,
	/// Client authentication failed.
	InvalidClient,
	/// Failure is temporary and may be retried.
	Transient,
}

/// Primitive facts gathered from a failing token response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenErrorContext {
	/// Grant type associated with the failing request.
	pub grant_type: GrantType,
	/// HTTP status code, when available.
	pub http_status: Option<u16>,
	/// OAuth `error` field.
	pub oauth_error: Option<String>,
	/// OAuth `error_description` field.
	pub error_description: Option<String>,
	/// Preview of the response body for non-JSON payloads.
	pub body_preview: Option<String>,
}
impl TokenErrorContext {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Creates an empty context for `grant_type`.
	pub fn new(grant_type: GrantType) -> Self {
		Self {
			grant_type,
			http_status: None,
			oauth_error: None,
			error_description: None,
			body_preview: None,
		}
	}

	/// Adds an HTTP status code.
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Adds the OAuth `error` field.
	pub fn with_oauth_error(mut self, error: impl Into<String>) -> Self {
		self.oauth_error = Some(error.into());

		self
	}

	/// Adds the OAuth `error_description` field.
	pub fn with_error_description(mut self, description: impl Into<String>) -> Self {
		self.error_description = Some(description.into());

		self
	}

	/// Adds a truncated body preview.
	pub fn with_body_preview(mut self, body: impl Into<String>) -> Self {
		self.body_preview = Some(truncate_preview(body.into()));

		self
	}

	/// Classifies the failure.
	pub fn classify(&self) -> TokenErrorKind {
		if let Some(kind) =
			classify_oauth_error(self.oauth_error.as_deref(), self.error_description.as_deref())
		{
			return kind;
		}
		if let Some(kind) = classify_body(self.body_preview.as_deref()) {
			return kind;
		}

		classify_status(self.http_status)
	}
}

#[derive(Deserialize)]
struct OAuthErrorBody {
	error: String,
	#[serde(default)]
	error_description: Option<String>,
}

/// Maps a non-success token endpoint response to a crate [`Error`].
pub fn classify_token_response(grant: GrantType, meta: &ResponseMetadata, body: &[u8]) -> Error {
	let mut ctx = TokenErrorContext::new(grant);

	if let Some(status) = meta.status {
		ctx = ctx.with_http_status(status);
	}

	let message = match serde_json::from_slice::<OAuthErrorBody>(body) {
		Ok(parsed) => {
			let message = match &parsed.error_description {
				Some(description) if !description.is_empty() => description.clone(),
				_ => parsed.error.clone(),
			};

			ctx = ctx.with_oauth_error(parsed.error);

			if let Some(description) = parsed.error_description {
				ctx = ctx.with_error_description(description);
			}

			message
		},
		Err(_) => {
			ctx = ctx.with_body_preview(String::from_utf8_lossy(body));

			format!("HTTP {}", meta.status.unwrap_or_default())
		},
	};
	let kind = ctx.classify();

	crate::obs::debug_event!(grant = %grant, ?kind, status = ?meta.status, "Token endpoint rejected the request.");

	match kind {
		TokenErrorKind::InvalidGrant => Error::InvalidGrant { reason: message },
		TokenErrorKind::InvalidClient => Error::InvalidClient { reason: message },
		TokenErrorKind::Transient => TransientError::TokenEndpoint {
			message,
			status: meta.status,
			retry_after: meta.retry_after,
		}
		.into(),
	}
}

fn truncate_preview(body: String) -> String {
	if body.chars().count() <= TokenErrorContext::BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf: String = body.chars().take(TokenErrorContext::BODY_PREVIEW_LIMIT).collect();

	buf.push('…');

	buf
}

fn classify_oauth_error(
	oauth_error: Option<&str>,
	error_description: Option<&str>,
) -> Option<TokenErrorKind> {
	oauth_error
		.and_then(match_exact_value)
		.or_else(|| error_description.and_then(match_exact_value))
		.or_else(|| classify_body(error_description))
}

fn match_exact_value(value: &str) -> Option<TokenErrorKind> {
	const GRANT: [&str; 4] = ["invalid_grant", "access_denied", "invalid_scope", "invalid_request"];
	const CLIENT: [&str; 2] = ["invalid_client", "unauthorized_client"];
	const TRANSIENT: [&str; 2] = ["temporarily_unavailable", "server_error"];

	let is = |set: &[&str]| set.iter().any(|known| value.eq_ignore_ascii_case(known));

	if is(&GRANT) {
		Some(TokenErrorKind::InvalidGrant)
	} else if is(&CLIENT) {
		Some(TokenErrorKind::InvalidClient)
	} else if is(&TRANSIENT) {
		Some(TokenErrorKind::Transient)
	} else {
		None
	}
}

fn classify_body(body: Option<&str>) -> Option<TokenErrorKind> {
	let lowered = body?.to_ascii_lowercase();

	match lowered.as_str() {
		text if text.contains("invalid_grant") => Some(TokenErrorKind::InvalidGrant),
		text if text.contains("invalid_client") => Some(TokenErrorKind::InvalidClient),
		text if text.contains("temporarily_unavailable") || text.contains("retry") =>
			Some(TokenErrorKind::Transient),
		_ => None,
	}
}

fn classify_status(status: Option<u16>) -> TokenErrorKind {
	match status {
		Some(400 | 404 | 410) => TokenErrorKind::InvalidGrant,
		Some(401 | 403) => TokenErrorKind::InvalidClient,
		_ => TokenErrorKind::Transient,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn meta(status: u16) -> ResponseMetadata {
		ResponseMetadata { status: Some(status), retry_after: None }
	}

	#[test]
	fn structured_error_wins_over_status() {
		let err = classify_token_response(
			GrantType::RefreshToken,
			&meta(500),
			br#"{"error":"invalid_grant","error_description":"Refresh token revoked"}"#,
		);

		assert!(matches!(err, Error::InvalidGrant { reason } if reason == "Refresh token revoked"));
	}

	#[test]
	fn client_errors_map_to_invalid_client() {
		let err = classify_token_response(
			GrantType::ClientCredentials,
			&meta(400),
			br#"{"error":"invalid_client"}"#,
		);

		assert!(matches!(err, Error::InvalidClient { reason } if reason == "invalid_client"));
	}

	#[test]
	fn body_hints_apply_to_non_json_payloads() {
		let ctx = TokenErrorContext::new(GrantType::AuthorizationCode)
			.with_http_status(502)
			.with_body_preview("upstream said: please retry later");

		assert_eq!(ctx.classify(), TokenErrorKind::Transient);
	}

	#[test]
	fn status_fallback_covers_unknown_bodies() {
		assert!(matches!(
			classify_token_response(GrantType::AuthorizationCode, &meta(400), b"<html></html>"),
			Error::InvalidGrant { .. }
		));
		assert!(matches!(
			classify_token_response(GrantType::ClientCredentials, &meta(401), b""),
			Error::InvalidClient { .. }
		));
		assert!(matches!(
			classify_token_response(GrantType::ClientCredentials, &meta(503), b""),
			Error::Transient(TransientError::TokenEndpoint { status: Some(503), .. })
		));
	}

	#[test]
	fn previews_are_truncated() {
		let ctx = TokenErrorContext::new(GrantType::RefreshToken).with_body_preview("x".repeat(400));
		let preview = ctx.body_preview.expect("Preview should be recorded.");

		assert_eq!(preview.chars().count(), TokenErrorContext::BODY_PREVIEW_LIMIT + 1);
		assert!(preview.ends_with('…'));
	}
}
