//! Raw token material returned by the token endpoint.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	token::{Claims, IdTokenClaims},
};

/// Result of a successful token exchange. The client never persists it.
#[derive(Clone)]
pub struct TokenMaterial {
	/// Access token issued by the service.
	pub access_token: TokenSecret,
	/// ID token, when the grant returns one.
	pub id_token: Option<TokenSecret>,
	/// Refresh token, when the grant returns one.
	pub refresh_token: Option<TokenSecret>,
	/// Lifetime of the access token in seconds.
	pub expires_in: u64,
}
impl TokenMaterial {
	/// Absolute expiry computed from `issued_at`.
	pub fn expires_at(&self, issued_at: OffsetDateTime) -> OffsetDateTime {
		issued_at + Duration::seconds(i64::try_from(self.expires_in).unwrap_or(i64::MAX))
	}
}
impl Debug for TokenMaterial {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenMaterial")
			.field("access_token", &"<redacted>")
			.field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_in", &self.expires_in)
			.finish()
	}
}

/// Output of [`AuthClient::authenticate_with_code`](crate::AuthClient::authenticate_with_code).
#[derive(Clone, Debug)]
pub struct AuthenticationResponse {
	/// Verified ID-token claims describing the signed-in user.
	pub user: Claims<IdTokenClaims>,
	/// Token material returned by the exchange.
	pub tokens: TokenMaterial,
}

/// Output of [`AuthClient::generate_client_token`](crate::AuthClient::generate_client_token).
#[derive(Clone)]
pub struct ClientToken {
	/// Access token authenticating the client itself.
	pub access_token: TokenSecret,
	/// Lifetime of the access token in seconds.
	pub expires_in: u64,
}
impl Debug for ClientToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientToken")
			.field("access_token", &"<redacted>")
			.field("expires_in", &self.expires_in)
			.finish()
	}
}
