//! Token validation entry points bound to the client's key-set cache.

// self
use crate::{
	_prelude::*,
	AuthClient,
	token::{self, AccessTokenClaims, Claims, IdpInitiatedLoginClaims, TokenClaims},
};

/// Optional checks for [`AuthClient::validate_token_with_options`].
#[derive(Clone, Debug, Default)]
pub struct ValidateTokenOptions {
	/// Acceptable audiences; empty means no audience constraint.
	pub audience: Vec<String>,
}

impl AuthClient {
	/// Validates an IdP-initiated login token and returns its claims.
	pub async fn idp_initiated_login_claims(
		&self,
		token: &str,
	) -> Result<Claims<IdpInitiatedLoginClaims>> {
		token::validate(token, self.jwks.as_ref()).await
	}

	/// Validates an access token and returns its claims.
	pub async fn access_token_claims(&self, token: &str) -> Result<Claims<AccessTokenClaims>> {
		token::validate(token, self.jwks.as_ref()).await
	}

	/// Validates an access token, discarding its claims.
	pub async fn validate_access_token(&self, token: &str) -> Result<()> {
		self.access_token_claims(token).await.map(drop)
	}

	/// Validates any signed token and applies the optional audience check.
	pub async fn validate_token_with_options(
		&self,
		token: &str,
		options: &ValidateTokenOptions,
	) -> Result<Claims<TokenClaims>> {
		let claims: Claims<TokenClaims> = token::validate(token, self.jwks.as_ref()).await?;

		token::ensure_audience(&claims.aud, &options.audience)?;

		Ok(claims)
	}
}
