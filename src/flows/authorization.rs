//! Authorization code flow: authorize/logout URL construction and the code exchange.

// self
use crate::{
	_prelude::*,
	AuthClient,
	auth::AuthenticationResponse,
	error::ValidationError,
	oauth::{GrantForm, GrantType},
	obs::{self, FlowKind},
	token::{self, Claims, IdTokenClaims},
};

/// Scopes requested when the caller does not supply any.
pub const DEFAULT_SCOPES: [&str; 3] = ["openid", "profile", "email"];

/// Optional parameters for [`AuthClient::authorization_url`].
#[derive(Clone, Debug, Default)]
pub struct AuthorizationUrlOptions {
	/// Requested scopes; `None` requests [`DEFAULT_SCOPES`].
	pub scopes: Option<Vec<String>>,
	/// Opaque state echoed back on the redirect.
	pub state: Option<String>,
	/// OIDC nonce.
	pub nonce: Option<String>,
	/// Pre-fills the login identifier.
	pub login_hint: Option<String>,
	/// Routes the user by email domain; also sent as `domain`.
	pub domain_hint: Option<String>,
	/// Forces a specific connection.
	pub connection_id: Option<String>,
	/// Forces a specific organization.
	pub organization_id: Option<String>,
	/// PKCE challenge.
	pub code_challenge: Option<String>,
	/// PKCE challenge method.
	pub code_challenge_method: Option<String>,
	/// Social login provider.
	pub provider: Option<String>,
	/// OIDC prompt value.
	pub prompt: Option<String>,
}

/// Optional parameters for [`AuthClient::logout_url`].
#[derive(Clone, Debug, Default)]
pub struct LogoutUrlOptions {
	/// ID token identifying the session to end.
	pub id_token_hint: Option<String>,
	/// Where to send the browser after logout.
	pub post_logout_redirect_uri: Option<String>,
	/// Opaque state echoed back on the redirect.
	pub state: Option<String>,
}

/// Optional parameters for [`AuthClient::authenticate_with_code`].
#[derive(Clone, Debug, Default)]
pub struct AuthenticationOptions {
	/// PKCE verifier matching the challenge sent on the authorize request.
	pub code_verifier: Option<String>,
}

impl AuthClient {
	/// Builds the `{environment}/oauth/authorize` URL the browser is sent to.
	pub fn authorization_url(&self, redirect_uri: &str, options: &AuthorizationUrlOptions) -> Url {
		let mut url = self.config.endpoints.authorize.clone();
		let scope = match &options.scopes {
			Some(scopes) => scopes.join(" "),
			None => DEFAULT_SCOPES.join(" "),
		};

		{
			let mut pairs = url.query_pairs_mut();

			pairs.append_pair("response_type", "code");
			pairs.append_pair("client_id", &self.config.client_id);
			pairs.append_pair("redirect_uri", redirect_uri);
			pairs.append_pair("scope", &scope);

			let optional = [
				("state", &options.state),
				("nonce", &options.nonce),
				("login_hint", &options.login_hint),
				("domain_hint", &options.domain_hint),
				("domain", &options.domain_hint),
				("connection_id", &options.connection_id),
				("organization_id", &options.organization_id),
				("code_challenge", &options.code_challenge),
				("code_challenge_method", &options.code_challenge_method),
				("provider", &options.provider),
				("prompt", &options.prompt),
			];

			for (name, value) in optional {
				if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
					pairs.append_pair(name, value);
				}
			}
		}

		url
	}

	/// Builds the `{environment}/oidc/logout` URL.
	pub fn logout_url(&self, options: &LogoutUrlOptions) -> Url {
		let mut url = self.config.endpoints.logout.clone();
		let optional = [
			("id_token_hint", &options.id_token_hint),
			("post_logout_redirect_uri", &options.post_logout_redirect_uri),
			("state", &options.state),
		];

		if optional.iter().any(|(_, value)| value.as_deref().is_some_and(|v| !v.is_empty())) {
			let mut pairs = url.query_pairs_mut();

			for (name, value) in optional {
				if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
					pairs.append_pair(name, value);
				}
			}
		}

		url
	}

	/// Exchanges an authorization code and validates the returned ID token.
	///
	/// Empty `code` or `redirect_uri` fails before any network call.
	pub async fn authenticate_with_code(
		&self,
		code: &str,
		redirect_uri: &str,
		options: &AuthenticationOptions,
	) -> Result<AuthenticationResponse> {
		if code.is_empty() || redirect_uri.is_empty() {
			return Err(ValidationError::MissingCodeOrRedirectUri.into());
		}

		obs::observe(FlowKind::AuthorizationCode, "authenticate_with_code", async {
			let mut form = GrantForm::new();

			form.insert("code", code.into());
			form.insert("redirect_uri", redirect_uri.into());

			if let Some(secret) = &self.config.client_secret {
				form.insert("client_secret", secret.expose().into());
			}
			if let Some(verifier) = options.code_verifier.as_deref().filter(|v| !v.is_empty()) {
				form.insert("code_verifier", verifier.into());
			}

			let tokens = self.exchanger.exchange(GrantType::AuthorizationCode, form).await?;
			let id_token = tokens.id_token.as_ref().map(|t| t.expose()).unwrap_or_default();
			let user: Claims<IdTokenClaims> = token::validate(id_token, self.jwks.as_ref()).await?;

			Ok(AuthenticationResponse { user, tokens })
		})
		.await
	}
}
