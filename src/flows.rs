//! [`AuthClient`] facade tying configuration, token exchanges, key-set caching, and token
//! validation together for one identity service environment.

pub mod authorization;
pub mod claims;
pub mod client_credentials;
pub mod refresh;

pub use authorization::*;
pub use claims::*;

// self
use crate::{
	_prelude::*,
	auth::{AuthenticatedClientState, TokenSecret},
	config::ClientConfig,
	error::ConfigError,
	http::{ReqwestHttpClient, SdkHeaders},
	jwks::JwksCache,
	oauth::TokenExchanger,
	pkce::{PkceOptions, PkcePair},
	webhook::{self, WebhookHeaders},
};

/// Client for one identity service environment.
///
/// The client owns the HTTP transport, the memoized signing key set, and the bearer token
/// acquired through [`AuthClient::authenticate_client`]. Cloning shares all three.
#[derive(Clone)]
pub struct AuthClient {
	pub(crate) config: Arc<ClientConfig>,
	pub(crate) http_client: ReqwestHttpClient,
	pub(crate) headers: SdkHeaders,
	pub(crate) state: Arc<AuthenticatedClientState>,
	pub(crate) jwks: Arc<JwksCache>,
	pub(crate) exchanger: TokenExchanger,
}
impl AuthClient {
	/// Creates a client with its own reqwest transport.
	pub fn new(config: ClientConfig) -> Result<Self> {
		Ok(Self::with_http_client(config, ReqwestHttpClient::new()?))
	}

	/// Creates a client from `IDP_ENVIRONMENT_URL`, `IDP_CLIENT_ID`, and `IDP_CLIENT_SECRET`.
	pub fn from_env() -> Result<Self> {
		Self::new(ClientConfig::from_env().map_err(ConfigError::from)?)
	}

	/// Creates a client that reuses the caller-provided transport.
	pub fn with_http_client(config: ClientConfig, http_client: ReqwestHttpClient) -> Self {
		let headers = SdkHeaders::from_config(&config);
		let state = Arc::new(AuthenticatedClientState::default());
		let jwks = Arc::new(JwksCache::new(
			http_client.clone(),
			config.endpoints.jwks.clone(),
			headers.clone(),
			state.clone(),
		));
		let exchanger = TokenExchanger::new(
			http_client.clone(),
			config.endpoints.token.clone(),
			config.client_id.clone(),
			headers.clone(),
			state.clone(),
		);

		Self { config: Arc::new(config), http_client, headers, state, jwks, exchanger }
	}

	/// Returns a client sharing this configuration and transport but carrying `secret`.
	///
	/// The returned client starts unauthenticated with an empty key-set cache.
	pub fn with_secret(&self, secret: impl Into<String>) -> Self {
		let mut config = (*self.config).clone();

		config.client_secret = TokenSecret::non_empty(secret);

		Self::with_http_client(config, self.http_client.clone())
	}

	/// Configuration the client was built from.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Mutable authentication state (bearer token).
	pub fn state(&self) -> &AuthenticatedClientState {
		&self.state
	}

	/// Memoized signing key set.
	pub fn jwks(&self) -> &JwksCache {
		&self.jwks
	}

	/// Verifies a signed webhook delivery.
	pub fn verify_webhook_payload(
		&self,
		secret: &str,
		headers: &HashMap<String, String>,
		payload: &[u8],
	) -> Result<()> {
		Ok(webhook::verify_payload_signature(secret, &WebhookHeaders::from_map(headers)?, payload)?)
	}

	/// Verifies a signed interceptor payload; identical rules to webhook deliveries.
	pub fn verify_interceptor_payload(
		&self,
		secret: &str,
		headers: &HashMap<String, String>,
		payload: &[u8],
	) -> Result<()> {
		self.verify_webhook_payload(secret, headers, payload)
	}

	/// Generates PKCE parameters for the authorization code flow.
	pub fn generate_pkce(&self, options: &PkceOptions) -> Result<PkcePair> {
		Ok(PkcePair::generate(options)?)
	}
}
impl Debug for AuthClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthClient")
			.field("environment_url", &self.config.environment_url.as_str())
			.field("client_id", &self.config.client_id)
			.field("client_secret_set", &self.config.has_client_secret())
			.field("state", &self.state)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn client() -> AuthClient {
		let config = ClientConfig::builder("https://acme.example.com", "client-1")
			.client_secret("secret-1")
			.build()
			.expect("Config should build.");

		AuthClient::new(config).expect("Client should build.")
	}

	#[test]
	fn with_secret_keeps_configuration_and_resets_state() {
		let client = client();

		client.state().store_bearer(TokenSecret::new("token"));

		let other = client.with_secret("secret-2");

		assert_eq!(other.config().client_id, "client-1");
		assert_eq!(
			other.config().client_secret.as_ref().map(TokenSecret::expose),
			Some("secret-2")
		);
		assert!(!other.state().is_authenticated());
		assert!(client.state().is_authenticated());
		assert!(!client.with_secret("").config().has_client_secret());
	}

	#[test]
	fn debug_output_redacts_secret() {
		let rendered = format!("{:?}", client());

		assert!(rendered.contains("client_secret_set: true"));
		assert!(!rendered.contains("secret-1"));
	}
}
