//! Client configuration: environment URL, credentials, and the identification headers sent
//! with every outbound call.
//!
//! Endpoints are derived once, when the configuration is built, by joining the fixed
//! relative paths onto the environment URL, so flows never re-parse URLs at call time.

pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Relative path of the OAuth token endpoint.
pub const TOKEN_PATH: &str = "oauth/token";
/// Relative path of the JSON Web Key Set endpoint.
pub const JWKS_PATH: &str = "keys";
/// Relative path of the authorization endpoint.
pub const AUTHORIZE_PATH: &str = "oauth/authorize";
/// Relative path of the OIDC logout endpoint.
pub const LOGOUT_PATH: &str = "oidc/logout";
/// API version announced through `x-api-version` unless overridden.
pub const DEFAULT_API_VERSION: &str = "20260112";

/// Environment variable holding the environment URL for [`ClientConfig::from_env`].
pub const ENV_ENVIRONMENT_URL: &str = "IDP_ENVIRONMENT_URL";
/// Environment variable holding the client identifier for [`ClientConfig::from_env`].
pub const ENV_CLIENT_ID: &str = "IDP_CLIENT_ID";
/// Optional environment variable holding the client secret for [`ClientConfig::from_env`].
pub const ENV_CLIENT_SECRET: &str = "IDP_CLIENT_SECRET";

/// Endpoint set derived from the environment URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
	/// `POST` target for every grant.
	pub token: Url,
	/// `GET` target for the signing key set.
	pub jwks: Url,
	/// Browser redirect target for the authorization code flow.
	pub authorize: Url,
	/// Browser redirect target for RP-initiated logout.
	pub logout: Url,
}

/// Immutable client configuration consumed by [`AuthClient`](crate::AuthClient).
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// Base URL of the identity service environment.
	pub environment_url: Url,
	/// OAuth client identifier used in every grant.
	pub client_id: String,
	/// Optional client secret for confidential grants.
	pub client_secret: Option<TokenSecret>,
	/// Value of the `x-api-version` header.
	pub api_version: String,
	/// Value of the `x-sdk-version` header.
	pub sdk_version: String,
	/// Value of the `user-agent` header.
	pub user_agent: String,
	/// Endpoints derived from [`environment_url`](Self::environment_url).
	pub endpoints: Endpoints,
}
impl ClientConfig {
	/// Creates a new builder for the provided environment URL and client identifier.
	pub fn builder(
		environment_url: impl Into<String>,
		client_id: impl Into<String>,
	) -> ClientConfigBuilder {
		ClientConfigBuilder::new(environment_url, client_id)
	}

	/// Reads the configuration from `IDP_ENVIRONMENT_URL`, `IDP_CLIENT_ID`, and the optional
	/// `IDP_CLIENT_SECRET`.
	pub fn from_env() -> Result<Self, ClientConfigError> {
		let environment_url = read_env(ENV_ENVIRONMENT_URL)?;
		let client_id = read_env(ENV_CLIENT_ID)?;
		let mut builder = Self::builder(environment_url, client_id);

		if let Some(secret) = std::env::var(ENV_CLIENT_SECRET).ok().filter(|s| !s.is_empty()) {
			builder = builder.client_secret(secret);
		}

		builder.build()
	}

	/// Returns `true` when a client secret is configured.
	pub fn has_client_secret(&self) -> bool {
		self.client_secret.is_some()
	}
}

fn read_env(name: &'static str) -> Result<String, ClientConfigError> {
	std::env::var(name)
		.ok()
		.filter(|value| !value.is_empty())
		.ok_or(ClientConfigError::MissingEnvVar { name })
}

/// SDK identifier announced through `x-sdk-version`.
pub fn default_sdk_version() -> String {
	format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// User agent derived from the SDK identifier and the host platform.
pub fn default_user_agent(sdk_version: &str) -> String {
	format!("{sdk_version} Rust ({}; {})", std::env::consts::OS, std::env::consts::ARCH)
}
