//! Validating builder for [`ClientConfig`].

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	config::{
		AUTHORIZE_PATH, ClientConfig, DEFAULT_API_VERSION, Endpoints, JWKS_PATH, LOGOUT_PATH,
		TOKEN_PATH, default_sdk_version, default_user_agent,
	},
};

/// Errors raised while constructing or validating a [`ClientConfig`].
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ClientConfigError {
	/// Environment URL cannot be parsed.
	#[error("Environment URL is invalid.")]
	InvalidEnvironmentUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Environment URL must use HTTP or HTTPS.
	#[error("Environment URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// URL that failed validation.
		url: String,
	},
	/// Environment URL must not carry a query string or fragment.
	#[error("Environment URL must not contain a query or fragment: {url}.")]
	UnexpectedQuery {
		/// URL that failed validation.
		url: String,
	},
	/// Client identifier is empty.
	#[error("Client identifier is required.")]
	MissingClientId,
	/// A required environment variable is missing or empty.
	#[error("Environment variable `{name}` is not set.")]
	MissingEnvVar {
		/// Variable name.
		name: &'static str,
	},
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// Raw environment URL.
	pub environment_url: String,
	/// OAuth client identifier.
	pub client_id: String,
	/// Optional client secret.
	pub client_secret: Option<TokenSecret>,
	/// Optional `x-api-version` override.
	pub api_version: Option<String>,
}
impl ClientConfigBuilder {
	/// Creates a new builder seeded with the environment URL and client identifier.
	pub fn new(environment_url: impl Into<String>, client_id: impl Into<String>) -> Self {
		Self {
			environment_url: environment_url.into(),
			client_id: client_id.into(),
			client_secret: None,
			api_version: None,
		}
	}

	/// Sets the client secret used by confidential grants.
	pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = TokenSecret::non_empty(secret);

		self
	}

	/// Overrides the API version announced to the service.
	pub fn api_version(mut self, version: impl Into<String>) -> Self {
		self.api_version = Some(version.into());

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ClientConfigError> {
		if self.client_id.trim().is_empty() {
			return Err(ClientConfigError::MissingClientId);
		}

		let base = self.environment_url.trim().trim_end_matches('/');
		let environment_url = Url::parse(base)
			.map_err(|source| ClientConfigError::InvalidEnvironmentUrl { source })?;

		validate_environment_url(&environment_url)?;

		let endpoints = Endpoints {
			token: join_endpoint(base, TOKEN_PATH)?,
			jwks: join_endpoint(base, JWKS_PATH)?,
			authorize: join_endpoint(base, AUTHORIZE_PATH)?,
			logout: join_endpoint(base, LOGOUT_PATH)?,
		};
		let sdk_version = default_sdk_version();
		let user_agent = default_user_agent(&sdk_version);

		Ok(ClientConfig {
			environment_url,
			client_id: self.client_id,
			client_secret: self.client_secret.filter(|secret| !secret.expose().is_empty()),
			api_version: self.api_version.unwrap_or_else(|| DEFAULT_API_VERSION.into()),
			sdk_version,
			user_agent,
			endpoints,
		})
	}
}

fn validate_environment_url(url: &Url) -> Result<(), ClientConfigError> {
	if !matches!(url.scheme(), "http" | "https") {
		return Err(ClientConfigError::UnsupportedScheme { url: url.to_string() });
	}
	if url.query().is_some() || url.fragment().is_some() {
		return Err(ClientConfigError::UnexpectedQuery { url: url.to_string() });
	}

	Ok(())
}

fn join_endpoint(base: &str, path: &str) -> Result<Url, ClientConfigError> {
	Url::parse(&format!("{base}/{path}"))
		.map_err(|source| ClientConfigError::InvalidEnvironmentUrl { source })
}
