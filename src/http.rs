//! Transport primitives shared by every outbound call.
//!
//! [`ReqwestHttpClient`] wraps the single reqwest client a [`AuthClient`](crate::AuthClient)
//! uses for the token and key-set endpoints, configured with a fixed client-wide timeout
//! and with redirects disabled. [`SdkHeaders`] produces the identification headers and the
//! optional bearer token attached to token requests, key-set fetches, and RPC invocations.

// std
use std::ops::Deref;
// crates.io
use reqwest::{
	ClientBuilder,
	header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, RETRY_AFTER, USER_AGENT},
	redirect::Policy,
};
use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, auth::TokenSecret, config::ClientConfig, error::ConfigError};

/// Timeout applied to every outbound HTTP call.
pub const HTTP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Header announcing the SDK identifier.
pub const SDK_VERSION_HEADER: HeaderName = HeaderName::from_static("x-sdk-version");
/// Header announcing the API version the client was built against.
pub const API_VERSION_HEADER: HeaderName = HeaderName::from_static("x-api-version");

/// Captures metadata from an HTTP response for downstream error mapping.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the endpoint, if available.
	pub status: Option<u16>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}
impl ResponseMetadata {
	/// Extracts metadata from a status line and response headers.
	pub fn from_parts(status: reqwest::StatusCode, headers: &HeaderMap) -> Self {
		Self { status: Some(status.as_u16()), retry_after: parse_retry_after(headers) }
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Every instance carries [`HTTP_TIMEOUT`] and never follows redirects, whichever constructor
/// built it.
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(ReqwestClient);
impl ReqwestHttpClient {
	/// Builds the default client with [`HTTP_TIMEOUT`] and redirects disabled.
	pub fn new() -> Result<Self, ConfigError> {
		Self::from_builder(ReqwestClient::builder())
	}

	/// Finishes a caller-configured builder (proxies, TLS roots, pool sizing).
	///
	/// [`HTTP_TIMEOUT`] and the no-redirect policy are applied last and override whatever the
	/// builder carried.
	pub fn from_builder(builder: ClientBuilder) -> Result<Self, ConfigError> {
		let client = builder
			.timeout(HTTP_TIMEOUT)
			.redirect(Policy::none())
			.build()
			.map_err(ConfigError::http_client_build)?;

		Ok(Self(client))
	}
}
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

/// Identification headers attached to every outbound request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SdkHeaders {
	/// `x-sdk-version` value.
	pub sdk_version: String,
	/// `x-api-version` value.
	pub api_version: String,
	/// `user-agent` value.
	pub user_agent: String,
}
impl SdkHeaders {
	/// Copies the identification values from a [`ClientConfig`].
	pub fn from_config(config: &ClientConfig) -> Self {
		Self {
			sdk_version: config.sdk_version.clone(),
			api_version: config.api_version.clone(),
			user_agent: config.user_agent.clone(),
		}
	}

	/// Builds the header map for one request, adding `Authorization: Bearer` when a token is
	/// held.
	pub fn header_map(&self, bearer: Option<&TokenSecret>) -> Result<HeaderMap, ConfigError> {
		let mut headers = HeaderMap::with_capacity(4);

		headers.insert(USER_AGENT, HeaderValue::try_from(self.user_agent.as_str())?);
		headers.insert(SDK_VERSION_HEADER, HeaderValue::try_from(self.sdk_version.as_str())?);
		headers.insert(API_VERSION_HEADER, HeaderValue::try_from(self.api_version.as_str())?);

		if let Some(token) = bearer {
			let mut value = HeaderValue::try_from(format!("Bearer {}", token.expose()))?;

			value.set_sensitive(true);
			headers.insert(AUTHORIZATION, value);
		}

		Ok(headers)
	}
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u32>() {
		return Some(Duration::seconds(secs.into()));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
