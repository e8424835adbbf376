//! Form-encoded token endpoint exchanges.
//!
//! [`TokenExchanger`] is the single primitive behind the authorization-code, refresh-token,
//! and client-credentials grants: it posts `grant_type`, `client_id`, and the grant-specific
//! fields to `{environment}/oauth/token` and decodes the JSON body into [`TokenMaterial`].
//! Non-success responses are classified by [`classify`] into the crate taxonomy.

pub mod classify;

pub use classify::*;

// crates.io
use reqwest::header::HeaderMap;
// self
use crate::{
	_prelude::*,
	auth::{AuthenticatedClientState, TokenMaterial, TokenSecret},
	error::{TransientError, TransportError},
	http::{ReqwestHttpClient, ResponseMetadata, SdkHeaders},
};

/// OAuth 2.0 grant types sent to the token endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// Authorization Code grant (PKCE recommended).
	AuthorizationCode,
	/// Refresh Token grant.
	RefreshToken,
	/// Client Credentials grant authenticating the client itself.
	ClientCredentials,
}
impl GrantType {
	/// Returns the RFC 6749 identifier for the grant type.
	pub fn as_str(self) -> &'static str {
		match self {
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::RefreshToken => "refresh_token",
			GrantType::ClientCredentials => "client_credentials",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Grant-specific form fields, keyed by parameter name.
pub type GrantForm = BTreeMap<&'static str, String>;

#[derive(Deserialize)]
struct TokenEndpointResponse {
	#[serde(default)]
	id_token: Option<String>,
	access_token: String,
	#[serde(default)]
	refresh_token: Option<String>,
	#[serde(default)]
	expires_in: u64,
}
impl TokenEndpointResponse {
	fn into_material(self) -> TokenMaterial {
		TokenMaterial {
			access_token: TokenSecret::new(self.access_token),
			id_token: self.id_token.filter(|t| !t.is_empty()).map(TokenSecret::new),
			refresh_token: self.refresh_token.filter(|t| !t.is_empty()).map(TokenSecret::new),
			expires_in: self.expires_in,
		}
	}
}

/// Posts grants to the token endpoint on behalf of one client instance.
#[derive(Clone, Debug)]
pub struct TokenExchanger {
	http_client: ReqwestHttpClient,
	endpoint: Url,
	client_id: String,
	headers: SdkHeaders,
	state: Arc<AuthenticatedClientState>,
}
impl TokenExchanger {
	/// Creates an exchanger bound to `endpoint` and `client_id`.
	pub fn new(
		http_client: ReqwestHttpClient,
		endpoint: Url,
		client_id: impl Into<String>,
		headers: SdkHeaders,
		state: Arc<AuthenticatedClientState>,
	) -> Self {
		Self { http_client, endpoint, client_id: client_id.into(), headers, state }
	}

	/// Token endpoint this exchanger posts to.
	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	/// Posts `grant` with `form` and decodes the resulting token material.
	///
	/// `grant_type` and `client_id` are filled in here; `form` carries only the
	/// grant-specific fields.
	pub async fn exchange(&self, grant: GrantType, mut form: GrantForm) -> Result<TokenMaterial> {
		form.insert("grant_type", grant.as_str().into());
		form.insert("client_id", self.client_id.clone());

		let headers: HeaderMap = self.headers.header_map(self.state.bearer().as_ref())?;
		let response = self
			.http_client
			.post(self.endpoint.clone())
			.headers(headers)
			.form(&form)
			.send()
			.await
			.map_err(TransportError::from)?;
		let status = response.status();
		let meta = ResponseMetadata::from_parts(status, response.headers());
		let body = response.bytes().await.map_err(TransportError::from)?;

		if !status.is_success() {
			return Err(classify_token_response(grant, &meta, &body));
		}

		let parsed: TokenEndpointResponse =
			serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_slice(&body))
				.map_err(|source| TransientError::ResponseParse {
					endpoint: "token",
					source,
					status: meta.status,
				})?;

		Ok(parsed.into_material())
	}
}
