//! Client credentials grant, used both for service tokens and for RPC re-authentication.

// self
use crate::{
	_prelude::*,
	AuthClient,
	auth::{ClientToken, TokenMaterial},
	error::ValidationError,
	oauth::{GrantForm, GrantType},
	obs::{self, FlowKind},
};

impl AuthClient {
	/// Issues a client-credentials token without touching the stored bearer token.
	pub async fn generate_client_token(&self) -> Result<ClientToken> {
		let TokenMaterial { access_token, expires_in, .. } =
			self.client_credentials("generate_client_token").await?;

		Ok(ClientToken { access_token, expires_in })
	}

	/// Performs the client-credentials grant and stores the access token as the bearer used
	/// by subsequent requests.
	pub async fn authenticate_client(&self) -> Result<()> {
		let tokens = self.client_credentials("authenticate_client").await?;

		self.state.store_bearer(tokens.access_token);

		obs::debug_event!("Stored client bearer token.");

		Ok(())
	}

	async fn client_credentials(&self, stage: &'static str) -> Result<TokenMaterial> {
		let secret =
			self.config.client_secret.as_ref().ok_or(ValidationError::MissingClientSecret)?;

		obs::observe(FlowKind::ClientCredentials, stage, async {
			let mut form = GrantForm::new();

			form.insert("client_secret", secret.expose().into());

			self.exchanger.exchange(GrantType::ClientCredentials, form).await
		})
		.await
	}
}
