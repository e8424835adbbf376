//! Refresh token grant.

// self
use crate::{
	_prelude::*,
	AuthClient,
	auth::TokenMaterial,
	error::ValidationError,
	oauth::{GrantForm, GrantType},
	obs::{self, FlowKind},
};

impl AuthClient {
	/// Exchanges a refresh token for fresh token material. The ID token, if any, is returned
	/// undecoded.
	pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenMaterial> {
		if refresh_token.is_empty() {
			return Err(ValidationError::MissingRefreshToken.into());
		}

		obs::observe(FlowKind::Refresh, "refresh_access_token", async {
			let mut form = GrantForm::new();

			form.insert("refresh_token", refresh_token.into());

			if let Some(secret) = &self.config.client_secret {
				form.insert("client_secret", secret.expose().into());
			}

			self.exchanger.exchange(GrantType::RefreshToken, form).await
		})
		.await
	}
}
