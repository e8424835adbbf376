//! Mutable per-client authentication state.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Bearer token held by one client instance.
///
/// The token is written only after a successful client-credentials exchange and read before
/// every outbound request. Concurrent re-authentications may overwrite each other; any
/// token the service issued is acceptable, so the last writer wins.
#[derive(Default)]
pub struct AuthenticatedClientState {
	access_token: RwLock<Option<TokenSecret>>,
}
impl AuthenticatedClientState {
	/// Returns a snapshot of the current bearer token, if any.
	pub fn bearer(&self) -> Option<TokenSecret> {
		self.access_token.read().clone()
	}

	/// Returns `true` once a token exchange has populated the bearer token.
	pub fn is_authenticated(&self) -> bool {
		self.access_token.read().is_some()
	}

	/// Replaces the bearer token.
	pub fn store_bearer(&self, token: TokenSecret) {
		*self.access_token.write() = Some(token);
	}
}
impl Debug for AuthenticatedClientState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthenticatedClientState")
			.field("authenticated", &self.is_authenticated())
			.finish()
	}
}
