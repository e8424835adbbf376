//! Lazily fetched, memoized signing key set.
//!
//! The first call to [`JwksCache::key_set`] issues `GET {environment}/keys` and stores the
//! parsed document for the lifetime of the cache. Failed fetches are not cached, so the next
//! call retries. Concurrent first calls are serialized by the underlying cell, which means
//! only one of them performs the request.

// crates.io
use async_lock::OnceCell;
use jsonwebtoken::jwk::JwkSet;
// self
use crate::{
	_prelude::*,
	auth::AuthenticatedClientState,
	error::{TransientError, TransportError},
	http::{ReqwestHttpClient, SdkHeaders},
	obs::{self, FlowKind},
};

/// Boxed future returned by [`KeySetProvider::key_set`].
pub type KeySetFuture<'a> = Pin<Box<dyn Future<Output = Result<Arc<JwkSet>>> + 'a + Send>>;

/// Source of the signing keys a token validator trusts.
pub trait KeySetProvider
where
	Self: Send + Sync,
{
	/// Returns the current signing key set.
	fn key_set(&self) -> KeySetFuture<'_>;
}

/// Key set that never changes; handy for tests and offline validation.
#[derive(Clone, Debug)]
pub struct StaticKeySet(pub Arc<JwkSet>);
impl StaticKeySet {
	/// Wraps a parsed key set.
	pub fn new(keys: JwkSet) -> Self {
		Self(Arc::new(keys))
	}
}
impl KeySetProvider for StaticKeySet {
	fn key_set(&self) -> KeySetFuture<'_> {
		let keys = self.0.clone();

		Box::pin(async move { Ok(keys) })
	}
}

/// Memoizing key-set fetcher bound to one client instance.
pub struct JwksCache {
	http_client: ReqwestHttpClient,
	endpoint: Url,
	headers: SdkHeaders,
	state: Arc<AuthenticatedClientState>,
	keys: OnceCell<Arc<JwkSet>>,
}
impl JwksCache {
	/// Creates an empty cache for the given key-set endpoint.
	pub fn new(
		http_client: ReqwestHttpClient,
		endpoint: Url,
		headers: SdkHeaders,
		state: Arc<AuthenticatedClientState>,
	) -> Self {
		Self { http_client, endpoint, headers, state, keys: OnceCell::new() }
	}

	/// Returns the cached key set, fetching it on first use.
	pub async fn key_set(&self) -> Result<Arc<JwkSet>> {
		self.keys.get_or_try_init(|| self.fetch()).await.cloned()
	}

	/// Returns `true` once a key set has been fetched successfully.
	pub fn is_cached(&self) -> bool {
		self.keys.get().is_some()
	}

	async fn fetch(&self) -> Result<Arc<JwkSet>> {
		obs::observe(FlowKind::KeySet, "fetch", async {
			obs::debug_event!(endpoint = %self.endpoint, "Fetching signing key set.");

			let headers = self.headers.header_map(self.state.bearer().as_ref())?;
			let response = self
				.http_client
				.get(self.endpoint.clone())
				.headers(headers)
				.send()
				.await
				.map_err(TransportError::from)?;
			let status = response.status();

			if !status.is_success() {
				return Err(TransientError::UnexpectedStatus {
					endpoint: "jwks",
					status: status.as_u16(),
				}
				.into());
			}

			let body = response.bytes().await.map_err(TransportError::from)?;
			let keys: JwkSet =
				serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_slice(&body))
					.map_err(|source| TransientError::ResponseParse {
						endpoint: "jwks",
						source,
						status: Some(status.as_u16()),
					})?;

			obs::debug_event!(keys = keys.keys.len(), "Cached signing key set.");

			Ok(Arc::new(keys))
		})
		.await
	}
}
impl KeySetProvider for JwksCache {
	fn key_set(&self) -> KeySetFuture<'_> {
		Box::pin(JwksCache::key_set(self))
	}
}
impl Debug for JwksCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("JwksCache")
			.field("endpoint", &self.endpoint)
			.field("cached", &self.is_cached())
			.finish()
	}
}
