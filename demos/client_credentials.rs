//! Authenticates a service client against a mock environment and runs one RPC through the
//! re-authenticating executor.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use idp_auth::{
	AuthClient,
	auth::TokenSecret,
	config::ClientConfig,
	reqwest,
	rpc::{RpcFailure, RpcRequest},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"demo-access\",\"expires_in\":900}");
		})
		.await;
	let stale_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/me").header("authorization", "Bearer expired");
			then.status(401);
		})
		.await;
	let me_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/me").header("authorization", "Bearer demo-access");
			then.status(200).body("{\"client_id\":\"demo-client\"}");
		})
		.await;
	let config =
		ClientConfig::builder(server.base_url(), "demo-client").client_secret("demo-secret").build()?;
	let client = AuthClient::new(config)?;
	let http = reqwest::Client::new();
	let url = server.url("/api/v1/me");

	// Pretend a long-lived process is still holding yesterday's token.
	client.state().store_bearer(TokenSecret::new("expired"));

	let body = client
		.execute((), |request: RpcRequest<()>| {
			let call = http.get(&url).headers(request.headers);

			async move {
				let response = call.send().await.map_err(|e| RpcFailure::transport(None, e))?;
				let status = response.status().as_u16();

				response
					.error_for_status()
					.map_err(|e| RpcFailure::transport(Some(status), e))?
					.text()
					.await
					.map_err(|e| RpcFailure::transport(Some(status), e))
			}
		})
		.await?;

	println!("Service identity: {body}.");

	stale_mock.assert_async().await;
	token_mock.assert_async().await;
	me_mock.assert_async().await;

	Ok(())
}
