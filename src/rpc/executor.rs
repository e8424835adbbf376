//! Resilient RPC execution with a single re-authentication retry.
//!
//! Each invocation moves through at most two attempts. An unauthenticated failure on the
//! first attempt triggers one client-credentials exchange and one retry; an invalid-argument
//! failure is aggregated into [`Error::InvalidArgument`] and returned immediately; anything
//! else is surfaced untouched as [`Error::Rpc`].

// self
use crate::{
	_prelude::*,
	AuthClient,
	obs::{self, FlowKind},
	rpc::{RpcCode, RpcFailure, RpcRequest},
};

/// Position of an invocation in the retry state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RpcAttempt {
	/// First attempt; the re-authentication retry is still available.
	Initial,
	/// Attempt made after re-authenticating; no retry remains.
	Retried,
}

/// What to do after a failed attempt.
#[derive(Debug)]
pub enum RetryDecision {
	/// Re-authenticate and try once more.
	Reauthenticate,
	/// Stop and surface the error.
	Fail(Error),
}

/// Classifies a failed attempt.
pub fn decide(failure: RpcFailure, attempt: RpcAttempt) -> RetryDecision {
	if let RpcFailure::Status(status) = &failure
		&& status.code == RpcCode::InvalidArgument
	{
		return RetryDecision::Fail(Error::InvalidArgument { message: status.aggregated_message() });
	}
	if failure.is_unauthenticated() && attempt == RpcAttempt::Initial {
		return RetryDecision::Reauthenticate;
	}

	RetryDecision::Fail(Error::Rpc(failure))
}

impl AuthClient {
	/// Runs `call` with the current bearer token, re-authenticating at most once.
	///
	/// `call` receives the request message plus the identification and bearer headers, and
	/// may be invoked twice. Retrying a non-idempotent write after a spurious
	/// unauthenticated response may execute it twice.
	pub async fn execute<Req, Resp, F, Fut>(&self, message: Req, mut call: F) -> Result<Resp>
	where
		Req: Clone,
		F: FnMut(RpcRequest<Req>) -> Fut,
		Fut: Future<Output = Result<Resp, RpcFailure>>,
	{
		obs::observe(FlowKind::Rpc, "execute", async {
			let mut attempt = RpcAttempt::Initial;

			loop {
				let headers = self.headers.header_map(self.state.bearer().as_ref())?;
				let request = RpcRequest { message: message.clone(), headers };
				let failure = match call(request).await {
					Ok(response) => return Ok(response),
					Err(failure) => failure,
				};

				match decide(failure, attempt) {
					RetryDecision::Reauthenticate => {
						obs::debug_event!("RPC rejected the bearer token; re-authenticating once.");

						self.authenticate_client().await?;

						attempt = RpcAttempt::Retried;
					},
					RetryDecision::Fail(e) => return Err(e),
				}
			}
		})
		.await
	}
}
