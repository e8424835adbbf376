//! Transport-neutral RPC failure model consumed by the resilient executor.
//!
//! The generated per-resource stubs live outside this crate; callers adapt their failures
//! into [`RpcFailure`] so [`AuthClient::execute`](crate::AuthClient::execute) can decide
//! between re-authenticating, aggregating field violations, or surfacing the failure.

pub mod executor;

pub use executor::*;

// crates.io
use reqwest::header::HeaderMap;
// self
use crate::{_prelude::*, error::BoxError};

/// Canonical RPC status codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RpcCode {
	/// Caller canceled the call.
	Canceled,
	/// Unknown error.
	Unknown,
	/// Request arguments were rejected.
	InvalidArgument,
	/// Deadline expired before completion.
	DeadlineExceeded,
	/// Resource not found.
	NotFound,
	/// Resource already exists.
	AlreadyExists,
	/// Caller lacks permission.
	PermissionDenied,
	/// Quota or rate limit exhausted.
	ResourceExhausted,
	/// System not in a state required for the call.
	FailedPrecondition,
	/// Call aborted, typically by a concurrency conflict.
	Aborted,
	/// Value out of range.
	OutOfRange,
	/// Method not implemented.
	Unimplemented,
	/// Internal server error.
	Internal,
	/// Service unavailable.
	Unavailable,
	/// Unrecoverable data loss.
	DataLoss,
	/// Missing or invalid credentials.
	Unauthenticated,
}
impl RpcCode {
	/// Returns the lowercase snake-case label of the code.
	pub const fn as_str(self) -> &'static str {
		match self {
			RpcCode::Canceled => "canceled",
			RpcCode::Unknown => "unknown",
			RpcCode::InvalidArgument => "invalid_argument",
			RpcCode::DeadlineExceeded => "deadline_exceeded",
			RpcCode::NotFound => "not_found",
			RpcCode::AlreadyExists => "already_exists",
			RpcCode::PermissionDenied => "permission_denied",
			RpcCode::ResourceExhausted => "resource_exhausted",
			RpcCode::FailedPrecondition => "failed_precondition",
			RpcCode::Aborted => "aborted",
			RpcCode::OutOfRange => "out_of_range",
			RpcCode::Unimplemented => "unimplemented",
			RpcCode::Internal => "internal",
			RpcCode::Unavailable => "unavailable",
			RpcCode::DataLoss => "data_loss",
			RpcCode::Unauthenticated => "unauthenticated",
		}
	}

	/// Maps a numeric gRPC status code; `0` (OK) and unknown values yield `None`.
	pub const fn from_grpc(code: u32) -> Option<Self> {
		Some(match code {
			1 => RpcCode::Canceled,
			2 => RpcCode::Unknown,
			3 => RpcCode::InvalidArgument,
			4 => RpcCode::DeadlineExceeded,
			5 => RpcCode::NotFound,
			6 => RpcCode::AlreadyExists,
			7 => RpcCode::PermissionDenied,
			8 => RpcCode::ResourceExhausted,
			9 => RpcCode::FailedPrecondition,
			10 => RpcCode::Aborted,
			11 => RpcCode::OutOfRange,
			12 => RpcCode::Unimplemented,
			13 => RpcCode::Internal,
			14 => RpcCode::Unavailable,
			15 => RpcCode::DataLoss,
			16 => RpcCode::Unauthenticated,
			_ => return None,
		})
	}
}
impl Display for RpcCode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// One rejected request field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldViolation {
	/// Path of the offending field.
	pub field: String,
	/// Human-readable reason.
	pub description: String,
}

/// Protocol-level error returned by the remote service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpcStatus {
	/// Status code.
	pub code: RpcCode,
	/// Top-level message.
	pub message: String,
	/// Structured field violations, when the service attached any.
	pub field_violations: Vec<FieldViolation>,
}
impl RpcStatus {
	/// Creates a status without field violations.
	pub fn new(code: RpcCode, message: impl Into<String>) -> Self {
		Self { code, message: message.into(), field_violations: Vec::new() }
	}

	/// Appends a field violation.
	pub fn with_violation(
		mut self,
		field: impl Into<String>,
		description: impl Into<String>,
	) -> Self {
		self.field_violations
			.push(FieldViolation { field: field.into(), description: description.into() });

		self
	}

	/// Top-level message followed by one `field: description` line per violation.
	pub fn aggregated_message(&self) -> String {
		let mut message = self.message.clone();

		for violation in &self.field_violations {
			message.push('\n');
			message.push_str(&violation.field);
			message.push_str(": ");
			message.push_str(&violation.description);
		}

		message
	}
}

/// Failure of a single RPC attempt.
#[derive(Debug, ThisError)]
pub enum RpcFailure {
	/// The HTTP transport failed or answered with a non-RPC error status.
	#[error("RPC transport failed{}.", .status.map(|s| format!(" with HTTP {s}")).unwrap_or_default())]
	Transport {
		/// HTTP status code, when a response was received.
		status: Option<u16>,
		/// Underlying transport error.
		#[source]
		source: BoxError,
	},
	/// The service answered with an RPC error status.
	#[error("RPC failed with {}: {}.", .0.code, .0.message)]
	Status(RpcStatus),
}
impl RpcFailure {
	/// Wraps a transport error, optionally tagged with the HTTP status received.
	pub fn transport(
		status: Option<u16>,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Transport { status, source: Box::new(src) }
	}

	/// RPC status code, for protocol-level failures.
	pub fn code(&self) -> Option<RpcCode> {
		match self {
			RpcFailure::Status(status) => Some(status.code),
			RpcFailure::Transport { .. } => None,
		}
	}

	/// `true` for HTTP 401 or the `Unauthenticated` RPC code.
	pub fn is_unauthenticated(&self) -> bool {
		match self {
			RpcFailure::Transport { status, .. } => *status == Some(401),
			RpcFailure::Status(status) => status.code == RpcCode::Unauthenticated,
		}
	}
}
impl From<RpcStatus> for RpcFailure {
	fn from(status: RpcStatus) -> Self {
		Self::Status(status)
	}
}

/// Outbound request handed to the caller-supplied RPC function.
#[derive(Clone, Debug)]
pub struct RpcRequest<T> {
	/// Typed request message.
	pub message: T,
	/// Identification headers plus `Authorization: Bearer` when a token is held.
	pub headers: HeaderMap,
}
