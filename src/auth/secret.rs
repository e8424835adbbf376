//! Client secrets and bearer tokens that never reach logs.

// self
use crate::_prelude::*;

/// Client secret or issued token; `Debug` and `Display` print `<redacted>`.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Wraps `value` unless it is empty; an empty secret counts as no secret at all.
	pub fn non_empty(value: impl Into<String>) -> Option<Self> {
		Some(Self::new(value)).filter(|secret| !secret.0.is_empty())
	}

	/// Raw value, for request bodies and headers only.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("TokenSecret(<redacted>)")
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn formatters_never_print_the_value() {
		let secret = TokenSecret::new("whsec_c2VjcmV0");

		assert_eq!(format!("{secret:?}"), "TokenSecret(<redacted>)");
		assert_eq!(secret.to_string(), "<redacted>");
		assert_eq!(secret.expose(), "whsec_c2VjcmV0");
	}

	#[test]
	fn empty_values_are_not_secrets() {
		assert!(TokenSecret::non_empty("").is_none());
		assert_eq!(TokenSecret::non_empty("s3cret").map(|s| s.expose().to_owned()), Some("s3cret".into()));
	}
}
