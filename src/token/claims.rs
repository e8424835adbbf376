//! Claim shapes produced by token validation.
//!
//! Every validated payload is decoded once into a [`ClaimMap`]; the typed view is projected
//! from that same map, so the two views of a [`Claims`] value cannot diverge.

// std
use std::ops::Deref;
// crates.io
use serde::de::DeserializeOwned;
use serde_json::Value;
// self
use crate::{_prelude::*, token::TokenError};

/// Untyped claim-name to value mapping.
pub type ClaimMap = serde_json::Map<String, Value>;

/// Typed claims plus the untyped bag they were projected from.
#[derive(Clone, Debug, PartialEq)]
pub struct Claims<T> {
	typed: T,
	raw: ClaimMap,
}
impl<T> Claims<T>
where
	T: DeserializeOwned,
{
	/// Projects `raw` into `T`, keeping the map alongside the typed view.
	pub fn from_map(raw: ClaimMap) -> Result<Self, TokenError> {
		let typed = serde_path_to_error::deserialize(Value::Object(raw.clone()))
			.map_err(TokenError::ClaimsShape)?;

		Ok(Self { typed, raw })
	}
}
impl<T> Claims<T> {
	/// Strongly typed view.
	pub fn typed(&self) -> &T {
		&self.typed
	}

	/// Every claim in the payload, including non-standard ones.
	pub fn raw(&self) -> &ClaimMap {
		&self.raw
	}

	/// Looks up a single claim by name.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.raw.get(name)
	}

	/// Splits the value into its typed and untyped views.
	pub fn into_parts(self) -> (T, ClaimMap) {
		(self.typed, self.raw)
	}
}
impl<T> Deref for Claims<T> {
	type Target = T;

	fn deref(&self) -> &Self::Target {
		&self.typed
	}
}

/// `aud` claim; the wire form may be a single string, a list, or `null`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Audience(pub Vec<String>);
impl Audience {
	/// Iterates over the audience values.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}

	/// Returns `true` when `audience` is listed.
	pub fn contains(&self, audience: &str) -> bool {
		self.iter().any(|value| value == audience)
	}

	/// Returns `true` when any of `accepted` is listed; an empty `accepted` always matches.
	pub fn intersects<S>(&self, accepted: &[S]) -> bool
	where
		S: AsRef<str>,
	{
		accepted.is_empty() || accepted.iter().any(|candidate| self.contains(candidate.as_ref()))
	}
}
impl<'de> Deserialize<'de> for Audience {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum OneOrMany {
			One(String),
			Many(Vec<String>),
		}

		Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
			Some(OneOrMany::One(value)) => Self(vec![value]),
			Some(OneOrMany::Many(values)) => Self(values),
			None => Self::default(),
		})
	}
}

/// Identity provider link attached to a user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
	/// Connection the user signed in through.
	pub connection_id: Option<String>,
	/// Organization owning the connection.
	pub organization_id: Option<String>,
	/// Connection type label (e.g. `OIDC`, `SAML`).
	pub connection_type: Option<String>,
	/// Upstream identity provider name.
	pub provider_name: Option<String>,
	/// Whether the connection is a social login.
	#[serde(deserialize_with = "null_as_default")]
	pub social: bool,
	/// Raw attributes forwarded by the upstream provider.
	pub provider_raw_attributes: Option<String>,
}

/// ID-token claims describing the signed-in user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdTokenClaims {
	/// Subject (user identifier).
	pub sub: Option<String>,
	/// Preferred username.
	pub preferred_username: Option<String>,
	/// Full name.
	pub name: Option<String>,
	/// Given name.
	pub given_name: Option<String>,
	/// Family name.
	pub family_name: Option<String>,
	/// Email address.
	pub email: Option<String>,
	/// Whether the email address was verified.
	#[serde(deserialize_with = "null_as_default")]
	pub email_verified: bool,
	/// Phone number.
	pub phone_number: Option<String>,
	/// Whether the phone number was verified.
	#[serde(deserialize_with = "null_as_default")]
	pub phone_number_verified: bool,
	/// Profile page URL.
	pub profile: Option<String>,
	/// Picture URL.
	pub picture: Option<String>,
	/// Gender.
	pub gender: Option<String>,
	/// Birth date.
	pub birthdate: Option<String>,
	/// Time zone.
	pub zoneinfo: Option<String>,
	/// Locale.
	pub locale: Option<String>,
	/// Last profile update.
	pub updated_at: Option<String>,
	/// Linked identity provider accounts.
	#[serde(deserialize_with = "null_as_default")]
	pub identities: Vec<Identity>,
	/// Free-form metadata.
	pub metadata: Option<String>,
}

/// Access-token claims.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessTokenClaims {
	/// Subject.
	#[serde(deserialize_with = "null_as_default")]
	pub sub: String,
	/// Issuer.
	#[serde(deserialize_with = "null_as_default")]
	pub iss: String,
	/// Audience list.
	pub aud: Audience,
	/// Issued-at (Unix seconds).
	pub iat: Option<i64>,
	/// Expiry (Unix seconds).
	pub exp: Option<i64>,
}

/// Claims shared by any signed token the service issues.
pub type TokenClaims = AccessTokenClaims;

/// Claims carried by an IdP-initiated login token. These tokens carry no expiry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdpInitiatedLoginClaims {
	/// Connection that initiated the login.
	pub connection_id: Option<String>,
	/// Organization owning the connection.
	pub organization_id: Option<String>,
	/// Login hint forwarded by the identity provider.
	pub login_hint: Option<String>,
	/// Relay state forwarded by the identity provider.
	pub relay_state: Option<String>,
}

// An explicit `null` claim reads as the field's zero value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: serde::Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn map(value: Value) -> ClaimMap {
		match value {
			Value::Object(map) => map,
			other => panic!("Fixture must be an object, got {other}."),
		}
	}

	#[test]
	fn audience_accepts_string_or_list() {
		let single: Audience =
			serde_json::from_value(json!("api")).expect("String audience should parse.");
		let many: Audience =
			serde_json::from_value(json!(["api", "web"])).expect("List audience should parse.");

		assert_eq!(single, Audience(vec!["api".into()]));
		assert!(many.contains("web"));
		assert!(many.intersects(&["other", "api"]));
		assert!(!many.intersects(&["other"]));
		assert!(many.intersects::<&str>(&[]));
	}

	#[test]
	fn claims_keep_typed_and_raw_views_in_sync() {
		let raw = map(json!({
			"sub": "usr_1",
			"iss": "https://example.com",
			"aud": "api",
			"exp": 1_900_000_000,
			"oid": "org_9",
		}));
		let claims = Claims::<AccessTokenClaims>::from_map(raw)
			.expect("Access token claims should project.");

		assert_eq!(claims.sub, "usr_1");
		assert_eq!(claims.aud, Audience(vec!["api".into()]));
		assert_eq!(claims.exp, Some(1_900_000_000));
		assert_eq!(claims.get("oid"), Some(&json!("org_9")));
		assert_eq!(claims.get("sub"), Some(&json!("usr_1")));
	}

	#[test]
	fn id_token_claims_read_identities() {
		let raw = map(json!({
			"sub": "usr_2",
			"email": "a@example.com",
			"email_verified": true,
			"identities": [{ "connection_id": "conn_1", "social": true }],
		}));
		let claims =
			Claims::<IdTokenClaims>::from_map(raw).expect("ID token claims should project.");

		assert!(claims.email_verified);
		assert_eq!(claims.identities.len(), 1);
		assert!(claims.identities[0].social);
		assert_eq!(claims.identities[0].connection_id.as_deref(), Some("conn_1"));
	}

	#[test]
	fn null_claims_read_as_zero_values() {
		let id = Claims::<IdTokenClaims>::from_map(map(json!({
			"sub": "usr_1",
			"email_verified": null,
			"phone_number_verified": null,
			"identities": null,
		})))
		.expect("Null ID token claims should project.");

		assert_eq!(id.sub.as_deref(), Some("usr_1"));
		assert!(!id.email_verified);
		assert!(id.identities.is_empty());

		let identities = Claims::<IdTokenClaims>::from_map(map(json!({
			"identities": [{ "connection_id": "conn_1", "social": null }],
		})))
		.expect("Null identity flags should project.");

		assert!(!identities.identities[0].social);

		let access = Claims::<AccessTokenClaims>::from_map(map(json!({
			"sub": null,
			"iss": "https://example.com",
			"aud": null,
		})))
		.expect("Null access token claims should project.");

		assert_eq!(access.sub, "");
		assert_eq!(access.iss, "https://example.com");
		assert_eq!(access.aud, Audience::default());
	}

	#[test]
	fn mismatched_shape_reports_path() {
		let raw = map(json!({ "iat": "yesterday" }));
		let err = Claims::<AccessTokenClaims>::from_map(raw)
			.expect_err("String iat should not project into an integer.");

		match err {
			TokenError::ClaimsShape(source) => assert_eq!(source.path().to_string(), "iat"),
			other => panic!("Unexpected error: {other:?}"),
		}
	}
}
