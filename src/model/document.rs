//! OpenID Provider metadata as returned by a discovery endpoint.

// crates.io
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	error::ContentError,
	model::{JsonWebKeySet, parse_json},
};

/// Parsed discovery document.
///
/// The document keeps the provider's JSON object verbatim; the typed accessors read the
/// standard OpenID Connect Discovery 1.0 and RFC 8414 members from it and return `None` when
/// a member is absent or has the wrong JSON type. Members without a dedicated accessor are
/// reachable through [`value`](Self::value), [`string`](Self::string), and
/// [`strings`](Self::strings).
#[derive(Clone, Debug, PartialEq)]
pub struct DiscoveryDocument {
	json: Map<String, Value>,
	key_set: Option<JsonWebKeySet>,
}
impl DiscoveryDocument {
	/// Parses a discovery document body; anything other than a JSON object is rejected.
	pub fn from_json(body: &str) -> Result<Self, ContentError> {
		Ok(Self { json: parse_json(body)?, key_set: None })
	}

	/// Raw JSON object returned by the provider.
	pub fn json(&self) -> &Map<String, Value> {
		&self.json
	}

	/// Iterates every top-level member.
	pub fn members(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.json.iter().map(|(name, value)| (name.as_str(), value))
	}

	/// Looks up any member.
	pub fn value(&self, name: &str) -> Option<&Value> {
		self.json.get(name)
	}

	/// Looks up a string member.
	pub fn string(&self, name: &str) -> Option<&str> {
		self.value(name).and_then(Value::as_str)
	}

	/// Looks up a string array member, skipping non-string entries.
	pub fn strings(&self, name: &str) -> Vec<&str> {
		self.value(name)
			.and_then(Value::as_array)
			.map(|values| values.iter().filter_map(Value::as_str).collect())
			.unwrap_or_default()
	}

	/// Looks up a boolean member.
	pub fn flag(&self, name: &str) -> Option<bool> {
		self.value(name).and_then(Value::as_bool)
	}

	/// Signing keys fetched from [`jwks_uri`](Self::jwks_uri), once attached.
	pub fn key_set(&self) -> Option<&JsonWebKeySet> {
		self.key_set.as_ref()
	}

	/// Attaches the key set fetched for this document.
	pub(crate) fn attach_key_set(&mut self, key_set: JsonWebKeySet) {
		self.key_set = Some(key_set);
	}

	/// `issuer`.
	pub fn issuer(&self) -> Option<&str> {
		self.string("issuer")
	}

	/// `authorization_endpoint`.
	pub fn authorization_endpoint(&self) -> Option<&str> {
		self.string("authorization_endpoint")
	}

	/// `token_endpoint`.
	pub fn token_endpoint(&self) -> Option<&str> {
		self.string("token_endpoint")
	}

	/// `userinfo_endpoint`.
	pub fn userinfo_endpoint(&self) -> Option<&str> {
		self.string("userinfo_endpoint")
	}

	/// `introspection_endpoint`.
	pub fn introspection_endpoint(&self) -> Option<&str> {
		self.string("introspection_endpoint")
	}

	/// `revocation_endpoint`.
	pub fn revocation_endpoint(&self) -> Option<&str> {
		self.string("revocation_endpoint")
	}

	/// `end_session_endpoint`.
	pub fn end_session_endpoint(&self) -> Option<&str> {
		self.string("end_session_endpoint")
	}

	/// `device_authorization_endpoint`.
	pub fn device_authorization_endpoint(&self) -> Option<&str> {
		self.string("device_authorization_endpoint")
	}

	/// `registration_endpoint`.
	pub fn registration_endpoint(&self) -> Option<&str> {
		self.string("registration_endpoint")
	}

	/// `pushed_authorization_request_endpoint`.
	pub fn pushed_authorization_request_endpoint(&self) -> Option<&str> {
		self.string("pushed_authorization_request_endpoint")
	}

	/// `check_session_iframe`.
	pub fn check_session_iframe(&self) -> Option<&str> {
		self.string("check_session_iframe")
	}

	/// `jwks_uri`; blank values count as absent.
	pub fn jwks_uri(&self) -> Option<&str> {
		self.string("jwks_uri").filter(|value| !value.trim().is_empty())
	}

	/// `scopes_supported`.
	pub fn scopes_supported(&self) -> Vec<&str> {
		self.strings("scopes_supported")
	}

	/// `claims_supported`.
	pub fn claims_supported(&self) -> Vec<&str> {
		self.strings("claims_supported")
	}

	/// `grant_types_supported`.
	pub fn grant_types_supported(&self) -> Vec<&str> {
		self.strings("grant_types_supported")
	}

	/// `response_types_supported`.
	pub fn response_types_supported(&self) -> Vec<&str> {
		self.strings("response_types_supported")
	}

	/// `response_modes_supported`.
	pub fn response_modes_supported(&self) -> Vec<&str> {
		self.strings("response_modes_supported")
	}

	/// `subject_types_supported`.
	pub fn subject_types_supported(&self) -> Vec<&str> {
		self.strings("subject_types_supported")
	}

	/// `token_endpoint_auth_methods_supported`.
	pub fn token_endpoint_auth_methods_supported(&self) -> Vec<&str> {
		self.strings("token_endpoint_auth_methods_supported")
	}

	/// `id_token_signing_alg_values_supported`.
	pub fn id_token_signing_alg_values_supported(&self) -> Vec<&str> {
		self.strings("id_token_signing_alg_values_supported")
	}

	/// `code_challenge_methods_supported`.
	pub fn code_challenge_methods_supported(&self) -> Vec<&str> {
		self.strings("code_challenge_methods_supported")
	}

	/// `frontchannel_logout_supported`.
	pub fn frontchannel_logout_supported(&self) -> Option<bool> {
		self.flag("frontchannel_logout_supported")
	}

	/// `frontchannel_logout_session_supported`.
	pub fn frontchannel_logout_session_supported(&self) -> Option<bool> {
		self.flag("frontchannel_logout_session_supported")
	}

	/// `backchannel_logout_supported`.
	pub fn backchannel_logout_supported(&self) -> Option<bool> {
		self.flag("backchannel_logout_supported")
	}

	/// `backchannel_logout_session_supported`.
	pub fn backchannel_logout_session_supported(&self) -> Option<bool> {
		self.flag("backchannel_logout_session_supported")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const GOOGLE_LIKE: &str = r#"{
		"issuer": "https://accounts.example.com",
		"authorization_endpoint": "https://accounts.example.com/o/oauth2/v2/auth",
		"token_endpoint": "https://oauth2.example.com/token",
		"jwks_uri": "https://www.example.com/oauth2/v3/certs",
		"scopes_supported": ["openid", "email", 7],
		"backchannel_logout_supported": true,
		"x_vendor_flag": {"enabled": true}
	}"#;

	#[test]
	fn accessors_read_standard_members() {
		let doc = DiscoveryDocument::from_json(GOOGLE_LIKE).expect("Document fixture should parse.");

		assert_eq!(doc.issuer(), Some("https://accounts.example.com"));
		assert_eq!(doc.token_endpoint(), Some("https://oauth2.example.com/token"));
		assert_eq!(doc.jwks_uri(), Some("https://www.example.com/oauth2/v3/certs"));
		assert_eq!(doc.scopes_supported(), ["openid", "email"]);
		assert_eq!(doc.backchannel_logout_supported(), Some(true));
		assert_eq!(doc.userinfo_endpoint(), None);
		assert!(doc.grant_types_supported().is_empty());
		assert_eq!(
			doc.value("x_vendor_flag").and_then(|value| value.get("enabled")),
			Some(&Value::Bool(true))
		);
		assert!(doc.key_set().is_none());
	}

	#[test]
	fn wrong_member_types_read_as_absent() {
		let doc = DiscoveryDocument::from_json(r#"{"issuer": 42, "jwks_uri": "  "}"#)
			.expect("Document fixture should parse.");

		assert_eq!(doc.issuer(), None);
		assert_eq!(doc.jwks_uri(), None);
	}

	#[test]
	fn rejects_non_objects_and_trailing_data() {
		assert!(matches!(
			DiscoveryDocument::from_json("[1, 2]"),
			Err(ContentError::Malformed { .. })
		));
		assert!(matches!(
			DiscoveryDocument::from_json("<html>"),
			Err(ContentError::Malformed { .. })
		));
		assert!(matches!(
			DiscoveryDocument::from_json("{} {}"),
			Err(ContentError::TrailingCharacters { .. })
		));
	}
}
