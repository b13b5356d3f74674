//! JSON Web Key (RFC 7517) models.

// crates.io
use serde_json::Value;
// self
use crate::{_prelude::*, error::ContentError, model::parse_json};

/// A single JSON Web Key.
///
/// Well-known parameters are typed; anything else the provider publishes is kept in
/// [`additional`](Self::additional).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JsonWebKey {
	/// Key type (`RSA`, `EC`, `OKP`, `oct`).
	pub kty: String,
	/// Intended use (`sig` or `enc`).
	#[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
	pub key_use: Option<String>,
	/// Key identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub kid: Option<String>,
	/// Algorithm the key is meant for.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub alg: Option<String>,
	/// Permitted operations.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub key_ops: Option<Vec<String>>,
	/// X.509 URL.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub x5u: Option<String>,
	/// X.509 certificate chain (base64 DER).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub x5c: Option<Vec<String>>,
	/// X.509 SHA-1 thumbprint.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub x5t: Option<String>,
	/// X.509 SHA-256 thumbprint.
	#[serde(rename = "x5t#S256", default, skip_serializing_if = "Option::is_none")]
	pub x5t_s256: Option<String>,
	/// RSA modulus.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub n: Option<String>,
	/// RSA public exponent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub e: Option<String>,
	/// Elliptic curve name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub crv: Option<String>,
	/// Curve x coordinate or OKP public key.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub x: Option<String>,
	/// Curve y coordinate.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub y: Option<String>,
	/// Unrecognized parameters.
	#[serde(flatten)]
	pub additional: BTreeMap<String, Value>,
}
impl JsonWebKey {
	/// Returns `true` unless the key is explicitly reserved for encryption.
	pub fn is_signing_key(&self) -> bool {
		self.key_use.as_deref().is_none_or(|value| value == "sig")
	}
}

/// Ordered set of keys published at a provider's `jwks_uri`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonWebKeySet {
	/// Keys in the order the provider listed them.
	pub keys: Vec<JsonWebKey>,
}
impl JsonWebKeySet {
	/// Parses a key-set body.
	pub fn from_json(body: &str) -> Result<Self, ContentError> {
		parse_json(body)
	}

	/// Number of keys.
	pub fn len(&self) -> usize {
		self.keys.len()
	}

	/// Whether the set holds no keys.
	pub fn is_empty(&self) -> bool {
		self.keys.is_empty()
	}

	/// Finds a key by `kid`.
	pub fn find(&self, kid: &str) -> Option<&JsonWebKey> {
		self.keys.iter().find(|key| key.kid.as_deref() == Some(kid))
	}

	/// Keys usable for signature verification.
	pub fn signing_keys(&self) -> impl Iterator<Item = &JsonWebKey> {
		self.keys.iter().filter(|key| key.is_signing_key())
	}
}
