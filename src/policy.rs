//! Discovery security policy: HTTPS enforcement, authority binding, and document validation.
//!
//! [`DiscoveryPolicy`] is plain configuration and is never mutated by a discovery call.
//! Each call derives a [`BoundPolicy`] that pairs the configuration with the authority the
//! call resolved, so reusing one policy value across calls cannot leak a binding.

// self
use crate::{
	_prelude::*,
	endpoint::is_valid_scheme,
	error::{PolicyViolation, SecurityError},
	model::DiscoveryDocument,
};

/// How authorities, issuers, and endpoints are compared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorityValidation {
	/// Ordinal string comparison that ignores a trailing slash; endpoints must start with
	/// `{authority}/`.
	#[default]
	Exact,
	/// Parsed URL comparison of scheme, host, port, and path; endpoints must share the origin
	/// and sit under the authority's path.
	Url,
}
impl AuthorityValidation {
	/// Checks whether `issuer` names the same authority as `authority`.
	pub fn authorities_match(self, issuer: &str, authority: &str) -> bool {
		match self {
			Self::Exact => trim_slash(issuer) == trim_slash(authority),
			Self::Url => match (Url::parse(issuer), Url::parse(authority)) {
				(Ok(left), Ok(right)) =>
					same_origin(&left, &right)
						&& trim_slash(left.path()) == trim_slash(right.path()),
				_ => false,
			},
		}
	}

	/// Checks whether `endpoint` lives under any of `authorities`.
	pub fn endpoint_allowed<'a, I>(self, endpoint: &str, authorities: I) -> bool
	where
		I: IntoIterator<Item = &'a str>,
	{
		match self {
			Self::Exact => authorities.into_iter().any(|authority| {
				let authority = trim_slash(authority);

				endpoint == authority
					|| endpoint.strip_prefix(authority).is_some_and(|rest| rest.starts_with('/'))
			}),
			Self::Url => {
				let Ok(endpoint) = Url::parse(endpoint) else {
					return false;
				};

				authorities.into_iter().filter_map(|authority| Url::parse(authority).ok()).any(
					|authority| {
						let base = trim_slash(authority.path());

						same_origin(&endpoint, &authority)
							&& (base.is_empty()
								|| endpoint.path() == base
								|| endpoint
									.path()
									.strip_prefix(base)
									.is_some_and(|rest| rest.starts_with('/')))
					},
				)
			},
		}
	}
}

/// Security and validation options applied to a discovery call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryPolicy {
	/// Authority the caller expects; binds to the resolved authority when unset.
	pub authority: Option<String>,
	/// Rejects non-HTTPS URLs unless a loopback exception applies.
	pub require_https: bool,
	/// Allows plain HTTP for hosts listed in [`loopback_addresses`](Self::loopback_addresses).
	pub allow_http_on_loopback: bool,
	/// Host names treated as loopback.
	pub loopback_addresses: Vec<String>,
	/// Requires `issuer` to match the bound authority.
	pub validate_issuer_name: bool,
	/// Requires endpoints to be secure and to live under an allowed authority.
	pub validate_endpoints: bool,
	/// Document members skipped by endpoint validation.
	pub endpoint_validation_exclude_list: Vec<String>,
	/// Extra authorities endpoints may live under.
	pub additional_endpoint_base_addresses: Vec<String>,
	/// Rejects documents without `jwks_uri`.
	pub require_key_set: bool,
	/// Comparison used for issuer and endpoint checks.
	pub authority_validation: AuthorityValidation,
}
impl DiscoveryPolicy {
	/// Expects the provider to be `authority`.
	pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
		self.authority = Some(authority.into());

		self
	}

	/// Overrides the HTTPS requirement.
	pub fn with_require_https(mut self, require_https: bool) -> Self {
		self.require_https = require_https;

		self
	}

	/// Overrides the loopback exception.
	pub fn with_allow_http_on_loopback(mut self, allow: bool) -> Self {
		self.allow_http_on_loopback = allow;

		self
	}

	/// Overrides issuer validation.
	pub fn with_validate_issuer_name(mut self, validate: bool) -> Self {
		self.validate_issuer_name = validate;

		self
	}

	/// Overrides endpoint validation.
	pub fn with_validate_endpoints(mut self, validate: bool) -> Self {
		self.validate_endpoints = validate;

		self
	}

	/// Skips endpoint validation for the named member.
	pub fn exclude_endpoint(mut self, member: impl Into<String>) -> Self {
		self.endpoint_validation_exclude_list.push(member.into());

		self
	}

	/// Allows endpoints under an additional base address.
	pub fn allow_endpoint_base_address(mut self, address: impl Into<String>) -> Self {
		self.additional_endpoint_base_addresses.push(address.into());

		self
	}

	/// Overrides the key-set requirement.
	pub fn with_require_key_set(mut self, require: bool) -> Self {
		self.require_key_set = require;

		self
	}

	/// Overrides the authority comparison.
	pub fn with_authority_validation(mut self, validation: AuthorityValidation) -> Self {
		self.authority_validation = validation;

		self
	}

	/// Checks whether `url` may be contacted under this policy.
	pub fn is_secure_scheme(&self, url: &Url) -> bool {
		if !self.require_https {
			return true;
		}
		if self.allow_http_on_loopback
			&& let Some(host) = url.host_str()
			&& self.loopback_addresses.iter().any(|address| address.eq_ignore_ascii_case(host))
		{
			return true;
		}

		url.scheme() == "https"
	}

	/// Pairs the policy with the authority resolved for one call.
	///
	/// An unset authority binds to `resolved`; a set authority must match it.
	pub fn bind(&self, resolved: &str) -> Result<BoundPolicy<'_>, SecurityError> {
		match self.authority.as_deref().filter(|value| !value.trim().is_empty()) {
			None => Ok(BoundPolicy { policy: self, authority: resolved.to_owned() }),
			Some(expected) if self.authority_validation.authorities_match(expected, resolved) =>
				Ok(BoundPolicy { policy: self, authority: expected.to_owned() }),
			Some(expected) => Err(SecurityError::AuthorityMismatch {
				expected: expected.to_owned(),
				actual: resolved.to_owned(),
			}),
		}
	}
}
impl Default for DiscoveryPolicy {
	fn default() -> Self {
		Self {
			authority: None,
			require_https: true,
			allow_http_on_loopback: true,
			loopback_addresses: vec!["localhost".into(), "127.0.0.1".into()],
			validate_issuer_name: true,
			validate_endpoints: true,
			endpoint_validation_exclude_list: Vec::new(),
			additional_endpoint_base_addresses: Vec::new(),
			require_key_set: false,
			authority_validation: AuthorityValidation::default(),
		}
	}
}

/// A [`DiscoveryPolicy`] bound to the authority of a single call.
#[derive(Clone, Debug)]
pub struct BoundPolicy<'a> {
	/// Underlying configuration.
	pub policy: &'a DiscoveryPolicy,
	/// Authority every check compares against.
	pub authority: String,
}
impl BoundPolicy<'_> {
	/// Runs the security gate against `url`.
	pub fn ensure_secure(&self, url: &str) -> Result<(), SecurityError> {
		match Url::parse(url) {
			Ok(parsed) if self.policy.is_secure_scheme(&parsed) => Ok(()),
			_ => Err(SecurityError::HttpsRequired),
		}
	}

	/// Validates a parsed discovery document.
	pub fn validate(&self, document: &DiscoveryDocument) -> Result<(), PolicyViolation> {
		let policy = self.policy;

		if policy.validate_issuer_name {
			let issuer = document
				.issuer()
				.filter(|value| !value.trim().is_empty())
				.ok_or(PolicyViolation::MissingIssuer)?;

			if !policy.authority_validation.authorities_match(issuer, &self.authority) {
				return Err(PolicyViolation::IssuerMismatch { issuer: issuer.to_owned() });
			}
		}
		if policy.validate_endpoints {
			self.validate_endpoints(document)?;
		}
		if policy.require_key_set && document.jwks_uri().is_none() {
			return Err(PolicyViolation::MissingKeySet);
		}

		Ok(())
	}

	fn validate_endpoints(&self, document: &DiscoveryDocument) -> Result<(), PolicyViolation> {
		let policy = self.policy;
		let allowed = || {
			std::iter::once(self.authority.as_str())
				.chain(policy.additional_endpoint_base_addresses.iter().map(String::as_str))
		};

		for (name, value) in document.members() {
			if !is_endpoint_member(name)
				|| policy.endpoint_validation_exclude_list.iter().any(|excluded| excluded == name)
			{
				continue;
			}

			let endpoint = match value {
				serde_json::Value::String(value) => value.clone(),
				other => other.to_string(),
			};
			let parsed = Url::parse(&endpoint)
				.ok()
				.filter(is_valid_scheme)
				.ok_or_else(|| PolicyViolation::MalformedEndpoint { endpoint: endpoint.clone() })?;

			if !policy.is_secure_scheme(&parsed) {
				return Err(PolicyViolation::InsecureEndpoint { endpoint });
			}
			if !policy.authority_validation.endpoint_allowed(&endpoint, allowed()) {
				return Err(PolicyViolation::ForeignEndpoint { endpoint });
			}
		}

		Ok(())
	}
}

fn is_endpoint_member(name: &str) -> bool {
	name.to_ascii_lowercase().ends_with("endpoint")
		|| name == "jwks_uri"
		|| name == "check_session_iframe"
}

fn trim_slash(value: &str) -> &str {
	value.strip_suffix('/').unwrap_or(value)
}

fn same_origin(left: &Url, right: &Url) -> bool {
	left.scheme() == right.scheme()
		&& left.host_str() == right.host_str()
		&& left.port_or_known_default() == right.port_or_known_default()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("URL fixture should parse.")
	}

	fn document(json: serde_json::Value) -> DiscoveryDocument {
		DiscoveryDocument::from_json(&json.to_string()).expect("Document fixture should parse.")
	}

	#[test]
	fn default_policy_requires_https_with_loopback_exception() {
		let policy = DiscoveryPolicy::default();

		assert!(policy.is_secure_scheme(&url("https://idp.example.com")));
		assert!(!policy.is_secure_scheme(&url("http://idp.example.com")));
		assert!(policy.is_secure_scheme(&url("http://localhost:8080")));
		assert!(policy.is_secure_scheme(&url("http://127.0.0.1:9000")));

		let strict = policy.clone().with_allow_http_on_loopback(false);

		assert!(!strict.is_secure_scheme(&url("http://localhost:8080")));

		let relaxed = policy.with_require_https(false);

		assert!(relaxed.is_secure_scheme(&url("http://idp.example.com")));
	}

	#[test]
	fn bind_uses_resolved_authority_without_mutating_policy() {
		let policy = DiscoveryPolicy::default();
		let bound = policy.bind("https://a.example").expect("Unset authority should bind.");

		assert_eq!(bound.authority, "https://a.example");
		assert!(policy.authority.is_none());
		assert!(policy.bind("https://b.example").is_ok());
	}

	#[test]
	fn bind_rejects_mismatched_authority() {
		let policy = DiscoveryPolicy::default().with_authority("https://a.example");
		let err = policy.bind("https://b.example").expect_err("Mismatch must be rejected.");

		assert_eq!(
			err,
			SecurityError::AuthorityMismatch {
				expected: "https://a.example".into(),
				actual: "https://b.example".into(),
			}
		);
		assert!(policy.bind("https://a.example/").is_ok());
	}

	#[test]
	fn url_validation_normalizes_host_case_and_default_port() {
		let validation = AuthorityValidation::Url;

		assert!(validation.authorities_match("https://IDP.example.com:443/", "https://idp.example.com"));
		assert!(
			!validation.authorities_match("https://idp.example.com/a", "https://idp.example.com/b")
		);

		let tenant = ["https://idp.example.com/a"];

		assert!(validation.endpoint_allowed("https://idp.example.com/a/token", tenant));
		assert!(!validation.endpoint_allowed("https://idp.example.com/ab/token", tenant));
	}

	#[test]
	fn exact_validation_requires_path_boundary() {
		let validation = AuthorityValidation::Exact;

		assert!(validation.endpoint_allowed("https://a.example/token", ["https://a.example/"]));
		assert!(!validation.endpoint_allowed("https://a.example.evil/token", ["https://a.example"]));
	}

	#[test]
	fn validate_checks_issuer_endpoints_and_key_set() {
		let policy = DiscoveryPolicy::default();
		let bound = policy.bind("https://idp.example.com").expect("Policy should bind.");
		let valid = document(serde_json::json!({
			"issuer": "https://idp.example.com",
			"authorization_endpoint": "https://idp.example.com/authorize",
			"token_endpoint": "https://idp.example.com/token",
			"jwks_uri": "https://idp.example.com/jwks",
		}));

		assert_eq!(bound.validate(&valid), Ok(()));

		let missing = document(serde_json::json!({ "token_endpoint": "https://idp.example.com/t" }));

		assert_eq!(bound.validate(&missing), Err(PolicyViolation::MissingIssuer));

		let foreign_issuer = document(serde_json::json!({ "issuer": "https://other.example.com" }));

		assert!(matches!(
			bound.validate(&foreign_issuer),
			Err(PolicyViolation::IssuerMismatch { .. })
		));

		let insecure = document(serde_json::json!({
			"issuer": "https://idp.example.com",
			"token_endpoint": "http://idp.example.com/token",
		}));

		assert!(matches!(bound.validate(&insecure), Err(PolicyViolation::InsecureEndpoint { .. })));

		let malformed = document(serde_json::json!({
			"issuer": "https://idp.example.com",
			"userinfo_endpoint": "not a url",
		}));

		assert!(matches!(
			bound.validate(&malformed),
			Err(PolicyViolation::MalformedEndpoint { .. })
		));

		let foreign = document(serde_json::json!({
			"issuer": "https://idp.example.com",
			"jwks_uri": "https://keys.example.net/jwks",
		}));

		assert!(matches!(bound.validate(&foreign), Err(PolicyViolation::ForeignEndpoint { .. })));
	}

	#[test]
	fn validate_honors_exclusions_additional_bases_and_key_set_requirement() {
		let policy = DiscoveryPolicy::default()
			.exclude_endpoint("end_session_endpoint")
			.allow_endpoint_base_address("https://keys.example.net");
		let bound = policy.bind("https://idp.example.com").expect("Policy should bind.");
		let doc = document(serde_json::json!({
			"issuer": "https://idp.example.com",
			"end_session_endpoint": "https://logout.example.org/end",
			"jwks_uri": "https://keys.example.net/jwks",
		}));

		assert_eq!(bound.validate(&doc), Ok(()));

		let strict = DiscoveryPolicy::default().with_require_key_set(true);
		let bound = strict.bind("https://idp.example.com").expect("Policy should bind.");
		let keyless = document(serde_json::json!({ "issuer": "https://idp.example.com" }));

		assert_eq!(bound.validate(&keyless), Err(PolicyViolation::MissingKeySet));
	}

	#[test]
	fn policy_deserializes_with_defaults() {
		let policy = serde_json::from_str::<DiscoveryPolicy>(
			r#"{"authority":"https://idp.example.com","require_key_set":true}"#,
		)
		.expect("Partial policy should deserialize.");

		assert_eq!(policy.authority.as_deref(), Some("https://idp.example.com"));
		assert!(policy.require_key_set);
		assert!(policy.require_https);
		assert_eq!(policy.loopback_addresses, ["localhost", "127.0.0.1"]);
	}
}
