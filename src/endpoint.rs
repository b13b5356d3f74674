//! Address resolution: picks the effective discovery address and splits it into an authority
//! and a normalized discovery URL.

// self
use crate::{_prelude::*, error::ConfigError};

/// Well-known suffix appended to an authority to locate its discovery document.
pub const WELL_KNOWN_PATH: &str = ".well-known/openid-configuration";

/// Authority plus discovery URL derived from a caller-supplied address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryEndpoint {
	/// Address without the well-known suffix or a trailing slash.
	pub authority: String,
	/// Full URL of the discovery document.
	pub url: String,
}
impl DiscoveryEndpoint {
	/// Picks the explicit address when present, otherwise the transport's base address.
	pub fn resolve(address: Option<&str>, base_address: Option<&Url>) -> Result<Self, ConfigError> {
		let address = address
			.filter(|value| !value.trim().is_empty())
			.or_else(|| base_address.map(Url::as_str))
			.ok_or(ConfigError::MissingAddress)?;

		Self::parse(address)
	}

	/// Parses `input` using the standard [`WELL_KNOWN_PATH`].
	pub fn parse(input: &str) -> Result<Self, ConfigError> {
		Self::parse_with_path(input, WELL_KNOWN_PATH)
	}

	/// Parses `input`, appending `path` unless the address already ends with it.
	pub fn parse_with_path(input: &str, path: &str) -> Result<Self, ConfigError> {
		let input = input.trim();
		let malformed = || ConfigError::MalformedAddress { address: input.to_owned() };
		let parsed = Url::parse(input).map_err(|_| malformed())?;

		if !is_valid_scheme(&parsed) || parsed.host_str().is_none() {
			return Err(malformed());
		}

		let url = input.strip_suffix('/').unwrap_or(input);
		let suffix = format!("/{}", path.trim_start_matches('/'));

		if ends_with_ignore_ascii_case(url, &suffix) {
			let authority = &url[..url.len() - suffix.len()];

			Ok(Self { authority: authority.to_owned(), url: url.to_owned() })
		} else {
			Ok(Self { authority: url.to_owned(), url: format!("{url}{suffix}") })
		}
	}
}

/// Returns `true` for `http` and `https` URLs.
pub fn is_valid_scheme(url: &Url) -> bool {
	matches!(url.scheme(), "http" | "https")
}

fn ends_with_ignore_ascii_case(value: &str, suffix: &str) -> bool {
	value.len() >= suffix.len()
		&& value.as_bytes()[value.len() - suffix.len()..].eq_ignore_ascii_case(suffix.as_bytes())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn appends_well_known_path() {
		let endpoint = DiscoveryEndpoint::parse("https://idp.example.com/")
			.expect("Authority fixture should parse.");

		assert_eq!(endpoint.authority, "https://idp.example.com");
		assert_eq!(endpoint.url, "https://idp.example.com/.well-known/openid-configuration");
	}

	#[test]
	fn keeps_existing_well_known_path_and_tenant_segments() {
		let endpoint = DiscoveryEndpoint::parse(
			"https://login.example.com/tenant-a/.well-known/OpenID-Configuration",
		)
		.expect("Full discovery URL should parse.");

		assert_eq!(endpoint.authority, "https://login.example.com/tenant-a");
		assert_eq!(
			endpoint.url,
			"https://login.example.com/tenant-a/.well-known/OpenID-Configuration"
		);

		let endpoint = DiscoveryEndpoint::parse("https://login.example.com/tenant-b")
			.expect("Tenant authority should parse.");

		assert_eq!(endpoint.authority, "https://login.example.com/tenant-b");
		assert_eq!(
			endpoint.url,
			"https://login.example.com/tenant-b/.well-known/openid-configuration"
		);
	}

	#[test]
	fn suffix_must_start_a_path_segment() {
		let endpoint =
			DiscoveryEndpoint::parse("https://h.example.com/x.well-known/openid-configuration")
				.expect("Address fixture should parse.");

		assert_eq!(endpoint.authority, "https://h.example.com/x.well-known/openid-configuration");
		assert_eq!(
			endpoint.url,
			"https://h.example.com/x.well-known/openid-configuration/.well-known/openid-configuration"
		);
	}

	#[test]
	fn custom_paths_are_honored() {
		let endpoint = DiscoveryEndpoint::parse_with_path(
			"https://as.example.com",
			"/.well-known/oauth-authorization-server",
		)
		.expect("Custom path should parse.");

		assert_eq!(endpoint.url, "https://as.example.com/.well-known/oauth-authorization-server");
	}

	#[test]
	fn rejects_relative_and_non_http_addresses() {
		for address in ["idp.example.com", "ftp://idp.example.com", "/relative", "mailto:a@b.c"] {
			let err = DiscoveryEndpoint::parse(address)
				.expect_err("Malformed address fixtures must be rejected.");

			assert!(matches!(err, ConfigError::MalformedAddress { .. }), "{address}");
		}
	}

	#[test]
	fn resolve_prefers_explicit_address_then_base_address() {
		let base = Url::parse("https://base.example.com/").expect("Base fixture should parse.");
		let explicit = DiscoveryEndpoint::resolve(Some("https://explicit.example.com"), Some(&base))
			.expect("Explicit address should resolve.");

		assert_eq!(explicit.authority, "https://explicit.example.com");

		let fallback = DiscoveryEndpoint::resolve(Some("  "), Some(&base))
			.expect("Blank address should fall back to the base address.");

		assert_eq!(fallback.authority, "https://base.example.com");
		assert!(matches!(
			DiscoveryEndpoint::resolve(None, None),
			Err(ConfigError::MissingAddress)
		));
	}
}
