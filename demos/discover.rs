//! Discovers an OpenID provider and prints its endpoints and signing keys.
//!
//! ```sh
//! cargo run --example discover -- https://accounts.google.com
//! ```

// std
use std::env;
// crates.io
use color_eyre::{Result, eyre::eyre};
// self
use oidc_discovery::{DiscoveryClient, DiscoveryRequest, policy::DiscoveryPolicy};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let address = env::args().nth(1).unwrap_or_else(|| "https://accounts.google.com".into());
	let client = DiscoveryClient::new()?;
	let request = DiscoveryRequest::for_address(&address)
		.with_policy(DiscoveryPolicy::default().with_validate_endpoints(false));
	let response = client.get_discovery_document(request).await?;

	if let Some(http) = response.http() {
		println!("{} answered with HTTP {}.", http.url, http.status);
	}

	let document = response.into_result().map_err(|e| eyre!("Discovery failed: {e}"))?;

	println!("Issuer: {}", document.issuer().unwrap_or("<missing>"));

	for (name, value) in document.members() {
		if name.ends_with("_endpoint")
			&& let Some(endpoint) = value.as_str()
		{
			println!("  {name}: {endpoint}");
		}
	}

	match document.key_set() {
		Some(key_set) => {
			println!("Keys ({}):", key_set.len());

			for key in &key_set.keys {
				println!(
					"  kid={} kty={} alg={}",
					key.kid.as_deref().unwrap_or("-"),
					key.kty,
					key.alg.as_deref().unwrap_or("-"),
				);
			}
		},
		None => println!("The provider publishes no jwks_uri."),
	}

	Ok(())
}
