//! OpenID Connect discovery for Rust relying parties: policy-gated document retrieval, JWKS
//! folding, and a uniform response envelope that never panics on provider faults.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod discovery;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod model;
pub mod obs;
pub mod policy;
pub mod response;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Shared test helpers: a proxy-free reqwest client and provider fixtures; enabled via
	//! `cfg(test)` or the `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		discovery::{DiscoveryClient, ReqwestDiscoveryClient},
		http::ReqwestHttpClient,
	};

	/// Builds a discovery client over a proxy-free reqwest transport, optionally carrying a
	/// base address.
	pub fn build_reqwest_test_client(base_address: Option<Url>) -> ReqwestDiscoveryClient {
		let mut http_client =
			ReqwestHttpClient::with_client_builder(ReqwestClient::builder().no_proxy())
				.expect("Failed to build Reqwest client for tests.");

		if let Some(base_address) = base_address {
			http_client = http_client.with_base_address(base_address);
		}

		DiscoveryClient::with_http_client(http_client)
	}

	/// Discovery document body whose issuer and endpoints live under `authority`.
	pub fn discovery_json(authority: &str, jwks_uri: Option<&str>) -> String {
		let mut document = serde_json::json!({
			"issuer": authority,
			"authorization_endpoint": format!("{authority}/connect/authorize"),
			"token_endpoint": format!("{authority}/connect/token"),
			"userinfo_endpoint": format!("{authority}/connect/userinfo"),
			"scopes_supported": ["openid", "profile", "email"],
			"response_types_supported": ["code"],
			"id_token_signing_alg_values_supported": ["RS256"],
		});

		if let Some(jwks_uri) = jwks_uri {
			document["jwks_uri"] = jwks_uri.into();
		}

		document.to_string()
	}

	/// Key set body with one RSA signing key.
	pub fn jwks_json(kid: &str) -> String {
		serde_json::json!({
			"keys": [{
				"kty": "RSA",
				"use": "sig",
				"kid": kid,
				"alg": "RS256",
				"n": "0vx7agoebGcQSuuPiLJXZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAtVT86zwu1RK7aPFFxuhDR1L6tSoc_BJECPebWKRXjBZCiFV4n3oknjhMstn64tZ_2W-5JsGY4Hc5n9yBXArwl93lqt7_RN5w6Cf0h4QyQ5v-65YGjQR0_FDW2QvzqY368QQMicAtaSqzs8KJZgnYb9c7d0zgdAZHzu6qMQvRL5hajrn1n91CbOpbISD08qNLyrdkt-bFTWhAI4vMQFh6WeZu0fM4lFd2NcRwr3XPksINHaQ-G_xBniIqbw0Ls1jF44-csFCur-kEgU8awapJzKnqDKgw",
				"e": "AQAB",
			}]
		})
		.to_string()
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use tokio_util::sync::CancellationToken;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};

pub use crate::{
	discovery::{DiscoveryClient, DiscoveryRequest, DiscoveryResponse},
	model::{DiscoveryDocument, JsonWebKey, JsonWebKeySet},
	policy::DiscoveryPolicy,
	response::{ProtocolResponse, ResponseError, ResponseErrorKind},
};
