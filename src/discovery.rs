//! Discovery orchestration: resolve the address, run the security gate, fetch the document,
//! then fetch and attach its key set.
//!
//! [`DiscoveryClient::get_discovery_document`] is a two-stage pipeline with early return.
//! Only a malformed call (no usable address) is reported through `Err`; every later failure
//! becomes a [`ProtocolResponse::Error`] so callers branch on
//! [`is_error`](ProtocolResponse::is_error) instead of matching transport faults. A failed
//! key-set stage fails the whole call even though the document itself parsed, because a
//! relying party without trustworthy keys cannot proceed.

mod fetch;

// crates.io
use tokio_util::sync::CancellationToken;
// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;
use crate::{
	_prelude::*,
	endpoint::DiscoveryEndpoint,
	error::TransportError,
	http::DiscoveryHttpClient,
	model::{DiscoveryDocument, JsonWebKeySet},
	obs::FetchStage,
	policy::DiscoveryPolicy,
	response::ProtocolResponse,
};

/// Envelope returned by a discovery call.
pub type DiscoveryResponse = ProtocolResponse<DiscoveryDocument>;

#[cfg(feature = "reqwest")]
/// Discovery client specialized for the crate's default reqwest transport.
pub type ReqwestDiscoveryClient = DiscoveryClient<ReqwestHttpClient>;

/// Per-call discovery input.
#[derive(Clone, Debug, Default)]
pub struct DiscoveryRequest {
	/// Address overriding the transport's base address.
	pub address: Option<String>,
	/// Policy applied to this call only.
	pub policy: DiscoveryPolicy,
	/// Aborts in-flight requests and prevents the key-set request once triggered.
	pub cancellation: CancellationToken,
}
impl DiscoveryRequest {
	/// Creates a request that relies on the transport's base address.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a request for `address` with the default policy.
	pub fn for_address(address: impl Into<String>) -> Self {
		Self { address: Some(address.into()), ..Self::default() }
	}

	/// Replaces the policy.
	pub fn with_policy(mut self, policy: DiscoveryPolicy) -> Self {
		self.policy = policy;

		self
	}

	/// Replaces the cancellation token.
	pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
		self.cancellation = cancellation;

		self
	}
}

/// Retrieves discovery documents through a shared transport.
///
/// The client holds nothing but the transport, so one instance can serve any number of
/// concurrent calls; each call owns its request, bound policy, and responses.
pub struct DiscoveryClient<C>
where
	C: DiscoveryHttpClient,
{
	/// HTTP client used for every outbound request.
	pub http_client: Arc<C>,
}
impl<C> DiscoveryClient<C>
where
	C: DiscoveryHttpClient,
{
	/// Creates a client over the caller-provided transport.
	pub fn with_http_client(http_client: C) -> Self {
		Self { http_client: Arc::new(http_client) }
	}

	/// Discovers `address` with the default policy and no cancellation.
	pub async fn get_discovery_document_from(
		&self,
		address: impl Into<String>,
	) -> Result<DiscoveryResponse> {
		self.get_discovery_document(DiscoveryRequest::for_address(address)).await
	}

	/// Runs the full discovery pipeline.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::MissingAddress`](crate::error::ConfigError::MissingAddress) when
	/// neither the request nor the transport supplies an address, and
	/// [`ConfigError::MalformedAddress`](crate::error::ConfigError::MalformedAddress) when the
	/// address is not an absolute http(s) URL. No request is sent in either case.
	pub async fn get_discovery_document(
		&self,
		request: DiscoveryRequest,
	) -> Result<DiscoveryResponse> {
		let DiscoveryRequest { address, policy, cancellation } = request;
		let endpoint =
			DiscoveryEndpoint::resolve(address.as_deref(), self.http_client.base_address())?;
		let url = endpoint.url;
		let bound = match policy.bind(&endpoint.authority) {
			Ok(bound) => bound,
			Err(e) => return Ok(fetch::gate_failure(&url, e)),
		};

		if let Err(e) = bound.ensure_secure(&url) {
			return Ok(fetch::gate_failure(&url, e));
		}

		let (mut document, http) = match self
			.fetch::<DiscoveryDocument>(FetchStage::Discovery, &url, &bound, &bound, &cancellation)
			.await
		{
			ProtocolResponse::Success { payload, http } => (payload, http),
			ProtocolResponse::Error(e) => return Ok(ProtocolResponse::Error(e)),
		};
		let Some(jwks_uri) = document.jwks_uri().map(str::to_owned) else {
			return Ok(ProtocolResponse::Success { payload: document, http });
		};

		if cancellation.is_cancelled() {
			return Ok(fetch::connection_failure(&jwks_uri, TransportError::Cancelled));
		}
		if let Err(e) = Url::parse(&jwks_uri) {
			return Ok(fetch::connection_failure(&jwks_uri, TransportError::from(e)));
		}
		if let Err(e) = bound.ensure_secure(&jwks_uri) {
			return Ok(fetch::gate_failure(&jwks_uri, e));
		}

		match self
			.fetch::<JsonWebKeySet>(FetchStage::KeySet, &jwks_uri, &bound, &(), &cancellation)
			.await
		{
			ProtocolResponse::Success { payload, .. } => {
				document.attach_key_set(payload);

				Ok(ProtocolResponse::Success { payload: document, http })
			},
			ProtocolResponse::Error(e) => Ok(ProtocolResponse::Error(e)),
		}
	}
}
#[cfg(feature = "reqwest")]
impl DiscoveryClient<ReqwestHttpClient> {
	/// Creates a client backed by a default reqwest transport that never follows redirects.
	pub fn new() -> Result<Self> {
		Ok(Self::with_http_client(ReqwestHttpClient::new()?))
	}
}
impl<C> Clone for DiscoveryClient<C>
where
	C: DiscoveryHttpClient,
{
	fn clone(&self) -> Self {
		Self { http_client: Arc::clone(&self.http_client) }
	}
}
impl<C> Debug for DiscoveryClient<C>
where
	C: DiscoveryHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DiscoveryClient")
			.field("base_address", &self.http_client.base_address().map(Url::as_str))
			.finish()
	}
}
