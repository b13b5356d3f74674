//! Single-request fetch stage shared by the discovery and key-set requests.

// crates.io
use oauth2::AsyncHttpClient;
use tokio_util::sync::CancellationToken;
// self
use crate::{
	_prelude::*,
	discovery::DiscoveryClient,
	error::{SecurityError, TransportError},
	http::{self, DiscoveryHttpClient, HttpContext},
	model::{DiscoveryDocument, JsonWebKeySet},
	obs::{self, FetchOutcome, FetchSpan, FetchStage},
	policy::BoundPolicy,
	response::{ProtocolPayload, ProtocolResponse},
};

impl ProtocolPayload for DiscoveryDocument {
	type Policy<'p> = BoundPolicy<'p>;

	fn from_http_content(http: &HttpContext, policy: &BoundPolicy<'_>) -> Result<Self> {
		let document = DiscoveryDocument::from_json(&http.body)?;

		policy.validate(&document)?;

		Ok(document)
	}
}

impl ProtocolPayload for JsonWebKeySet {
	type Policy<'p> = ();

	fn from_http_content(http: &HttpContext, _: &()) -> Result<Self> {
		Ok(JsonWebKeySet::from_json(&http.body)?)
	}
}

impl<C> DiscoveryClient<C>
where
	C: DiscoveryHttpClient,
{
	/// Sends one `GET` to `url`, racing it against `cancellation`.
	///
	/// A response that arrived from a different URL than requested passes `gate` again before
	/// its content is decoded.
	pub(super) async fn fetch<T>(
		&self,
		stage: FetchStage,
		url: &str,
		gate: &BoundPolicy<'_>,
		policy: &T::Policy<'_>,
		cancellation: &CancellationToken,
	) -> ProtocolResponse<T>
	where
		T: ProtocolPayload,
	{
		let span = FetchSpan::new(stage, url);

		obs::record_fetch_outcome(stage, FetchOutcome::Attempt);

		let response = span
			.instrument(async {
				if cancellation.is_cancelled() {
					return connection_failure(url, TransportError::Cancelled);
				}

				let request = match http::get_request(url) {
					Ok(request) => request,
					Err(e) => return connection_failure(url, TransportError::from(e)),
				};
				let handle = self.http_client.handle();

				match cancellation.run_until_cancelled(handle.call(request)).await {
					Some(Ok(response)) => {
						let http = HttpContext::from_response(url, response);

						if http.url != url
							&& let Err(e) = gate.ensure_secure(&http.url)
						{
							return gate_failure(&http.url, e);
						}

						ProtocolResponse::from_http_response(http, policy)
					},
					Some(Err(e)) => connection_failure(url, TransportError::from(e)),
					None => connection_failure(url, TransportError::Cancelled),
				}
			})
			.await;

		match &response {
			ProtocolResponse::Success { http, .. } => {
				span.record_success(http.status);
				obs::record_fetch_outcome(stage, FetchOutcome::Success);
			},
			ProtocolResponse::Error(e) => {
				span.record_failure(e);
				obs::record_fetch_outcome(stage, FetchOutcome::Failure);
			},
		}

		response
	}
}

/// Envelope for a request that never produced a response.
pub(super) fn connection_failure<T>(url: &str, fault: TransportError) -> ProtocolResponse<T> {
	let detail = fault.to_string();
	let message = format!("Error connecting to {url}. {}.", detail.trim_end_matches('.'));

	ProtocolResponse::from_exception(fault, url, message)
}

/// Envelope for a request the security gate refused to send.
pub(super) fn gate_failure<T>(url: &str, fault: SecurityError) -> ProtocolResponse<T> {
	let message = format!("Error connecting to {url}. {fault}.");

	ProtocolResponse::from_exception(fault, url, message)
}
