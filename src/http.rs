//! Transport primitives for discovery requests.
//!
//! The module exposes [`DiscoveryHttpClient`], the crate's only dependency on an HTTP stack,
//! and [`HttpContext`], the owned snapshot of a completed exchange that response envelopes
//! keep for diagnostics. Implementations hand out short-lived [`AsyncHttpClient`] handles so
//! the orchestrator can race each request against the caller's cancellation token without
//! borrowing the transport across calls.

pub use oauth2;

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
	http::{
		HeaderMap, HeaderValue, Method, Request,
		header::{ACCEPT, RETRY_AFTER},
	},
};
#[cfg(feature = "reqwest")]
use reqwest::{ClientBuilder, Request as ReqwestRequest, redirect::Policy as RedirectPolicy};
use time::format_description::well_known::Rfc2822;
// self
#[cfg(feature = "reqwest")] use crate::error::ConfigError;
use crate::_prelude::*;

/// Abstraction over HTTP transports capable of executing discovery `GET` requests.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can serve many
/// concurrent discovery calls, and the handles they return must own whatever state is
/// required so their request futures remain `Send` for the lifetime of the in-flight
/// operation.
pub trait DiscoveryHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle used for a single request.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds a handle for the next request.
	fn handle(&self) -> Self::Handle;

	/// Base address used when a request carries no explicit address.
	fn base_address(&self) -> Option<&Url> {
		None
	}
}

/// URL that finally answered a request.
///
/// Transports that follow redirects attach it to the [`HttpResponse`] extensions so the
/// security gate can re-check the address the payload actually came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectiveUrl(pub String);

/// Owned snapshot of a completed HTTP exchange.
#[derive(Clone, Debug)]
pub struct HttpContext {
	/// URL that answered; differs from the requested URL only after a redirect.
	pub url: String,
	/// HTTP status code.
	pub status: u16,
	/// Canonical reason phrase for the status, when one exists.
	pub reason: Option<String>,
	/// Response headers.
	pub headers: HeaderMap,
	/// Unparsed response body, decoded lossily as UTF-8.
	pub body: String,
}
impl HttpContext {
	/// Captures the parts of `response` worth keeping for diagnostics.
	pub fn from_response(url: impl Into<String>, response: HttpResponse) -> Self {
		let status = response.status();
		let (mut parts, body) = response.into_parts();
		let url = match parts.extensions.remove::<EffectiveUrl>() {
			Some(EffectiveUrl(effective)) => effective,
			None => url.into(),
		};

		Self {
			url,
			status: status.as_u16(),
			reason: status.canonical_reason().map(str::to_owned),
			headers: parts.headers,
			body: String::from_utf8_lossy(&body).into_owned(),
		}
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Reason phrase, falling back to the numeric status.
	pub fn reason_phrase(&self) -> String {
		self.reason.clone().unwrap_or_else(|| self.status.to_string())
	}

	/// Parses the body as JSON, if possible.
	pub fn json(&self) -> Option<serde_json::Value> {
		serde_json::from_str(&self.body).ok()
	}

	/// Retry-After hint expressed as a relative duration.
	pub fn retry_after(&self) -> Option<Duration> {
		parse_retry_after(&self.headers, OffsetDateTime::now_utc())
	}
}

/// Builds the `GET` request sent to discovery and key-set endpoints.
pub(crate) fn get_request(url: &str) -> Result<HttpRequest, oauth2::http::Error> {
	Request::builder()
		.method(Method::GET)
		.uri(url)
		.header(ACCEPT, HeaderValue::from_static("application/json"))
		.body(Vec::new())
}

/// Thin wrapper around [`ReqwestClient`] carrying an optional base address.
///
/// Discovery requests must not follow redirects: the security gate vets the URL it is handed,
/// and a redirect could hop to a host or scheme the policy forbids. [`new`](Self::new) and
/// [`with_client_builder`](Self::with_client_builder) disable redirect following; configure
/// any client passed to [`with_client`](Self::with_client) the same way.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient {
	client: ReqwestClient,
	base_address: Option<Url>,
}
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Builds a client with reqwest defaults and redirects disabled.
	pub fn new() -> Result<Self, ConfigError> {
		Self::with_client_builder(ReqwestClient::builder())
	}

	/// Finishes `builder` with redirects disabled.
	pub fn with_client_builder(builder: ClientBuilder) -> Result<Self, ConfigError> {
		Ok(Self::with_client(builder.redirect(RedirectPolicy::none()).build()?))
	}

	/// Wraps an existing reqwest [`ReqwestClient`]; it must not follow redirects.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self { client, base_address: None }
	}

	/// Sets the address used when a request carries none.
	pub fn with_base_address(mut self, base_address: Url) -> Self {
		self.base_address = Some(base_address);

		self
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.client
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.client
	}
}
#[cfg(feature = "reqwest")]
impl DiscoveryHttpClient for ReqwestHttpClient {
	type Handle = ReqwestHandle;
	type TransportError = ReqwestError;

	fn handle(&self) -> Self::Handle {
		ReqwestHandle(self.client.clone())
	}

	fn base_address(&self) -> Option<&Url> {
		self.base_address.as_ref()
	}
}

/// Handle returned by [`ReqwestHttpClient`] that satisfies [`DiscoveryHttpClient`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHandle(ReqwestClient);
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for ReqwestHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = self.0.clone();

		Box::pin(async move {
			let request: ReqwestRequest = request.try_into().map_err(Box::new)?;
			let requested = request.url().clone();
			let response = client.execute(request).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let effective = (response.url() != &requested).then(|| response.url().to_string());
			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			if let Some(effective) = effective {
				response_new.extensions_mut().insert(EffectiveUrl(effective));
			}

			Ok(response_new)
		})
	}
}

fn parse_retry_after(headers: &HeaderMap, now: OffsetDateTime) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - now;

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::{Response, StatusCode};
	use time::macros::datetime;
	// self
	use super::*;

	fn response(status: u16, body: &str) -> HttpResponse {
		let mut response = Response::new(body.as_bytes().to_vec());

		*response.status_mut() =
			StatusCode::from_u16(status).expect("Status fixture should be a valid code.");

		response
	}

	#[test]
	fn context_keeps_status_reason_and_body() {
		let ctx = HttpContext::from_response("https://idp.example.com/x", response(404, "gone"));

		assert_eq!(ctx.status, 404);
		assert_eq!(ctx.reason.as_deref(), Some("Not Found"));
		assert_eq!(ctx.body, "gone");
		assert!(!ctx.is_success());
		assert!(ctx.json().is_none());
	}

	#[test]
	fn context_reports_the_url_that_answered() {
		let mut redirected = response(200, "{}");

		redirected
			.extensions_mut()
			.insert(EffectiveUrl("http://elsewhere.example.net/doc".into()));

		let ctx = HttpContext::from_response("https://idp.example.com/doc", redirected);

		assert_eq!(ctx.url, "http://elsewhere.example.net/doc");

		let direct = HttpContext::from_response("https://idp.example.com/doc", response(200, "{}"));

		assert_eq!(direct.url, "https://idp.example.com/doc");
	}

	#[test]
	fn reason_phrase_falls_back_to_status_code() {
		let ctx = HttpContext::from_response("https://idp.example.com/x", response(599, ""));

		assert_eq!(ctx.reason_phrase(), "599");
	}

	#[test]
	fn retry_after_accepts_seconds_and_dates() {
		let mut headers = HeaderMap::new();
		let now = datetime!(2025-01-01 00:00:00 UTC);

		headers.insert(RETRY_AFTER, HeaderValue::from_static("120"));

		assert_eq!(parse_retry_after(&headers, now), Some(Duration::seconds(120)));

		headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 01 Jan 2025 00:01:00 +0000"));

		assert_eq!(parse_retry_after(&headers, now), Some(Duration::minutes(1)));

		headers.insert(RETRY_AFTER, HeaderValue::from_static("Tue, 31 Dec 2024 00:00:00 +0000"));

		assert_eq!(parse_retry_after(&headers, now), None);
	}

	#[test]
	fn get_request_asks_for_json() {
		let request = get_request("https://idp.example.com/.well-known/openid-configuration")
			.expect("Request fixture should build.");

		assert_eq!(request.method(), Method::GET);
		assert_eq!(
			request.headers().get(ACCEPT).and_then(|value| value.to_str().ok()),
			Some("application/json")
		);
	}
}
