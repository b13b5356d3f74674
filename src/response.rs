//! Uniform success/error envelope returned by discovery calls.
//!
//! Failures after address resolution never surface as `Err`: they are captured in a
//! [`ResponseError`] built through exactly one of two paths,
//! [`ProtocolResponse::from_exception`] for faults raised before or during an exchange and
//! [`ProtocolResponse::from_http_response`] for completed exchanges whose status or content
//! is unacceptable. The error kind is always derived from the underlying [`Error`], so the
//! taxonomy below is exhaustive.

// self
use crate::{_prelude::*, http::HttpContext};

/// Error categories reported by a [`ResponseError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseErrorKind {
	/// The security gate refused the request; nothing was sent.
	InvalidOperation,
	/// Transport fault or cancellation.
	Exception,
	/// The exchange completed with a non-success status.
	Http,
	/// A success response carried malformed JSON.
	Json,
	/// A success response failed policy validation.
	PolicyViolation,
}
impl ResponseErrorKind {
	/// Returns a stable label suitable for logs and metrics.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::InvalidOperation => "invalid_operation",
			Self::Exception => "exception",
			Self::Http => "http",
			Self::Json => "json",
			Self::PolicyViolation => "policy_violation",
		}
	}
}
impl Display for ResponseErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl From<&Error> for ResponseErrorKind {
	fn from(e: &Error) -> Self {
		match e {
			// Discovery raises config errors; wrapped by hand they read as refused calls.
			Error::Config(_) | Error::InvalidOperation(_) => Self::InvalidOperation,
			Error::Transport(_) => Self::Exception,
			Error::Json(_) => Self::Json,
			Error::PolicyViolation(_) => Self::PolicyViolation,
		}
	}
}

/// Failure half of a [`ProtocolResponse`].
#[derive(Clone, Debug)]
pub struct ResponseError {
	/// Error category.
	pub kind: ResponseErrorKind,
	/// Human-readable message naming the contacted URL.
	pub message: String,
	/// URL that was being contacted.
	pub url: String,
	/// Raw exchange, when the server answered.
	pub http: Option<HttpContext>,
	/// Underlying fault; absent for plain HTTP status failures.
	pub source: Option<Arc<Error>>,
}
impl ResponseError {
	/// Returns `true` when the call stopped because of a cancellation request.
	pub fn is_cancelled(&self) -> bool {
		self.source.as_deref().is_some_and(Error::is_cancelled)
	}
}
impl Display for ResponseError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.message)
	}
}
impl StdError for ResponseError {
	fn source(&self) -> Option<&(dyn StdError + 'static)> {
		self.source.as_deref().map(|e| e as &(dyn StdError + 'static))
	}
}

/// Payloads that can be decoded from a successful exchange.
pub trait ProtocolPayload
where
	Self: Sized,
{
	/// Validation context applied while decoding.
	type Policy<'p>;

	/// Decodes and validates the response content.
	fn from_http_content(http: &HttpContext, policy: &Self::Policy<'_>) -> Result<Self>;
}

/// Tagged result of one protocol exchange.
#[derive(Clone, Debug)]
pub enum ProtocolResponse<T> {
	/// The payload decoded and passed validation.
	Success {
		/// Decoded payload.
		payload: T,
		/// Raw exchange.
		http: HttpContext,
	},
	/// The exchange failed.
	Error(ResponseError),
}
impl<T> ProtocolResponse<T> {
	/// Wraps a fault that prevented a usable exchange.
	pub fn from_exception(
		fault: impl Into<Error>,
		url: impl Into<String>,
		message: impl Into<String>,
	) -> Self {
		let fault = fault.into();

		Self::Error(ResponseError {
			kind: ResponseErrorKind::from(&fault),
			message: message.into(),
			url: url.into(),
			http: None,
			source: Some(Arc::new(fault)),
		})
	}

	/// Wraps a completed exchange, decoding the payload when the status is a success.
	pub fn from_http_response(http: HttpContext, policy: &T::Policy<'_>) -> Self
	where
		T: ProtocolPayload,
	{
		if !http.is_success() {
			return Self::Error(ResponseError {
				kind: ResponseErrorKind::Http,
				message: format!("Error connecting to {}: {}", http.url, http.reason_phrase()),
				url: http.url.clone(),
				http: Some(http),
				source: None,
			});
		}

		match T::from_http_content(&http, policy) {
			Ok(payload) => Self::Success { payload, http },
			Err(fault) => {
				let message = match &fault {
					Error::PolicyViolation(violation) =>
						format!("Error validating response from {}. {violation}.", http.url),
					other => format!("Error parsing response from {}. {other}.", http.url),
				};

				Self::Error(ResponseError {
					kind: ResponseErrorKind::from(&fault),
					message,
					url: http.url.clone(),
					http: Some(http),
					source: Some(Arc::new(fault)),
				})
			},
		}
	}

	/// Returns `true` for the error variant.
	pub fn is_error(&self) -> bool {
		matches!(self, Self::Error(_))
	}

	/// Error category, if any.
	pub fn error_kind(&self) -> Option<ResponseErrorKind> {
		self.error().map(|e| e.kind)
	}

	/// Error message, if any.
	pub fn error_message(&self) -> Option<&str> {
		self.error().map(|e| e.message.as_str())
	}

	/// Error half, if any.
	pub fn error(&self) -> Option<&ResponseError> {
		match self {
			Self::Success { .. } => None,
			Self::Error(e) => Some(e),
		}
	}

	/// Decoded payload, if any.
	pub fn payload(&self) -> Option<&T> {
		match self {
			Self::Success { payload, .. } => Some(payload),
			Self::Error(_) => None,
		}
	}

	/// Raw exchange, when the server answered.
	pub fn http(&self) -> Option<&HttpContext> {
		match self {
			Self::Success { http, .. } => Some(http),
			Self::Error(e) => e.http.as_ref(),
		}
	}

	/// HTTP status code, when the server answered.
	pub fn status(&self) -> Option<u16> {
		self.http().map(|http| http.status)
	}

	/// Converts into a standard [`Result`].
	pub fn into_result(self) -> Result<T, ResponseError> {
		match self {
			Self::Success { payload, .. } => Ok(payload),
			Self::Error(e) => Err(e),
		}
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::HeaderMap;
	// self
	use super::*;
	use crate::{
		error::{ConfigError, PolicyViolation, SecurityError, TransportError},
		model::parse_json,
	};

	#[derive(Debug)]
	struct Echo(String);
	impl ProtocolPayload for Echo {
		type Policy<'p> = bool;

		fn from_http_content(http: &HttpContext, strict: &bool) -> Result<Self> {
			if *strict && http.body.is_empty() {
				return Err(PolicyViolation::MissingIssuer.into());
			}

			parse_json::<String>(&http.body).map(Echo).map_err(Error::from)
		}
	}

	fn context(status: u16, body: &str) -> HttpContext {
		HttpContext {
			url: "https://idp.example.com/x".into(),
			status,
			reason: Some("Reason".into()),
			headers: HeaderMap::new(),
			body: body.into(),
		}
	}

	#[test]
	fn from_exception_derives_kind_from_fault() {
		let response = <ProtocolResponse<Echo>>::from_exception(
			SecurityError::HttpsRequired,
			"http://idp.example.com",
			"Error connecting to http://idp.example.com. HTTPS required.",
		);

		assert_eq!(response.error_kind(), Some(ResponseErrorKind::InvalidOperation));
		assert!(response.http().is_none());

		let cancelled = <ProtocolResponse<Echo>>::from_exception(
			TransportError::Cancelled,
			"https://idp.example.com",
			"cancelled",
		);

		assert_eq!(cancelled.error_kind(), Some(ResponseErrorKind::Exception));
		assert!(cancelled.error().is_some_and(ResponseError::is_cancelled));
	}

	#[test]
	fn every_fault_maps_to_an_envelope_kind() {
		let cases = [
			(Error::from(ConfigError::MissingAddress), ResponseErrorKind::InvalidOperation),
			(Error::from(SecurityError::HttpsRequired), ResponseErrorKind::InvalidOperation),
			(Error::from(TransportError::Cancelled), ResponseErrorKind::Exception),
			(Error::from(PolicyViolation::MissingKeySet), ResponseErrorKind::PolicyViolation),
		];

		for (fault, kind) in cases {
			assert_eq!(ResponseErrorKind::from(&fault), kind, "{fault}");
		}
	}

	#[test]
	fn from_http_response_maps_status_content_and_policy() {
		let failed = <ProtocolResponse<Echo>>::from_http_response(context(503, ""), &false);

		assert_eq!(failed.error_kind(), Some(ResponseErrorKind::Http));
		assert_eq!(
			failed.error_message(),
			Some("Error connecting to https://idp.example.com/x: Reason")
		);
		assert_eq!(failed.status(), Some(503));

		let malformed = <ProtocolResponse<Echo>>::from_http_response(context(200, "{"), &false);

		assert_eq!(malformed.error_kind(), Some(ResponseErrorKind::Json));
		assert_eq!(malformed.status(), Some(200));

		let violated = <ProtocolResponse<Echo>>::from_http_response(context(200, ""), &true);

		assert_eq!(violated.error_kind(), Some(ResponseErrorKind::PolicyViolation));
		assert!(
			violated
				.error_message()
				.is_some_and(|message| message.contains("Issuer name is missing"))
		);

		let ok = <ProtocolResponse<Echo>>::from_http_response(context(200, "\"hi\""), &true);

		assert_eq!(ok.payload().map(|echo| echo.0.as_str()), Some("hi"));
		assert!(ok.into_result().is_ok());
	}
}
