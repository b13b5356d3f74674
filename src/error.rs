//! Discovery error types shared by the resolver, the security gate, and both fetch stages.

// crates.io
use oauth2::HttpClientError;
// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical discovery error.
///
/// Only [`Error::Config`] is ever returned as an `Err` from the discovery entry points; every
/// other variant is captured inside a [`ResponseError`](crate::response::ResponseError).
#[derive(Debug, ThisError)]
pub enum Error {
	/// Malformed call: no usable address.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The security gate refused to contact the resolved URL.
	#[error(transparent)]
	InvalidOperation(#[from] SecurityError),
	/// Transport failure (DNS, TCP, TLS, cancellation).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// A success response carried content of the wrong shape.
	#[error(transparent)]
	Json(#[from] ContentError),
	/// A well-formed document failed policy validation.
	#[error(transparent)]
	PolicyViolation(#[from] PolicyViolation),
}
impl Error {
	/// Returns `true` when the failure was caused by a cancellation request.
	pub fn is_cancelled(&self) -> bool {
		matches!(self, Self::Transport(TransportError::Cancelled))
	}
}

/// Programmer errors raised before any request is built.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Neither the request nor the transport supplied an address.
	#[error("An address is required.")]
	MissingAddress,
	/// The address is not an absolute `http`/`https` URL.
	#[error("Malformed URL: {address}.")]
	MalformedAddress {
		/// Address exactly as supplied.
		address: String,
	},
	/// The default HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Security gate rejections.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum SecurityError {
	/// The URL does not use HTTPS and no policy exception applies.
	#[error("HTTPS required")]
	HttpsRequired,
	/// The policy is bound to a different authority than the one resolved for this call.
	#[error("Authority mismatch: policy expects {expected}, request resolved to {actual}")]
	AuthorityMismatch {
		/// Authority configured on the policy.
		expected: String,
		/// Authority resolved from the request address.
		actual: String,
	},
}

/// Transport-level failures (network, IO, cancellation).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("{source}")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The target is not a parseable URL.
	#[error("Invalid URL: {0}")]
	InvalidUrl(#[from] url::ParseError),
	/// The outgoing request could not be assembled.
	#[error("Invalid request: {0}")]
	Request(#[from] oauth2::http::Error),
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
	/// HTTP client reported a failure without a typed source.
	#[error("{message}")]
	Other {
		/// Message reported by the HTTP client.
		message: String,
	},
	/// The caller cancelled the operation.
	#[error("The operation was cancelled")]
	Cancelled,
}
impl<E> From<HttpClientError<E>> for TransportError
where
	E: 'static + Send + Sync + std::error::Error,
{
	fn from(e: HttpClientError<E>) -> Self {
		match e {
			HttpClientError::Reqwest(inner) => Self::Network { source: inner },
			HttpClientError::Http(inner) => Self::Request(inner),
			HttpClientError::Io(inner) => Self::Io(inner),
			HttpClientError::Other(message) => Self::Other { message },
			other => Self::Other { message: other.to_string() },
		}
	}
}

/// Response content that could not be decoded.
#[derive(Debug, ThisError)]
pub enum ContentError {
	/// The body is not valid JSON or does not match the expected shape.
	#[error("Invalid JSON at `{}`: {}", .source.path(), .source.inner())]
	Malformed {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The body carries data after the JSON value.
	#[error("Unexpected data after the JSON value: {source}")]
	TrailingCharacters {
		/// Underlying parser failure.
		#[source]
		source: serde_json::Error,
	},
}

/// Policy checks that a discovery document failed.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum PolicyViolation {
	/// `issuer` is absent or empty.
	#[error("Issuer name is missing")]
	MissingIssuer,
	/// `issuer` differs from the bound authority.
	#[error("Issuer name does not match authority: {issuer}")]
	IssuerMismatch {
		/// Issuer reported by the provider.
		issuer: String,
	},
	/// An endpoint is not an absolute http(s) URL.
	#[error("Malformed endpoint: {endpoint}")]
	MalformedEndpoint {
		/// Offending endpoint value.
		endpoint: String,
	},
	/// An endpoint fails the secure-scheme check.
	#[error("Endpoint does not use HTTPS: {endpoint}")]
	InsecureEndpoint {
		/// Offending endpoint value.
		endpoint: String,
	},
	/// An endpoint lives outside the authority and every additional base address.
	#[error("Endpoint belongs to different authority: {endpoint}")]
	ForeignEndpoint {
		/// Offending endpoint value.
		endpoint: String,
	},
	/// `jwks_uri` is absent while the policy requires a key set.
	#[error("Key set is missing")]
	MissingKeySet,
}
