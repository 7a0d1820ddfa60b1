//! Client-level error types shared across construction, token resolution, and transport.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Construction input was missing or malformed.
	#[error(transparent)]
	Argument(#[from] ArgumentError),
	/// The request executor could not be constructed.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The token provider failed; carries the provider error verbatim.
	#[error(transparent)]
	TokenResolution(#[from] TokenError),
	/// The request executor failed. Captured credentials are already redacted.
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Construction-time argument failures. Raised synchronously, never sanitized.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ArgumentError {
	/// No resource URL was supplied.
	#[error("Must provide a resource URL.")]
	MissingResourceUrl,
	/// The resource URL was empty or not a usable template.
	#[error("The provided resource URL is invalid: {reason}.")]
	InvalidResourceUrl {
		/// Template string that failed validation.
		url: String,
		/// Why the template was rejected.
		reason: &'static str,
	},
	/// No request options were supplied.
	#[error("Must provide options.")]
	MissingOptions,
	/// No token provider was supplied.
	#[error("Must provide a token provider.")]
	MissingTokenProvider,
}

/// Request executor construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// The configured proxy URL was rejected by the transport.
	#[error("Proxy `{proxy}` is invalid.")]
	InvalidProxy {
		/// Proxy value exactly as configured.
		proxy: String,
		/// Underlying transport failure.
		#[source]
		source: BoxError,
	},
	/// HTTP client could not be constructed.
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

/// Failure reported by a [`TokenProvider`](crate::auth::TokenProvider).
///
/// Formats exactly as the wrapped provider error so callers see the provider's message
/// unchanged.
#[derive(Debug, ThisError)]
#[error("{source}")]
pub struct TokenError {
	#[source]
	source: BoxError,
}
impl TokenError {
	/// Wraps a provider-specific error.
	pub fn new(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self { source: Box::new(src) }
	}

	/// Builds an error from a plain message.
	pub fn message(message: impl Into<String>) -> Self {
		Self { source: message.into().into() }
	}
}

/// Outgoing request as seen by the transport, kept for error introspection.
///
/// Header names are lower-cased.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedRequest {
	/// HTTP method.
	pub method: String,
	/// Fully resolved URL.
	pub url: String,
	/// Headers that were sent.
	pub headers: BTreeMap<String, String>,
}
impl CapturedRequest {
	/// Returns the captured `authorization` header, if any.
	pub fn authorization(&self) -> Option<&str> {
		self.headers.get("authorization").map(String::as_str)
	}
}

/// Response received alongside a failed request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapturedResponse {
	/// HTTP status code.
	pub status: u16,
	/// Lower-cased response headers.
	pub headers: BTreeMap<String, String>,
	/// Decoded JSON body, or the raw text when it was not JSON.
	pub body: Value,
}

/// Request executor failures.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// The resource answered with a non-2xx status.
	#[error("{} {} failed with HTTP status {status}.", .request.method, .request.url)]
	Status {
		/// HTTP status code.
		status: u16,
		/// Outgoing request that triggered the failure.
		request: CapturedRequest,
		/// Response details, when available.
		response: Option<CapturedResponse>,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {} {}.", .request.method, .request.url)]
	Network {
		/// Outgoing request that triggered the failure.
		request: CapturedRequest,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The resolved resource URL cannot be parsed.
	#[error("Resource URL `{url}` cannot be resolved.")]
	InvalidUrl {
		/// Rendered URL.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A successful response carried a body that is not valid JSON.
	#[error("Response from `{url}` returned malformed JSON.")]
	Decode {
		/// Rendered URL.
		url: String,
		/// HTTP status code.
		status: u16,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error for `request`.
	pub fn network(
		request: CapturedRequest,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { request, source: Box::new(src) }
	}

	/// Returns the captured outgoing request, if this failure carries one.
	pub fn captured_request(&self) -> Option<&CapturedRequest> {
		match self {
			Self::Status { request, .. } | Self::Network { request, .. } => Some(request),
			Self::InvalidUrl { .. } | Self::Decode { .. } => None,
		}
	}

	/// Returns the HTTP status, if one was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } | Self::Decode { status, .. } => Some(*status),
			Self::Network { .. } | Self::InvalidUrl { .. } => None,
		}
	}

	pub(crate) fn captured_request_mut(&mut self) -> Option<&mut CapturedRequest> {
		match self {
			Self::Status { request, .. } | Self::Network { request, .. } => Some(request),
			Self::InvalidUrl { .. } | Self::Decode { .. } => None,
		}
	}
}
