//! Client-level error types shared by the pipeline, the authorizer, and the Beer operations.

// self
use crate::{_prelude::*, auth::TokenRecordBuilderError, registration::RegistrationError};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error surfaced by every public client operation.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem detected while wiring the client.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// No access token could be obtained; the request was never sent.
	#[error(transparent)]
	Authorization(#[from] AuthorizationError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Remote API answered with a status or shape the operation cannot accept.
	#[error(transparent)]
	Remote(#[from] RemoteError),

	/// Item-scoped request answered with `404 Not Found`.
	#[error("Resource was not found at {url}.")]
	NotFound {
		/// Request URL that produced the 404.
		url: String,
	},
	/// Response body did not match the expected JSON shape.
	#[error("Response body could not be decoded.")]
	Decode {
		/// Structured parsing failure, including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status of the decoded response.
		status: u16,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be encoded.")]
	Encode(#[source] serde_json::Error),
	/// Update requires a beer that already carries a server-assigned id.
	#[error("Beer must carry an id to be updated.")]
	MissingBeerId,
}
impl Error {
	/// Returns the HTTP status associated with the failure, when one is known.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::NotFound { .. } => Some(404),
			Self::Remote(e) => Some(e.status()),
			Self::Decode { status, .. } => Some(*status),
			Self::Authorization(AuthorizationError::TokenEndpoint { status, .. }) => *status,
			_ => None,
		}
	}

	/// Returns `true` for the [`Error::NotFound`] variant.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound { .. })
	}
}

/// Configuration and validation failures raised while wiring the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Requested registration key is not configured.
	#[error("Client registration `{registration}` is not configured.")]
	UnknownRegistration {
		/// Registration key that failed to resolve.
		registration: String,
	},
	/// Registration failed validation.
	#[error(transparent)]
	InvalidRegistration(#[from] RegistrationError),
	/// API base URL is unusable.
	#[error("Base URL `{url}` must be an absolute http(s) URL.")]
	InvalidBaseUrl {
		/// Offending URL string.
		url: String,
	},
	/// A request URL could not be derived from the base URL.
	#[error("Request URL could not be built.")]
	InvalidRequestUrl(#[from] url::ParseError),
	/// Issued token cannot be encoded as an HTTP header value.
	#[error("Access token contains characters that are not valid in an HTTP header.")]
	InvalidToken,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures that prevent the pipeline from obtaining an access token.
#[derive(Debug, ThisError)]
pub enum AuthorizationError {
	/// Registration key is unknown to the authorizer.
	#[error("Client registration `{registration}` is not known to the authorizer.")]
	UnknownRegistration {
		/// Registration key that failed to resolve.
		registration: String,
	},
	/// Token endpoint rejected the client credentials.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Provider- or client-supplied reason string.
		reason: String,
	},
	/// Token endpoint rejected the grant or the requested scopes.
	#[error("Token endpoint rejected the grant: {reason}.")]
	InvalidGrant {
		/// Provider- or client-supplied reason string.
		reason: String,
	},
	/// Token endpoint returned an unexpected but well-formed failure.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Token endpoint responded with malformed JSON.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token response parsed but is unusable (missing or invalid `expires_in`, empty token).
	#[error("Token response is unusable: {reason}.")]
	InvalidTokenResponse {
		/// What made the response unusable.
		reason: &'static str,
	},
	/// Token request could not be constructed.
	#[error("Token request could not be built.")]
	Request(#[from] oauth2::http::Error),
	/// Network failure while calling the token endpoint.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Token cache backend failed.
	#[error(transparent)]
	Cache(#[from] crate::cache::CacheError),
}
impl From<TokenRecordBuilderError> for AuthorizationError {
	fn from(e: TokenRecordBuilderError) -> Self {
		Self::InvalidTokenResponse { reason: e.reason() }
	}
}

/// Remote API responses the client cannot accept.
#[derive(Debug, ThisError)]
pub enum RemoteError {
	/// Non-2xx status.
	#[error("Remote API responded with HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Response body kept for diagnostics.
		body: String,
	},
	/// Create succeeded but the response lacks a `Location` header.
	#[error("Remote API responded with HTTP {status} but no Location header.")]
	MissingLocation {
		/// HTTP status code of the create response.
		status: u16,
	},
	/// Create succeeded but the `Location` header cannot be resolved.
	#[error("Remote API returned an unusable Location header `{location}`.")]
	InvalidLocation {
		/// HTTP status code of the create response.
		status: u16,
		/// Raw header value.
		location: String,
	},
}
impl RemoteError {
	/// HTTP status carried by every variant.
	pub fn status(&self) -> u16 {
		match self {
			Self::Status { status, .. }
			| Self::MissingLocation { status }
			| Self::InvalidLocation { status, .. } => *status,
		}
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while sending the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while sending the request.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_is_exposed_for_http_failures() {
		let not_found = Error::NotFound { url: "http://localhost/api/v1/beer/1".into() };
		let remote: Error = RemoteError::Status { status: 503, body: "down".into() }.into();
		let missing: Error = RemoteError::MissingLocation { status: 201 }.into();
		let auth: Error =
			AuthorizationError::InvalidClient { reason: "bad secret".into() }.into();

		assert!(not_found.is_not_found());
		assert_eq!(not_found.status(), Some(404));
		assert_eq!(remote.status(), Some(503));
		assert_eq!(missing.status(), Some(201));
		assert_eq!(auth.status(), None);
	}

	#[test]
	fn transport_error_keeps_source() {
		let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
		let err: Error = TransportError::network(io).into();
		let source = StdError::source(&err).expect("Transport error should expose its source.");

		assert_eq!(source.to_string(), "refused");
	}
}
