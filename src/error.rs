//! Client-level error types shared across configuration, storage, authentication, and requests.

// std
use std::path::PathBuf;
// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Token acquisition failure.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Authenticated request failure.
	#[error(transparent)]
	Request(#[from] RequestError),
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// No authorization endpoint was configured.
	#[error("Authorization URL is missing.")]
	MissingAuthorizationUrl,
	/// No client identifier was configured.
	#[error("Client identifier is missing.")]
	MissingClientId,
	/// No client secret was configured.
	#[error("Client secret is missing.")]
	MissingClientSecret,
	/// A configured URL cannot be parsed.
	#[error("Configured URL is invalid.")]
	InvalidUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A configured URL uses a scheme other than HTTP(S).
	#[error("URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// URL that failed validation.
		url: String,
	},
	/// Configuration file could not be read.
	#[error("Failed to read configuration from {}.", path.display())]
	Load {
		/// File that failed to load.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Configuration document is malformed.
	#[error("Configuration document is malformed.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The authenticator was constructed outside a Tokio runtime.
	#[error("A Tokio runtime is required to drive token refreshes.")]
	MissingRuntime,
	/// A mandatory property is absent from a property map.
	#[error("Configuration property `{key}` is missing.")]
	MissingProperty {
		/// Fully prefixed property key.
		key: String,
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
impl From<url::ParseError> for ConfigError {
	fn from(source: url::ParseError) -> Self {
		Self::InvalidUrl { source }
	}
}

/// Transport-level failures (network, IO, timeouts).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {target}.")]
	Network {
		/// Host or URL that was being called.
		target: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The call did not complete within its timeout.
	#[error("Request to {target} timed out after {timeout:?}.")]
	Timeout {
		/// Host or URL that was being called.
		target: String,
		/// Timeout that elapsed.
		timeout: Duration,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(
		target: impl Into<String>,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { target: target.into(), source: Box::new(src) }
	}
}

/// Failures produced while obtaining a token from the authorization endpoint.
///
/// These errors surface through [`crate::auth::TokenState::RefreshFailed`] and are never
/// retried by the authenticator itself.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// Authorization endpoint answered with a non-success status.
	#[error("Authorization endpoint returned HTTP {status}: {message}.")]
	UnexpectedStatus {
		/// HTTP status code.
		status: u16,
		/// Error description or code extracted from the response body, or `n/a`.
		message: String,
	},
	/// Authorization endpoint responded with malformed JSON.
	#[error("Authorization endpoint returned a malformed token response.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// Authorization call failed at the transport layer.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Authorization request could not be assembled.
	#[error("Authorization request could not be built.")]
	Request(#[from] ::http::Error),
	/// The authenticator stopped publishing state while a caller was waiting.
	#[error("Authenticator state channel closed.")]
	Closed,
	/// The refresh task stopped before it produced a result.
	#[error("Token refresh was interrupted before completing.")]
	Interrupted,
}

/// Failures returned by [`crate::executor::RequestExecutor`].
#[derive(Debug, ThisError)]
pub enum RequestError {
	/// Data call failed at the transport layer; not retried.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Every authentication attempt was used without obtaining an accepted token.
	#[error("Authentication failed after {attempts} attempts.")]
	AuthenticationExhausted {
		/// Number of refreshes requested before giving up.
		attempts: u32,
		/// Last refresh failure observed, if the final attempt failed at the token endpoint.
		last_failure: Option<Arc<AuthError>>,
	},
	/// Protected resource answered with a non-auth error status; not retried.
	#[error("Resource returned HTTP {status}.")]
	Http {
		/// HTTP status code.
		status: u16,
		/// Raw response body.
		body: Vec<u8>,
	},
	/// Response body did not match the expected JSON shape.
	#[error("Response body could not be decoded.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Outbound request could not be assembled.
	#[error("Request could not be built.")]
	Build(#[from] ::http::Error),
}
impl RequestError {
	/// Returns the HTTP status for [`RequestError::Http`] failures.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Http { status, .. } => Some(*status),
			_ => None,
		}
	}

	/// Returns the refresh failure behind [`RequestError::AuthenticationExhausted`], if the
	/// last refresh failed at the authorization endpoint.
	pub fn auth_failure(&self) -> Option<&AuthError> {
		match self {
			Self::AuthenticationExhausted { last_failure: Some(failure), .. } => Some(failure),
			_ => None,
		}
	}
}
