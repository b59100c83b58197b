//! Transport primitives shared by the authenticator and the request executor.
//!
//! [`HttpTransport`] is the crate's only dependency on an HTTP stack. Requests and responses
//! use the `http` crate's types with fully buffered bodies, so custom transports (and test
//! doubles) stay small. [`ApiRequest`] describes a protected request independently of any
//! attempt, which lets the executor rebuild it with a fresh bearer token on every retry.

// crates.io
use ::http::{
	HeaderMap, HeaderName, HeaderValue, Method,
	header::{ACCEPT, ACCEPT_CHARSET},
};
// self
use crate::{_prelude::*, error::TransportError};

/// Fully buffered outbound request.
pub type HttpRequest = ::http::Request<Vec<u8>>;
/// Fully buffered inbound response.
pub type HttpResponse = ::http::Response<Vec<u8>>;
/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks able to execute one buffered request.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared by the
/// authenticator's background refresh task and any number of concurrent requests.
/// Implementations must not follow authentication challenges or retry on their own; the
/// executor owns that policy.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request`, failing with [`TransportError::Timeout`] once `timeout` elapses.
	///
	/// Any HTTP status, including 4xx and 5xx, is a successful transport outcome.
	fn execute(&self, request: HttpRequest, timeout: Duration) -> TransportFuture<'_>;
}
impl<T> HttpTransport for Arc<T>
where
	T: ?Sized + HttpTransport,
{
	fn execute(&self, request: HttpRequest, timeout: Duration) -> TransportFuture<'_> {
		(**self).execute(request, timeout)
	}
}

/// Description of a protected request, reusable across retry attempts.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Target URL.
	pub url: Url,
	/// Additional headers; `Authorization`, `Accept`, and `Accept-Charset` are managed by the
	/// executor.
	pub headers: HeaderMap,
	/// Request body.
	pub body: Vec<u8>,
}
impl ApiRequest {
	/// Creates a request with an empty body.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: HeaderMap::new(), body: Vec::new() }
	}

	/// Creates a `GET` request.
	pub fn get(url: Url) -> Self {
		Self::new(Method::GET, url)
	}

	/// Creates a `POST` request carrying `body`.
	pub fn post(url: Url, body: impl Into<Vec<u8>>) -> Self {
		Self { body: body.into(), ..Self::new(Method::POST, url) }
	}

	/// Adds or replaces a header.
	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Builds the outbound request for one attempt, attaching JSON negotiation headers and the
	/// provided authorization value.
	pub(crate) fn to_http(&self, authorization: HeaderValue) -> Result<HttpRequest, ::http::Error> {
		let mut builder = ::http::Request::builder().method(self.method.clone()).uri(self.url.as_str());

		if let Some(headers) = builder.headers_mut() {
			headers.extend(self.headers.clone());
			headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
			headers.insert(ACCEPT_CHARSET, HeaderValue::from_static("utf-8"));
			headers.insert(::http::header::AUTHORIZATION, authorization);
		}

		builder.body(self.body.clone())
	}
}

/// Short description of a request target for logs and errors.
pub(crate) fn target_of(request: &HttpRequest) -> String {
	let uri = request.uri();

	match (uri.host(), uri.path()) {
		(Some(host), path) => format!("{host}{path}"),
		(None, path) => path.to_owned(),
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The default client does not follow redirects; token endpoints and catalog endpoints answer
/// directly, and a redirect must never carry the `Authorization` header to another host.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a transport with the crate's default client settings.
	pub fn new() -> Result<Self, crate::error::ConfigError> {
		let client = ReqwestClient::builder().redirect(reqwest::redirect::Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn execute(&self, request: HttpRequest, timeout: Duration) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let target = target_of(&request);
			let mut request = reqwest::Request::try_from(request)
				.map_err(|e| TransportError::network(target.clone(), e))?;

			*request.timeout_mut() = Some(timeout);

			let response = client.execute(request).await.map_err(|e| map_reqwest_error(&target, timeout, e))?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await.map_err(|e| map_reqwest_error(&target, timeout, e))?;
			let mut mapped = HttpResponse::new(body.to_vec());

			*mapped.status_mut() = status;
			*mapped.headers_mut() = headers;

			Ok(mapped)
		})
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(target: &str, timeout: Duration, err: ReqwestError) -> TransportError {
	if err.is_timeout() {
		TransportError::Timeout { target: target.to_owned(), timeout }
	} else {
		TransportError::network(target, err)
	}
}
