//! Authenticated request execution with rejection-aware retries.
//!
//! [`RequestExecutor`] attaches the authenticator's bearer token to every attempt. When the
//! token is missing or a resource server rejects it (401/403), the executor requests a
//! refresh delayed by the [`RetryPolicy`] backoff, waits for it, and retries. Every other
//! outcome, including transport failures and non-auth error statuses, returns to the caller
//! unchanged.

// crates.io
use ::http::StatusCode;
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{TokenSecret, TokenState},
	authenticator::Authenticator,
	error::RequestError,
	http::{ApiRequest, HttpTransport},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	retry::{RetryContext, RetryPolicy},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends protected requests on behalf of one [`Authenticator`].
pub struct RequestExecutor<T>
where
	T: ?Sized + HttpTransport,
{
	authenticator: Authenticator<T>,
	transport: Arc<T>,
	policy: RetryPolicy,
	timeout: Duration,
}
impl<T> RequestExecutor<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates an executor with the default retry policy and a 30 second timeout.
	pub fn new(authenticator: Authenticator<T>, transport: Arc<T>) -> Self {
		Self { authenticator, transport, policy: RetryPolicy::default(), timeout: REQUEST_TIMEOUT }
	}

	/// Overrides the retry policy.
	pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
		self.policy = policy;

		self
	}

	/// Overrides the per-attempt timeout.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Authenticator shared by this executor.
	pub fn authenticator(&self) -> &Authenticator<T> {
		&self.authenticator
	}

	/// Retry policy in use.
	pub fn policy(&self) -> RetryPolicy {
		self.policy
	}

	/// Sends `request` and returns the response body of the first accepted attempt.
	pub async fn execute(&self, request: &ApiRequest) -> Result<Vec<u8>, RequestError> {
		const KIND: FlowKind = FlowKind::Request;

		let span = FlowSpan::new(KIND, "execute");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.execute_inner(request)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Sends `request` and decodes the JSON response body into `D`.
	pub async fn execute_json<D>(&self, request: &ApiRequest) -> Result<D, RequestError>
	where
		D: DeserializeOwned,
	{
		let body = self.execute(request).await?;
		let mut de = serde_json::Deserializer::from_slice(&body);

		serde_path_to_error::deserialize(&mut de).map_err(|source| RequestError::Decode { source })
	}

	async fn execute_inner(&self, request: &ApiRequest) -> Result<Vec<u8>, RequestError> {
		let mut retry = self.policy.context();
		let mut state = self.authenticator.current_state();

		loop {
			let Some(token) = state.token().cloned() else {
				let delay = next_delay(&mut retry, &state)?;
				let outcome = self.authenticator.refresh(delay);

				state = match outcome.ticket() {
					Some(ticket) => self.authenticator.wait(ticket).await,
					None => self.authenticator.current_state(),
				};

				continue;
			};
			let authorization = token.bearer_header().map_err(::http::Error::from)?;
			let response =
				self.transport.execute(request.to_http(authorization)?, self.timeout).await?;
			let status = response.status();

			if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
				tracing::debug!(
					status = status.as_u16(),
					attempt = retry.attempts(),
					url = %request.url,
					"token rejected"
				);

				state = self.retry_rejected(&mut retry, &token).await?;

				continue;
			}
			if status.is_success() || status.is_redirection() {
				return Ok(response.into_body());
			}

			tracing::debug!(status = status.as_u16(), url = %request.url, "request failed");

			return Err(RequestError::Http { status: status.as_u16(), body: response.into_body() });
		}
	}

	async fn retry_rejected(
		&self,
		retry: &mut RetryContext,
		rejected: &TokenSecret,
	) -> Result<TokenState, RequestError> {
		let delay = next_delay(retry, &self.authenticator.current_state())?;
		let outcome = self.authenticator.refresh_rejected(delay, rejected);

		Ok(match outcome.ticket() {
			Some(ticket) => self.authenticator.wait(ticket).await,
			None => self.authenticator.current_state(),
		})
	}
}
impl<T> Clone for RequestExecutor<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			authenticator: self.authenticator.clone(),
			transport: self.transport.clone(),
			policy: self.policy,
			timeout: self.timeout,
		}
	}
}
impl<T> Debug for RequestExecutor<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestExecutor")
			.field("authenticator", &self.authenticator)
			.field("policy", &self.policy)
			.field("timeout", &self.timeout)
			.finish()
	}
}

fn next_delay(retry: &mut RetryContext, state: &TokenState) -> Result<Duration, RequestError> {
	retry.next_delay().ok_or_else(|| {
		let last_failure = state.failure().cloned();

		tracing::warn!(attempts = retry.attempts(), "authentication attempts exhausted");

		RequestError::AuthenticationExhausted { attempts: retry.attempts(), last_failure }
	})
}
