//! Token lifecycle owner with single-flight refreshes.
//!
//! [`Authenticator`] keeps the current [`TokenState`], exchanges client credentials for a
//! bearer token at the authorization endpoint, and guarantees at most one exchange is in
//! flight. Every completed exchange bumps a generation counter; callers that requested a
//! refresh receive a [`RefreshTicket`] naming the generation that will satisfy them and park
//! on [`Authenticator::wait`] until it is published.

mod metrics;
mod subscription;

pub use metrics::AuthenticatorMetrics;
pub use subscription::TokenSubscription;

// crates.io
use ::http::{
	HeaderValue, Method,
	header::{ACCEPT, AUTHORIZATION},
};
use tokio::{
	runtime::Handle,
	sync::{broadcast, watch},
};
// self
use crate::{
	_prelude::*,
	auth::{AccessTokenResponse, TokenSecret, TokenState, response},
	config::TokenConfig,
	error::{AuthError, ConfigError},
	http::HttpTransport,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::TokenStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

/// Authenticator backed by the default reqwest transport.
#[cfg(feature = "reqwest")]
pub type ReqwestAuthenticator = Authenticator<ReqwestTransport>;

const TOKEN_TIMEOUT: Duration = Duration::from_secs(10);
const EVENT_CAPACITY: usize = 64;

/// Identifies the completed refresh generation a caller is waiting for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefreshTicket(u64);
impl RefreshTicket {
	/// Generation number that satisfies this ticket.
	pub fn generation(self) -> u64 {
		self.0
	}
}

/// Result of a refresh request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
	/// A new exchange was spawned.
	Started(RefreshTicket),
	/// An exchange was already in flight; the caller shares its result.
	Joined(RefreshTicket),
	/// The rejected token was already replaced; nothing was scheduled.
	AlreadyNewer,
}
impl RefreshOutcome {
	/// Ticket to pass to [`Authenticator::wait`], when a refresh is pending.
	pub fn ticket(self) -> Option<RefreshTicket> {
		match self {
			Self::Started(ticket) | Self::Joined(ticket) => Some(ticket),
			Self::AlreadyNewer => None,
		}
	}
}

#[derive(Debug, Default)]
struct Gate {
	in_flight: bool,
	generation: u64,
}

#[derive(Clone, Debug)]
struct Snapshot {
	generation: u64,
	state: TokenState,
}

/// Owns the token state shared by every request of one API client.
///
/// Cloning is cheap; clones share the same state, gate, and subscribers.
pub struct Authenticator<T>
where
	T: ?Sized + HttpTransport,
{
	inner: Arc<Inner<T>>,
}
impl<T> Authenticator<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates an authenticator, restoring the last persisted token response.
	///
	/// The initial state is [`TokenState::Valid`] when `store` holds a decodable response and
	/// [`TokenState::Invalid`] otherwise. Must be awaited inside a Tokio runtime; refreshes are
	/// spawned onto it.
	pub async fn new(config: TokenConfig, store: TokenStore, transport: Arc<T>) -> Result<Self> {
		let runtime = Handle::try_current().map_err(|_| ConfigError::MissingRuntime)?;
		let initial = match store.load().await? {
			Some(response) => TokenState::valid(response),
			None => TokenState::Invalid,
		};

		tracing::debug!(state = initial.as_str(), "authenticator initialized");

		let (snapshot, _) = watch::channel(Snapshot { generation: 0, state: initial });
		let (events, _) = broadcast::channel(EVENT_CAPACITY);

		Ok(Self {
			inner: Arc::new(Inner {
				config,
				store,
				runtime,
				gate: Mutex::new(Gate::default()),
				snapshot,
				events,
				metrics: AuthenticatorMetrics::default(),
				transport,
			}),
		})
	}

	/// Configuration in use.
	pub fn config(&self) -> &TokenConfig {
		&self.inner.config
	}

	/// Refresh counters.
	pub fn metrics(&self) -> &AuthenticatorMetrics {
		&self.inner.metrics
	}

	/// Snapshot of the current state; never blocks on an in-flight refresh.
	pub fn current_state(&self) -> TokenState {
		self.inner.snapshot.borrow().state.clone()
	}

	/// Returns `true` while an exchange with the authorization endpoint is in flight.
	pub fn is_refreshing(&self) -> bool {
		self.inner.gate.lock().in_flight
	}

	/// Subscribes to state changes, starting with the current state.
	pub fn subscribe(&self) -> TokenSubscription {
		let _gate = self.inner.gate.lock();
		let current = self.inner.snapshot.borrow().state.clone();

		TokenSubscription::new(current, self.inner.events.subscribe())
	}

	/// Requests a new token after `delay`.
	///
	/// Joins the in-flight exchange when there is one. A valid cached token never suppresses
	/// an explicit refresh.
	pub fn refresh(&self, delay: Duration) -> RefreshOutcome {
		self.begin(delay, None)
	}

	/// Requests a new token because `rejected` was refused by a resource server.
	///
	/// Returns [`RefreshOutcome::AlreadyNewer`] without scheduling anything when the cached
	/// token already differs from `rejected`.
	pub fn refresh_rejected(&self, delay: Duration, rejected: &TokenSecret) -> RefreshOutcome {
		self.begin(delay, Some(rejected))
	}

	/// Waits until the refresh identified by `ticket` completes and returns the resulting
	/// state.
	pub async fn wait(&self, ticket: RefreshTicket) -> TokenState {
		let mut receiver = self.inner.snapshot.subscribe();

		match receiver.wait_for(|snapshot| snapshot.generation >= ticket.0).await {
			Ok(snapshot) => snapshot.state.clone(),
			Err(_) => TokenState::refresh_failed(AuthError::Closed),
		}
	}

	/// Drops the cached token and its persisted copy without refreshing.
	pub async fn invalidate(&self) -> Result<()> {
		tracing::debug!("invalidating cached token");

		self.inner.publish(TokenState::Invalid, false);
		self.inner.store.clear().await?;

		Ok(())
	}

	fn begin(&self, delay: Duration, rejected: Option<&TokenSecret>) -> RefreshOutcome {
		let mut gate = self.inner.gate.lock();

		let already_newer = rejected.is_some_and(|rejected| {
			self.inner.snapshot.borrow().state.token().is_some_and(|current| current != rejected)
		});

		if already_newer {
			tracing::debug!("rejected token already replaced");

			return RefreshOutcome::AlreadyNewer;
		}

		let ticket = RefreshTicket(gate.generation + 1);

		if gate.in_flight {
			self.inner.metrics.record_joined();
			tracing::debug!(ticket = ticket.0, "joining in-flight refresh");

			return RefreshOutcome::Joined(ticket);
		}

		gate.in_flight = true;

		drop(gate);

		self.inner.metrics.record_started();
		tracing::debug!(ticket = ticket.0, ?delay, "starting refresh");

		let guard = RefreshGuard::arm(self.inner.clone());

		self.inner.runtime.spawn(self.inner.clone().run_refresh(delay, guard));

		RefreshOutcome::Started(ticket)
	}
}
impl<T> Clone for Authenticator<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self { inner: self.inner.clone() }
	}
}
impl<T> Debug for Authenticator<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Authenticator")
			.field("config", &self.inner.config)
			.field("state", &self.current_state())
			.field("refreshing", &self.is_refreshing())
			.finish()
	}
}

struct Inner<T>
where
	T: ?Sized + HttpTransport,
{
	config: TokenConfig,
	store: TokenStore,
	runtime: Handle,
	gate: Mutex<Gate>,
	snapshot: watch::Sender<Snapshot>,
	events: broadcast::Sender<TokenState>,
	metrics: AuthenticatorMetrics,
	transport: Arc<T>,
}
impl<T> Inner<T>
where
	T: ?Sized + HttpTransport,
{
	async fn run_refresh(self: Arc<Self>, delay: Duration, guard: RefreshGuard<T>) {
		const KIND: FlowKind = FlowKind::TokenRefresh;

		let span = FlowSpan::new(KIND, "run_refresh");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let state = span
			.instrument(async {
				if !delay.is_zero() {
					tokio::time::sleep(delay).await;
				}

				match self.exchange().await {
					Ok(response) => {
						if let Err(e) = self.store.save(&response).await {
							tracing::warn!(error = %e, "failed to persist token response");
						}

						TokenState::valid(response)
					},
					Err(e) => {
						tracing::error!(error = %e, "token refresh failed");

						TokenState::refresh_failed(e)
					},
				}
			})
			.await;

		if state.is_valid() {
			self.metrics.record_succeeded();
			obs::record_flow_outcome(KIND, FlowOutcome::Success);
		} else {
			self.metrics.record_failed();
			obs::record_flow_outcome(KIND, FlowOutcome::Failure);
		}

		let _entered = span.entered();

		guard.complete(state);
	}

	async fn exchange(&self) -> Result<AccessTokenResponse, AuthError> {
		let authorization =
			TokenSecret::basic_header(self.config.client_id(), self.config.client_secret())
				.map_err(::http::Error::from)?;
		let request = ::http::Request::builder()
			.method(Method::POST)
			.uri(self.config.authorization_url().as_str())
			.header(AUTHORIZATION, authorization)
			.header(ACCEPT, HeaderValue::from_static("application/json"))
			.body(Vec::new())?;
		let response = self.transport.execute(request, TOKEN_TIMEOUT).await?;
		let status = response.status().as_u16();

		if !(200..400).contains(&status) {
			return Err(AuthError::UnexpectedStatus {
				status,
				message: response::describe_error_body(response.body()),
			});
		}

		AccessTokenResponse::from_slice(response.body())
			.map_err(|source| AuthError::ResponseParse { source, status })
	}

	fn publish(&self, state: TokenState, completes_refresh: bool) {
		let mut gate = self.gate.lock();

		if completes_refresh {
			gate.in_flight = false;
			gate.generation += 1;
		}

		tracing::debug!(generation = gate.generation, state = state.as_str(), "publishing token state");

		self.snapshot.send_replace(Snapshot { generation: gate.generation, state: state.clone() });

		// No receivers is not an error.
		let _ = self.events.send(state);
	}
}

/// Owns the in-flight flag of one spawned refresh.
///
/// Dropping it before [`RefreshGuard::complete`] (a panic in the transport or store, or a
/// runtime shutting down under the task) publishes [`AuthError::Interrupted`] so the gate
/// reopens and every waiter wakes.
struct RefreshGuard<T>
where
	T: ?Sized + HttpTransport,
{
	inner: Option<Arc<Inner<T>>>,
}
impl<T> RefreshGuard<T>
where
	T: ?Sized + HttpTransport,
{
	fn arm(inner: Arc<Inner<T>>) -> Self {
		Self { inner: Some(inner) }
	}

	fn complete(mut self, state: TokenState) {
		if let Some(inner) = self.inner.take() {
			inner.publish(state, true);
		}
	}
}
impl<T> Drop for RefreshGuard<T>
where
	T: ?Sized + HttpTransport,
{
	fn drop(&mut self) {
		let Some(inner) = self.inner.take() else { return };

		tracing::error!("token refresh ended before publishing a result");

		inner.metrics.record_failed();
		obs::record_flow_outcome(FlowKind::TokenRefresh, FlowOutcome::Failure);
		inner.publish(TokenState::refresh_failed(AuthError::Interrupted), true);
	}
}
