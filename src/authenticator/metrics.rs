// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for refresh requests handled by an authenticator.
#[derive(Debug, Default)]
pub struct AuthenticatorMetrics {
	started: AtomicU64,
	joined: AtomicU64,
	succeeded: AtomicU64,
	failed: AtomicU64,
}
impl AuthenticatorMetrics {
	/// Returns the number of refresh calls that reached the authorization endpoint.
	pub fn started(&self) -> u64 {
		self.started.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh requests folded into an in-flight call.
	pub fn joined(&self) -> u64 {
		self.joined.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh calls that produced a valid token.
	pub fn succeeded(&self) -> u64 {
		self.succeeded.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh calls that ended in a failure.
	pub fn failed(&self) -> u64 {
		self.failed.load(Ordering::Relaxed)
	}

	pub(crate) fn record_started(&self) {
		self.started.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_joined(&self) {
		self.joined.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_succeeded(&self) {
		self.succeeded.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failed(&self) {
		self.failed.fetch_add(1, Ordering::Relaxed);
	}
}
