//! Exponential backoff schedule for authentication retries.

// self
use crate::_prelude::*;

/// Bounds and schedule of authentication retries performed by the executor.
///
/// The delay before the `n`-th refresh is `0` for `n == 0` and `min(2^(n-1), cap)` units
/// afterwards, so the default schedule is `0s, 1s, 2s, 4s, 8s`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	max_attempts: u32,
	cap: u32,
	unit: Duration,
}
impl RetryPolicy {
	/// Default number of refreshes a single request may trigger.
	pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
	/// Default upper bound of the backoff multiplier.
	pub const DEFAULT_CAP: u32 = 300;

	/// Creates a policy with explicit bounds; `max_attempts` is at least one.
	pub fn new(max_attempts: u32, cap: u32) -> Self {
		Self { max_attempts: max_attempts.max(1), cap, unit: Duration::from_secs(1) }
	}

	/// Overrides the duration of one backoff unit (one second by default).
	pub fn with_unit(mut self, unit: Duration) -> Self {
		self.unit = unit;

		self
	}

	/// Maximum number of refreshes a single request may trigger.
	pub fn max_attempts(&self) -> u32 {
		self.max_attempts
	}

	/// Upper bound of the backoff multiplier.
	pub fn cap(&self) -> u32 {
		self.cap
	}

	/// Duration of one backoff unit.
	pub fn unit(&self) -> Duration {
		self.unit
	}

	/// Delay applied before the refresh numbered `attempt` (zero-based).
	pub fn backoff(&self, attempt: u32) -> Duration {
		if attempt == 0 {
			return Duration::ZERO;
		}

		let multiplier = 1_u64.checked_shl(attempt - 1).unwrap_or(u64::MAX).min(u64::from(self.cap));
		let multiplier = u32::try_from(multiplier).unwrap_or(self.cap);

		self.unit.saturating_mul(multiplier)
	}

	/// Starts tracking retries for one request.
	pub fn context(&self) -> RetryContext {
		RetryContext { policy: *self, attempts: 0, delays: Vec::new() }
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self::new(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_CAP)
	}
}

/// Per-request retry bookkeeping.
#[derive(Clone, Debug)]
pub struct RetryContext {
	policy: RetryPolicy,
	attempts: u32,
	delays: Vec<Duration>,
}
impl RetryContext {
	/// Number of refreshes requested so far.
	pub fn attempts(&self) -> u32 {
		self.attempts
	}

	/// Delays applied so far, in order.
	pub fn delays(&self) -> &[Duration] {
		&self.delays
	}

	/// Attempt budget inherited from the policy.
	pub fn max_attempts(&self) -> u32 {
		self.policy.max_attempts
	}

	/// Backoff cap inherited from the policy.
	pub fn cap(&self) -> u32 {
		self.policy.cap
	}

	/// Returns `true` once no further refresh may be requested.
	pub fn exhausted(&self) -> bool {
		self.attempts >= self.policy.max_attempts
	}

	/// Consumes one attempt and returns the delay to apply before its refresh, or `None` when
	/// the budget is spent.
	pub fn next_delay(&mut self) -> Option<Duration> {
		if self.exhausted() {
			return None;
		}

		let delay = self.policy.backoff(self.attempts);

		self.attempts += 1;
		self.delays.push(delay);

		Some(delay)
	}
}
