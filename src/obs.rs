//! Observability helpers for token refreshes and authenticated requests.
//!
//! # Feature Flags
//!
//! - Spans named `catalog_client.flow` with the `flow` and `stage` fields are always emitted
//!   through `tracing`; install a subscriber to see them.
//! - Enable `metrics` to increment the `catalog_client_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`.

mod tracing;

pub use self::tracing::*;

// self
use crate::_prelude::*;

/// Counter incremented by [`record_flow_outcome`] under the `metrics` feature.
pub const FLOW_COUNTER: &str = "catalog_client_flow_total";

/// Counts one `outcome` of a `kind` flow; a no-op unless the `metrics` feature is enabled.
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(FLOW_COUNTER, "flow" => kind.as_str(), "outcome" => outcome.as_str())
			.increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Flow kinds observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Background token refresh against the authorization endpoint.
	TokenRefresh,
	/// Authenticated request driven by the executor.
	Request,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::TokenRefresh => "token_refresh",
			FlowKind::Request => "request",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller or published as state.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn labels_are_stable() {
		assert_eq!(FlowKind::TokenRefresh.to_string(), "token_refresh");
		assert_eq!(FlowKind::Request.as_str(), "request");
		assert_eq!(FlowOutcome::Failure.to_string(), "failure");
	}

	#[test]
	fn recording_without_a_recorder_is_silent() {
		for kind in [FlowKind::TokenRefresh, FlowKind::Request] {
			record_flow_outcome(kind, FlowOutcome::Attempt);
			record_flow_outcome(kind, FlowOutcome::Failure);
		}
	}
}
