// crates.io
use tokio::sync::broadcast::{Receiver, error::RecvError};
// self
use crate::{_prelude::*, auth::TokenState};

/// Stream of token states: the state at subscription time, then every later transition.
#[derive(Debug)]
pub struct TokenSubscription {
	pending: Option<TokenState>,
	receiver: Receiver<TokenState>,
}
impl TokenSubscription {
	pub(crate) fn new(current: TokenState, receiver: Receiver<TokenState>) -> Self {
		Self { pending: Some(current), receiver }
	}

	/// Waits for the next state.
	///
	/// Returns `None` once the authenticator and every in-flight refresh are gone. A slow
	/// subscriber that falls behind skips the states it missed and resumes with newer ones.
	pub async fn next(&mut self) -> Option<TokenState> {
		if let Some(current) = self.pending.take() {
			return Some(current);
		}

		loop {
			match self.receiver.recv().await {
				Ok(state) => return Some(state),
				Err(RecvError::Lagged(skipped)) => {
					tracing::warn!(skipped, "token subscriber lagged behind");
				},
				Err(RecvError::Closed) => return None,
			}
		}
	}
}
