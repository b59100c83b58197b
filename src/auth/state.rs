//! Token lifecycle state owned by [`crate::authenticator::Authenticator`].

// self
use crate::{
	_prelude::*,
	auth::{AccessTokenResponse, TokenSecret},
	error::AuthError,
};

/// Current token state.
///
/// An in-flight refresh is not a variant: it is tracked by the authenticator's single-flight
/// gate and queried through [`crate::authenticator::Authenticator::is_refreshing`].
#[derive(Clone)]
pub enum TokenState {
	/// No usable token; either nothing was fetched yet or the token was invalidated.
	Invalid,
	/// Usable bearer token plus the response it came from.
	Valid {
		/// Bearer token attached to protected requests.
		token: TokenSecret,
		/// Full token response that produced `token`.
		response: AccessTokenResponse,
	},
	/// The last refresh attempt failed.
	RefreshFailed {
		/// Failure reported by the refresh attempt.
		error: Arc<AuthError>,
	},
}
impl TokenState {
	/// Builds a valid state from a token response.
	pub fn valid(response: AccessTokenResponse) -> Self {
		Self::Valid { token: response.access_token.clone(), response }
	}

	/// Builds a failed state from a refresh error.
	pub fn refresh_failed(error: AuthError) -> Self {
		Self::RefreshFailed { error: Arc::new(error) }
	}

	/// Returns the bearer token when the state is [`TokenState::Valid`].
	pub fn token(&self) -> Option<&TokenSecret> {
		match self {
			Self::Valid { token, .. } => Some(token),
			_ => None,
		}
	}

	/// Returns `true` for [`TokenState::Valid`].
	pub fn is_valid(&self) -> bool {
		matches!(self, Self::Valid { .. })
	}

	/// Returns the refresh error for [`TokenState::RefreshFailed`].
	pub fn failure(&self) -> Option<&Arc<AuthError>> {
		match self {
			Self::RefreshFailed { error } => Some(error),
			_ => None,
		}
	}

	/// Stable label for logs and spans.
	pub const fn as_str(&self) -> &'static str {
		match self {
			Self::Invalid => "invalid",
			Self::Valid { .. } => "valid",
			Self::RefreshFailed { .. } => "refresh_failed",
		}
	}
}
impl Debug for TokenState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Invalid => f.write_str("Invalid"),
			Self::Valid { response, .. } =>
				f.debug_struct("Valid").field("token", &"<redacted>").field("response", response).finish(),
			Self::RefreshFailed { error } =>
				f.debug_struct("RefreshFailed").field("error", &error.to_string()).finish(),
		}
	}
}
impl Display for TokenState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::RefreshFailed { error } => write!(f, "refresh_failed({error})"),
			other => f.write_str(other.as_str()),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn accessors_follow_the_variant() {
		let valid = TokenState::valid(AccessTokenResponse::new("T1", "Bearer"));
		let failed = TokenState::refresh_failed(AuthError::UnexpectedStatus {
			status: 500,
			message: "n/a".into(),
		});

		assert_eq!(valid.token().map(TokenSecret::expose), Some("T1"));
		assert!(valid.is_valid());
		assert!(failed.failure().is_some());
		assert!(TokenState::Invalid.token().is_none());
		assert_eq!(
			failed.to_string(),
			"refresh_failed(Authorization endpoint returned HTTP 500: n/a.)"
		);
	}

	#[test]
	fn debug_output_redacts_the_token() {
		let rendered = format!("{:?}", TokenState::valid(AccessTokenResponse::new("T1", "Bearer")));

		assert!(rendered.starts_with("Valid"));
		assert!(!rendered.contains("T1"));
	}
}
