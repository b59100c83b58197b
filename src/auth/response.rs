//! Token endpoint response model and error-body helpers.

// crates.io
use serde::{Deserializer, de::Error as _};
// self
use crate::{_prelude::*, auth::TokenSecret};

const ERROR_DESCRIPTION_KEYS: [&str; 5] =
	["ErrorDescription", "errorDescription", "error_description", "Error", "error"];
const ERROR_CODE_KEYS: [&str; 3] = ["ErrorCode", "errorCode", "error_code"];

/// Successful client-credentials response, as returned by the authorization endpoint and as
/// persisted by [`crate::store::TokenStore`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenResponse {
	/// Bearer token attached to protected requests.
	pub access_token: TokenSecret,
	/// Token type announced by the endpoint (typically `Bearer`).
	pub token_type: String,
	/// Lifetime hint in seconds; accepted as a JSON number or numeric string.
	#[serde(
		default,
		skip_serializing_if = "Option::is_none",
		deserialize_with = "deserialize_expires_in"
	)]
	pub expires_in: Option<u64>,
	/// Refresh token, if the endpoint issued one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<TokenSecret>,
	/// Granted scope string, if announced.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub scope: Option<String>,
}
impl AccessTokenResponse {
	/// Creates a response carrying only the mandatory fields.
	pub fn new(access_token: impl Into<TokenSecret>, token_type: impl Into<String>) -> Self {
		Self {
			access_token: access_token.into(),
			token_type: token_type.into(),
			expires_in: None,
			refresh_token: None,
			scope: None,
		}
	}

	/// Sets the lifetime hint.
	pub fn with_expires_in(mut self, seconds: u64) -> Self {
		self.expires_in = Some(seconds);

		self
	}

	/// Sets the refresh token.
	pub fn with_refresh_token(mut self, token: impl Into<TokenSecret>) -> Self {
		self.refresh_token = Some(token.into());

		self
	}

	/// Sets the granted scope.
	pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Decodes a JSON token response, reporting the failing field path on error.
	pub fn from_slice(
		bytes: &[u8],
	) -> Result<Self, serde_path_to_error::Error<serde_json::Error>> {
		let mut de = serde_json::Deserializer::from_slice(bytes);

		serde_path_to_error::deserialize(&mut de)
	}

	/// Lifetime hint as a [`Duration`], when the endpoint provided one.
	pub fn lifetime(&self) -> Option<Duration> {
		self.expires_in.map(Duration::from_secs)
	}
}
impl Debug for AccessTokenResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessTokenResponse")
			.field("access_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("expires_in", &self.expires_in)
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("scope", &self.scope)
			.finish()
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExpiresIn {
	Seconds(u64),
	Text(String),
}

fn deserialize_expires_in<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
	D: Deserializer<'de>,
{
	match Option::<ExpiresIn>::deserialize(deserializer)? {
		None => Ok(None),
		Some(ExpiresIn::Seconds(value)) => Ok(Some(value)),
		Some(ExpiresIn::Text(raw)) if raw.trim().is_empty() => Ok(None),
		Some(ExpiresIn::Text(raw)) => raw.trim().parse::<u64>().map(Some).map_err(|e| {
			D::Error::custom(format!("expires_in `{raw}` is not a number of seconds: {e}"))
		}),
	}
}

/// Extracts a human-readable reason from an authorization error body.
///
/// Descriptions win over codes; `n/a` is returned when the body carries neither.
pub(crate) fn describe_error_body(body: &[u8]) -> String {
	let Ok(fields) = serde_json::from_slice::<HashMap<String, serde_json::Value>>(body) else {
		return "n/a".into();
	};
	let lookup = |keys: &[&str]| {
		keys.iter().find_map(|key| fields.get(*key).and_then(|value| value.as_str()))
	};

	lookup(&ERROR_DESCRIPTION_KEYS)
		.or_else(|| lookup(&ERROR_CODE_KEYS))
		.map(ToOwned::to_owned)
		.unwrap_or_else(|| "n/a".into())
}
