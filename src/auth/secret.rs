//! Redacted secret wrapper for access tokens and client secrets.

// crates.io
use ::http::HeaderValue;
use base64::{Engine, engine::general_purpose::STANDARD};
// self
use crate::_prelude::*;

/// Secret string that keeps token and credential material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` when the secret holds no characters.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Builds an `Authorization: Bearer <token>` header value flagged as sensitive.
	pub fn bearer_header(&self) -> Result<HeaderValue, ::http::header::InvalidHeaderValue> {
		let mut value = HeaderValue::try_from(format!("Bearer {}", self.0))?;

		value.set_sensitive(true);

		Ok(value)
	}

	/// Builds an `Authorization: Basic base64(id:secret)` header value flagged as sensitive.
	pub fn basic_header(
		client_id: &str,
		client_secret: &TokenSecret,
	) -> Result<HeaderValue, ::http::header::InvalidHeaderValue> {
		let credentials = STANDARD.encode(format!("{client_id}:{}", client_secret.expose()));
		let mut value = HeaderValue::try_from(format!("Basic {credentials}"))?;

		value.set_sensitive(true);

		Ok(value)
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl From<&str> for TokenSecret {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}
impl From<String> for TokenSecret {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
