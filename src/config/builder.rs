// self
use crate::{_prelude::*, auth::TokenSecret, config::TokenConfig, error::ConfigError};

/// Builder for [`TokenConfig`] values.
#[derive(Clone, Default)]
pub struct TokenConfigBuilder {
	/// Raw authorization URL; a missing scheme defaults to `https://`.
	pub authorization_url: Option<String>,
	/// Client identifier.
	pub client_id: Option<String>,
	/// Client secret.
	pub client_secret: Option<TokenSecret>,
	/// Optional persistence key.
	pub persistence_key: Option<String>,
	/// Optional persistence partition.
	pub persistence_partition: Option<String>,
}
impl TokenConfigBuilder {
	/// Sets the authorization endpoint.
	pub fn authorization_url(mut self, url: impl Into<String>) -> Self {
		self.authorization_url = Some(url.into());

		self
	}

	/// Sets the client identifier.
	pub fn client_id(mut self, id: impl Into<String>) -> Self {
		self.client_id = Some(id.into());

		self
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, secret: impl Into<TokenSecret>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Enables persistence of the last token response under `key`.
	pub fn persistence_key(mut self, key: impl Into<String>) -> Self {
		self.persistence_key = Some(key.into());

		self
	}

	/// Scopes persistence to a partition shared with cooperating processes.
	pub fn persistence_partition(mut self, partition: impl Into<String>) -> Self {
		self.persistence_partition = Some(partition.into());

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<TokenConfig, ConfigError> {
		let raw_url = non_empty(self.authorization_url).ok_or(ConfigError::MissingAuthorizationUrl)?;
		let authorization_url = parse_endpoint(&raw_url)?;
		let client_id = non_empty(self.client_id).ok_or(ConfigError::MissingClientId)?;
		let client_secret = self
			.client_secret
			.filter(|secret| !secret.expose().trim().is_empty())
			.ok_or(ConfigError::MissingClientSecret)?;

		Ok(TokenConfig {
			authorization_url,
			client_id,
			client_secret,
			persistence_key: non_empty(self.persistence_key),
			persistence_partition: non_empty(self.persistence_partition),
		})
	}
}
impl Debug for TokenConfigBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenConfigBuilder")
			.field("authorization_url", &self.authorization_url)
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("persistence_key", &self.persistence_key)
			.field("persistence_partition", &self.persistence_partition)
			.finish()
	}
}

/// Parses an endpoint URL, defaulting to `https://` when the scheme is omitted.
pub(crate) fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
	let raw = raw.trim();
	let url = if raw.contains("://") { Url::parse(raw)? } else { Url::parse(&format!("https://{raw}"))? };

	match url.scheme() {
		"https" | "http" => Ok(url),
		_ => Err(ConfigError::UnsupportedScheme { url: url.to_string() }),
	}
}

fn non_empty(value: Option<String>) -> Option<String> {
	value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}
