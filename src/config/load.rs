// std
use std::{fs, path::Path};
// self
use crate::{_prelude::*, config::TokenConfig, error::ConfigError};

/// On-disk document shape; key names match the resource files shipped with existing clients.
#[derive(Deserialize)]
struct ConfigDocument {
	#[serde(rename = "authorizationURL")]
	authorization_url: String,
	#[serde(rename = "clientKey")]
	client_key: String,
	#[serde(rename = "clientSecret")]
	client_secret: String,
	#[serde(rename = "userDefaultsKey", default)]
	persistence_key: Option<String>,
	#[serde(rename = "userDefaultsSuiteName", default)]
	persistence_partition: Option<String>,
}

impl TokenConfig {
	/// Parses a JSON configuration document.
	///
	/// ```json
	/// {
	///     "authorizationURL": "https://api.example.com/auth/accesstoken?grant_type=client_credentials",
	///     "clientKey": "ABC123DEF567",
	///     "clientSecret": "kQ4Mr5A9JD",
	///     "userDefaultsKey": "MyApp.authResponse"
	/// }
	/// ```
	pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ConfigError> {
		let mut de = serde_json::Deserializer::from_slice(bytes);
		let document: ConfigDocument = serde_path_to_error::deserialize(&mut de)
			.map_err(|source| ConfigError::Parse { source })?;
		let mut builder = Self::builder()
			.authorization_url(document.authorization_url)
			.client_id(document.client_key)
			.client_secret(document.client_secret);

		if let Some(key) = document.persistence_key {
			builder = builder.persistence_key(key);
		}
		if let Some(partition) = document.persistence_partition {
			builder = builder.persistence_partition(partition);
		}

		builder.build()
	}

	/// Reads and parses a JSON configuration document from disk.
	pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let bytes = fs::read(path)
			.map_err(|source| ConfigError::Load { path: path.to_path_buf(), source })?;

		Self::from_json_slice(&bytes)
	}

	/// Builds a configuration from a flat property map.
	///
	/// Recognized keys, each preceded by `prefix`:
	///
	/// - `AUTH_URL` (mandatory)
	/// - `AUTH_KEY` (mandatory)
	/// - `AUTH_SECRET` (mandatory)
	/// - `AUTH_DEFAULTS_KEY` (optional)
	/// - `AUTH_DEFAULTS_SUITE` (optional)
	pub fn from_properties<K, V>(properties: &HashMap<K, V>, prefix: &str) -> Result<Self, ConfigError>
	where
		K: std::borrow::Borrow<str> + std::hash::Hash + Eq,
		V: AsRef<str>,
	{
		let lookup = |name: &str| {
			properties
				.get(format!("{prefix}{name}").as_str())
				.map(|value| value.as_ref().trim().to_owned())
				.filter(|value| !value.is_empty())
		};
		let require = |name: &str| {
			lookup(name).ok_or_else(|| ConfigError::MissingProperty { key: format!("{prefix}{name}") })
		};
		let mut builder = Self::builder()
			.authorization_url(require("AUTH_URL")?)
			.client_id(require("AUTH_KEY")?)
			.client_secret(require("AUTH_SECRET")?);

		if let Some(key) = lookup("AUTH_DEFAULTS_KEY") {
			builder = builder.persistence_key(key);
		}
		if let Some(partition) = lookup("AUTH_DEFAULTS_SUITE") {
			builder = builder.persistence_partition(partition);
		}

		builder.build()
	}
}
