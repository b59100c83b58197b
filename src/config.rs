//! Immutable authorization configuration and the loaders that produce it.
//!
//! [`TokenConfig`] is always validated on construction: the authorization URL, client
//! identifier, and client secret are mandatory, while the persistence key and partition are
//! optional. Without a persistence key the last token response is kept in memory only.

/// Builder API for assembling token configurations.
pub mod builder;
/// JSON document and property-map loaders.
pub mod load;

pub use builder::*;

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Authorization endpoint, client credentials, and persistence settings.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenConfig {
	authorization_url: Url,
	client_id: String,
	client_secret: TokenSecret,
	persistence_key: Option<String>,
	persistence_partition: Option<String>,
}
impl TokenConfig {
	/// Creates a new builder.
	pub fn builder() -> TokenConfigBuilder {
		TokenConfigBuilder::default()
	}

	/// Authorization endpoint URL; carries the `grant_type=client_credentials` query.
	pub fn authorization_url(&self) -> &Url {
		&self.authorization_url
	}

	/// Client identifier known to the authorization endpoint.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// Client secret known to the authorization endpoint.
	pub fn client_secret(&self) -> &TokenSecret {
		&self.client_secret
	}

	/// Key under which the last token response is persisted, if persistence is enabled.
	pub fn persistence_key(&self) -> Option<&str> {
		self.persistence_key.as_deref()
	}

	/// Storage partition shared between cooperating processes, if any.
	pub fn persistence_partition(&self) -> Option<&str> {
		self.persistence_partition.as_deref()
	}
}
impl Debug for TokenConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenConfig")
			.field("authorization_url", &self.authorization_url.as_str())
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.field("persistence_key", &self.persistence_key)
			.field("persistence_partition", &self.persistence_partition)
			.finish()
	}
}
