//! Token persistence: a partitioned blob-store contract plus the [`TokenStore`] adapter that
//! keeps the last successful [`AccessTokenResponse`] in it.

pub mod file;
pub mod memory;

pub use file::FileBlobStore;
pub use memory::MemoryBlobStore;

// self
use crate::{_prelude::*, auth::AccessTokenResponse, config::TokenConfig};

/// Boxed future returned by [`BlobStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Key/value persistence medium holding opaque blobs.
///
/// Keys are scoped by an optional partition so cooperating processes (an application and its
/// extensions, for example) can share one entry while unrelated processes stay isolated.
pub trait BlobStore
where
	Self: Send + Sync,
{
	/// Returns the blob stored under `key`, if present.
	fn get<'a>(&'a self, key: &'a BlobKey) -> StoreFuture<'a, Option<Vec<u8>>>;

	/// Stores or replaces the blob under `key`.
	fn put<'a>(&'a self, key: &'a BlobKey, blob: Vec<u8>) -> StoreFuture<'a, ()>;

	/// Removes the blob under `key`; removing a missing key succeeds.
	fn remove<'a>(&'a self, key: &'a BlobKey) -> StoreFuture<'a, ()>;
}

/// Error type produced by [`BlobStore`] implementations and [`TokenStore`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced while encoding a blob.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage medium.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Partition-scoped key identifying one stored blob.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlobKey {
	/// Optional partition shared by cooperating processes.
	pub partition: Option<String>,
	/// Key within the partition.
	pub key: String,
}
impl BlobKey {
	/// Builds a key in the default partition.
	pub fn new(key: impl Into<String>) -> Self {
		Self { partition: None, key: key.into() }
	}

	/// Moves the key into `partition`.
	pub fn in_partition(mut self, partition: impl Into<String>) -> Self {
		self.partition = Some(partition.into());

		self
	}

	/// Derives the persistence key from a configuration; `None` disables persistence.
	pub fn from_config(config: &TokenConfig) -> Option<Self> {
		let key = Self::new(config.persistence_key()?);

		Some(match config.persistence_partition() {
			Some(partition) => key.in_partition(partition),
			None => key,
		})
	}
}

/// Persists and restores the last successful token response.
///
/// The response is stored as one JSON blob using the wire field names. When the configuration
/// carries no persistence key every operation is a no-op and [`TokenStore::load`] yields
/// `None`.
#[derive(Clone)]
pub struct TokenStore {
	backend: Arc<dyn BlobStore>,
	key: Option<BlobKey>,
}
impl TokenStore {
	/// Creates a store that persists into `backend` under the key derived from `config`.
	pub fn new(backend: Arc<dyn BlobStore>, config: &TokenConfig) -> Self {
		Self { backend, key: BlobKey::from_config(config) }
	}

	/// Creates a store that persists into `backend` under an explicit key.
	pub fn with_key(backend: Arc<dyn BlobStore>, key: BlobKey) -> Self {
		Self { backend, key: Some(key) }
	}

	/// Creates a store that never persists anything.
	pub fn disabled() -> Self {
		Self { backend: Arc::new(MemoryBlobStore::default()), key: None }
	}

	/// Returns the key in use, or `None` when persistence is disabled.
	pub fn key(&self) -> Option<&BlobKey> {
		self.key.as_ref()
	}

	/// Persists `response`, replacing any previous blob.
	pub async fn save(&self, response: &AccessTokenResponse) -> Result<(), StoreError> {
		let Some(key) = &self.key else { return Ok(()) };
		let blob = serde_json::to_vec(response)
			.map_err(|e| StoreError::Serialization { message: e.to_string() })?;

		self.backend.put(key, blob).await
	}

	/// Restores the persisted response.
	///
	/// A blob that no longer decodes is reported as absent so a stale schema never blocks
	/// start-up; the next successful refresh overwrites it.
	pub async fn load(&self) -> Result<Option<AccessTokenResponse>, StoreError> {
		let Some(key) = &self.key else { return Ok(None) };
		let Some(blob) = self.backend.get(key).await? else { return Ok(None) };

		match AccessTokenResponse::from_slice(&blob) {
			Ok(response) => Ok(Some(response)),
			Err(e) => {
				tracing::warn!(key = %key.key, path = %e.path(), "discarding undecodable token blob");

				Ok(None)
			},
		}
	}

	/// Removes the persisted response.
	pub async fn clear(&self) -> Result<(), StoreError> {
		let Some(key) = &self.key else { return Ok(()) };

		self.backend.remove(key).await
	}
}
impl Debug for TokenStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenStore").field("key", &self.key).finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::Error;

	fn config(key: Option<&str>) -> TokenConfig {
		let mut builder = TokenConfig::builder()
			.authorization_url("https://auth.example.com/token?grant_type=client_credentials")
			.client_id("client")
			.client_secret("secret")
			.persistence_partition("group.shared");

		if let Some(key) = key {
			builder = builder.persistence_key(key);
		}

		builder.build().expect("Store test configuration should build.")
	}

	#[test]
	fn store_error_converts_into_client_error_with_source() {
		let store_error = StoreError::Backend { message: "disk unavailable".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert!(error.to_string().contains("disk unavailable"));

		let source = StdError::source(&error)
			.expect("Client error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn blob_key_follows_the_configuration() {
		let key = BlobKey::from_config(&config(Some("auth.response")))
			.expect("Configured key should enable persistence.");

		assert_eq!(key, BlobKey::new("auth.response").in_partition("group.shared"));
		assert!(BlobKey::from_config(&config(None)).is_none());
	}

	#[tokio::test]
	async fn save_load_clear_round_trip() {
		let backend = Arc::new(MemoryBlobStore::default());
		let store = TokenStore::new(backend.clone(), &config(Some("auth.response")));
		let response = AccessTokenResponse::new("T1", "Bearer").with_expires_in(3600);

		store.save(&response).await.expect("Saving the response should succeed.");

		let loaded = store.load().await.expect("Loading should succeed.");

		assert_eq!(loaded, Some(response));

		store.clear().await.expect("Clearing should succeed.");

		assert_eq!(store.load().await.expect("Loading should succeed."), None);
	}

	#[tokio::test]
	async fn persisted_blob_uses_wire_field_names() {
		let backend = Arc::new(MemoryBlobStore::default());
		let store = TokenStore::new(backend.clone(), &config(Some("auth.response")));

		store
			.save(&AccessTokenResponse::new("T1", "Bearer"))
			.await
			.expect("Saving the response should succeed.");

		let key = store.key().expect("Store should carry a key.");
		let blob = backend.get(key).await.expect("Backend read should succeed.").expect("Blob exists.");

		assert_eq!(blob, br#"{"access_token":"T1","token_type":"Bearer"}"#.to_vec());
	}

	#[tokio::test]
	async fn undecodable_blob_loads_as_absent() {
		let backend = Arc::new(MemoryBlobStore::default());
		let key = BlobKey::new("auth.response");

		backend.put(&key, b"not json".to_vec()).await.expect("Backend write should succeed.");

		let store = TokenStore::with_key(backend, key);

		assert_eq!(store.load().await.expect("Loading should not fail."), None);
	}

	#[tokio::test]
	async fn disabled_store_is_a_no_op() {
		let store = TokenStore::new(Arc::new(MemoryBlobStore::default()), &config(None));

		store
			.save(&AccessTokenResponse::new("T1", "Bearer"))
			.await
			.expect("Disabled save should succeed.");

		assert!(store.key().is_none());
		assert_eq!(store.load().await.expect("Disabled load should succeed."), None);
		assert!(TokenStore::disabled().key().is_none());
	}
}
