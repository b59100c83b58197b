//! Thread-safe in-memory [`BlobStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	store::{BlobKey, BlobStore, StoreFuture},
};

type BlobMap = Arc<RwLock<HashMap<BlobKey, Vec<u8>>>>;

/// Storage backend that keeps blobs in-process; clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryBlobStore(BlobMap);
impl MemoryBlobStore {
	/// Number of stored blobs across all partitions.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl BlobStore for MemoryBlobStore {
	fn get<'a>(&'a self, key: &'a BlobKey) -> StoreFuture<'a, Option<Vec<u8>>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(key).cloned()) })
	}

	fn put<'a>(&'a self, key: &'a BlobKey, blob: Vec<u8>) -> StoreFuture<'a, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().insert(key.clone(), blob);

			Ok(())
		})
	}

	fn remove<'a>(&'a self, key: &'a BlobKey) -> StoreFuture<'a, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().remove(key);

			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn partitions_isolate_equal_keys() {
		let store = MemoryBlobStore::default();
		let app = BlobKey::new("auth.response");
		let shared = BlobKey::new("auth.response").in_partition("group.shared");

		store.put(&app, b"app".to_vec()).await.expect("Put should succeed.");
		store.put(&shared, b"shared".to_vec()).await.expect("Put should succeed.");

		assert_eq!(store.len(), 2);
		assert_eq!(store.get(&app).await.expect("Get should succeed."), Some(b"app".to_vec()));

		store.remove(&shared).await.expect("Remove should succeed.");
		store.remove(&shared).await.expect("Removing twice should succeed.");

		assert_eq!(store.get(&shared).await.expect("Get should succeed."), None);
		assert!(!store.is_empty());
	}
}
