//! File-backed [`BlobStore`] for lightweight deployments.
//!
//! Each blob lives in its own file under `root/<partition>/<key>.blob`, where both path
//! components are SHA-256 digests so arbitrary key strings map to portable file names.

// std
use std::{
	fs::{self, File},
	io::{ErrorKind, Write},
	path::{Path, PathBuf},
};
// crates.io
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	store::{BlobKey, BlobStore, StoreError, StoreFuture},
};

const DEFAULT_PARTITION_DIR: &str = "default";

/// Persists each blob to a dedicated file after every mutation.
#[derive(Clone, Debug)]
pub struct FileBlobStore {
	root: PathBuf,
	write_lock: Arc<Mutex<()>>,
}
impl FileBlobStore {
	/// Opens (or creates) a store rooted at `root`.
	pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let root = root.into();

		fs::create_dir_all(&root).map_err(|e| StoreError::Backend {
			message: format!("Failed to create store directory {}: {e}", root.display()),
		})?;

		Ok(Self { root, write_lock: Default::default() })
	}

	/// Root directory of the store.
	pub fn root(&self) -> &Path {
		&self.root
	}

	/// File that holds the blob for `key`.
	pub fn path_for(&self, key: &BlobKey) -> PathBuf {
		let partition = match &key.partition {
			Some(partition) => format!("p-{}", hex_digest(partition)),
			None => DEFAULT_PARTITION_DIR.into(),
		};

		self.root.join(partition).join(format!("{}.blob", hex_digest(&key.key)))
	}

	fn read_now(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
		match fs::read(path) {
			Ok(bytes) => Ok(Some(bytes)),
			Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
			Err(e) => Err(StoreError::Backend {
				message: format!("Failed to read {}: {e}", path.display()),
			}),
		}
	}

	fn write_now(path: &Path, blob: &[u8]) -> Result<(), StoreError> {
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create partition directory {}: {e}", parent.display()),
			})?;
		}

		let tmp_path = path.with_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(blob).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", path.display()),
		})
	}

	fn remove_now(path: &Path) -> Result<(), StoreError> {
		match fs::remove_file(path) {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StoreError::Backend {
				message: format!("Failed to remove {}: {e}", path.display()),
			}),
		}
	}
}
impl BlobStore for FileBlobStore {
	fn get<'a>(&'a self, key: &'a BlobKey) -> StoreFuture<'a, Option<Vec<u8>>> {
		Box::pin(async move { Self::read_now(&self.path_for(key)) })
	}

	fn put<'a>(&'a self, key: &'a BlobKey, blob: Vec<u8>) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			let path = self.path_for(key);
			let _guard = self.write_lock.lock();

			Self::write_now(&path, &blob)
		})
	}

	fn remove<'a>(&'a self, key: &'a BlobKey) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			let path = self.path_for(key);
			let _guard = self.write_lock.lock();

			Self::remove_now(&path)
		})
	}
}

fn hex_digest(value: &str) -> String {
	Sha256::digest(value.as_bytes()).iter().map(|byte| format!("{byte:02x}")).collect()
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process, time::SystemTime};
	// self
	use super::*;

	fn temp_root() -> PathBuf {
		let nanos = SystemTime::now()
			.duration_since(SystemTime::UNIX_EPOCH)
			.map(|elapsed| elapsed.as_nanos())
			.unwrap_or_default();

		env::temp_dir().join(format!("catalog_client_blob_store_{}_{nanos}", process::id()))
	}

	#[tokio::test]
	async fn blobs_survive_reopen() {
		let root = temp_root();
		let key = BlobKey::new("MyRadio.authResponse").in_partition("group.ch.example.MyRadio");
		let store = FileBlobStore::open(&root).expect("Failed to open file blob store.");

		store.put(&key, b"{\"access_token\":\"T1\"}".to_vec()).await.expect("Put should succeed.");
		drop(store);

		let reopened = FileBlobStore::open(&root).expect("Failed to reopen file blob store.");
		let blob = reopened.get(&key).await.expect("Get should succeed.");

		assert_eq!(blob, Some(b"{\"access_token\":\"T1\"}".to_vec()));
		assert!(reopened.path_for(&key).starts_with(&root));

		reopened.remove(&key).await.expect("Remove should succeed.");

		assert_eq!(reopened.get(&key).await.expect("Get should succeed."), None);

		fs::remove_dir_all(&root).unwrap_or_else(|e| {
			panic!("Failed to remove temporary blob store {}: {e}", root.display())
		});
	}

	#[test]
	fn partitions_map_to_distinct_directories() {
		let store = FileBlobStore { root: PathBuf::from("/store"), write_lock: Default::default() };
		let plain = store.path_for(&BlobKey::new("a/b"));
		let scoped = store.path_for(&BlobKey::new("a/b").in_partition("shared"));

		assert_ne!(plain, scoped);
		assert!(plain.starts_with("/store/default"));
		assert_eq!(plain.extension().and_then(|ext| ext.to_str()), Some("blob"));
		assert_eq!(plain.file_stem().map(|stem| stem.len()), Some(64));
	}
}
