//! Single-record JSON file store (`auth_response.json` and friends).

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::Credential,
	store::{CredentialStore, StoreError, StoreFuture},
};

/// Persists the credential to a pretty-printed JSON file, replacing it atomically on save.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	write_lock: Arc<Mutex<()>>,
}
impl FileStore {
	/// Creates a store rooted at `path`; the file itself is created on the first save.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into(), write_lock: Default::default() }
	}

	/// Path of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn read_record(path: &Path) -> Result<Option<Credential>, StoreError> {
		if !path.exists() {
			return Ok(None);
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.iter().all(u8::is_ascii_whitespace) {
			return Ok(None);
		}

		serde_json::from_slice(&bytes).map(Some).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn write_record(&self, credential: &Credential) -> Result<(), StoreError> {
		let _guard = self.write_lock.lock();

		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(credential).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize credential: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl CredentialStore for FileStore {
	fn load(&self) -> StoreFuture<'_, Option<Credential>> {
		Box::pin(async move { Self::read_record(&self.path) })
	}

	fn save(&self, credential: Credential) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.write_record(&credential) })
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// self
	use super::*;
	use crate::auth::{OwnerId, ProviderId};

	fn temp_path(tag: &str) -> PathBuf {
		let unique = format!(
			"seller_ledger_file_store_{tag}_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	fn credential(access: &str) -> Credential {
		Credential::builder(
			ProviderId::new("mercadolibre").expect("Provider fixture should be valid."),
			OwnerId::new("7788").expect("Owner fixture should be valid."),
		)
		.access_token(access)
		.refresh_token("TG-refresh")
		.expires_in(Duration::hours(6))
		.build()
		.expect("Failed to build file-store test credential.")
	}

	#[tokio::test]
	async fn save_overwrites_and_reloads() {
		let path = temp_path("overwrite");
		let store = FileStore::new(&path);

		assert!(store.load().await.expect("Missing file should load as empty.").is_none());

		store.save(credential("APP_USR-1")).await.expect("First save should succeed.");
		store.save(credential("APP_USR-2")).await.expect("Second save should succeed.");

		let reopened = FileStore::new(&path);
		let loaded = reopened
			.load()
			.await
			.expect("Saved file should load.")
			.expect("Saved file should hold a credential.");

		assert_eq!(loaded.access_token.expose(), "APP_USR-2");
		assert!(!path.with_extension("tmp").exists());

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary credential file {}: {e}", path.display())
		});
	}

	#[tokio::test]
	async fn empty_file_loads_as_missing_and_garbage_is_an_error() {
		let path = temp_path("garbage");

		fs::write(&path, b"\n").expect("Fixture file should be writable.");

		let store = FileStore::new(&path);

		assert!(store.load().await.expect("Blank file should load as empty.").is_none());

		fs::write(&path, b"{not json").expect("Fixture file should be writable.");

		let err = store.load().await.expect_err("Garbage must surface as an error.");

		assert!(matches!(err, StoreError::Serialization { .. }));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary credential file {}: {e}", path.display())
		});
	}
}
