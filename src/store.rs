//! Storage contract and built-in stores for the single per-provider credential.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::Credential};

/// Future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence contract for the latest credential of one marketplace connection.
///
/// A store holds at most one record; `save` overwrites whatever was there.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Loads the stored credential, or `None` when nothing has been saved yet.
	fn load(&self) -> StoreFuture<'_, Option<Credential>>;

	/// Persists `credential`, replacing any previous record.
	fn save(&self, credential: Credential) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum StoreError {
	/// Stored bytes could not be (de)serialized.
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

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;

	#[test]
	fn store_error_converts_into_ledger_error_with_source() {
		let store_error = StoreError::Backend { message: "disk full".into() };
		let ledger_error: Error = store_error.clone().into();

		assert!(matches!(ledger_error, Error::Storage(_)));
		assert!(ledger_error.to_string().contains("disk full"));

		let source = StdError::source(&ledger_error)
			.expect("Ledger error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}
}
