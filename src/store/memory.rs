//! In-process [`CredentialStore`] for tests and short-lived tools.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	auth::Credential,
	store::{CredentialStore, StoreFuture},
};

/// Thread-safe single-slot store that also counts saves.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
	slot: Arc<RwLock<Option<Credential>>>,
	saves: Arc<AtomicU64>,
}
impl MemoryStore {
	/// Creates a store pre-seeded with `credential`.
	pub fn with_credential(credential: Credential) -> Self {
		Self { slot: Arc::new(RwLock::new(Some(credential))), saves: Default::default() }
	}

	/// Returns a copy of the stored credential without going through the async contract.
	pub fn snapshot(&self) -> Option<Credential> {
		self.slot.read().clone()
	}

	/// Number of successful `save` calls.
	pub fn saves(&self) -> u64 {
		self.saves.load(Ordering::Relaxed)
	}
}
impl CredentialStore for MemoryStore {
	fn load(&self) -> StoreFuture<'_, Option<Credential>> {
		Box::pin(async move { Ok(self.snapshot()) })
	}

	fn save(&self, credential: Credential) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			*self.slot.write() = Some(credential);

			self.saves.fetch_add(1, Ordering::Relaxed);

			Ok(())
		})
	}
}
