//! Thread-safe in-memory [`TokenCache`] implementation.

// self
use crate::{
	_prelude::*,
	auth::TokenRecord,
	cache::{CacheFuture, CacheKey, TokenCache},
};

type CacheMap = Arc<RwLock<HashMap<CacheKey, TokenRecord>>>;

/// Process-local token cache; clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryTokenCache(CacheMap);
impl MemoryTokenCache {
	/// Number of cached records.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when nothing is cached.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	/// Returns the cached record for `key` without going through the async contract.
	pub fn peek(&self, key: &CacheKey) -> Option<TokenRecord> {
		self.0.read().get(key).cloned()
	}
}
impl TokenCache for MemoryTokenCache {
	fn save(&self, record: TokenRecord) -> CacheFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().insert(CacheKey::for_record(&record), record);

			Ok(())
		})
	}

	fn load<'a>(&'a self, key: &'a CacheKey) -> CacheFuture<'a, Option<TokenRecord>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(key).cloned()) })
	}

	fn evict<'a>(&'a self, key: &'a CacheKey) -> CacheFuture<'a, Option<TokenRecord>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.write().remove(key)) })
	}
}
