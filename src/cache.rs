//! Token cache contract and the built-in in-memory implementation.
//!
//! The cache is an explicit dependency of the authorizer rather than shared global state, so
//! callers decide whether several clients reuse the same tokens.

pub mod memory;

pub use memory::MemoryTokenCache;

// self
use crate::{_prelude::*, auth::TokenRecord, registration::RegistrationId};

/// Boxed future returned by [`TokenCache`] operations.
pub type CacheFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CacheError>> + 'a + Send>>;

/// Storage contract for issued access tokens.
pub trait TokenCache
where
	Self: Send + Sync,
{
	/// Stores or replaces the record for its registration + principal.
	fn save(&self, record: TokenRecord) -> CacheFuture<'_, ()>;

	/// Loads the record stored under `key`, if any.
	fn load<'a>(&'a self, key: &'a CacheKey) -> CacheFuture<'a, Option<TokenRecord>>;

	/// Removes and returns the record stored under `key`.
	fn evict<'a>(&'a self, key: &'a CacheKey) -> CacheFuture<'a, Option<TokenRecord>>;
}

/// Error type produced by [`TokenCache`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CacheError {
	/// Backend-level failure for the cache engine.
	#[error("Token cache backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Identity a cached token belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
	/// Registration component.
	pub registration: RegistrationId,
	/// Principal name component.
	pub principal: String,
}
impl CacheKey {
	/// Builds a key from its parts.
	pub fn new(registration: &RegistrationId, principal: &str) -> Self {
		Self { registration: registration.clone(), principal: principal.to_owned() }
	}

	/// Builds the key a record is stored under.
	pub fn for_record(record: &TokenRecord) -> Self {
		Self::new(&record.registration, &record.principal)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::AuthorizationError;

	#[test]
	fn cache_error_converts_into_authorization_error() {
		let err: AuthorizationError =
			CacheError::Backend { message: "redis unreachable".into() }.into();

		assert!(matches!(err, AuthorizationError::Cache(_)));
		assert!(err.to_string().contains("redis unreachable"));
	}

	#[test]
	fn record_key_matches_manual_key() {
		let record = TokenRecord::builder(RegistrationId::default(), "test")
			.access_token("token")
			.expires_in(Duration::minutes(1))
			.build()
			.expect("Token record should build.");

		assert_eq!(CacheKey::for_record(&record), CacheKey::new(&RegistrationId::default(), "test"));
	}
}
