//! Token acquisition for registered clients, with caching and single-flight refresh.
//!
//! [`TokenAuthorizer`] is the contract the request pipeline depends on: given a registered client
//! identity, return a valid non-expired token or fail. [`ClientCredentialsAuthorizer`] fulfils it
//! with the client-credentials grant. It reuses cached tokens until they enter the preemptive
//! refresh window, and a per-identity guard makes concurrent callers wait for one in-flight
//! exchange instead of each hitting the token endpoint. A token the API answers with
//! `401 Unauthorized` is handed back through [`TokenAuthorizer::invalidate`] so the next call
//! fetches a new one.

// self
use crate::{
	_prelude::*,
	auth::{ClientPrincipal, TokenRecord},
	cache::{CacheKey, TokenCache},
	error::AuthorizationError,
	http::{ReqwestHttpClient, TokenHttpClient},
	oauth::{ClientCredentialsExchange, ReqwestTransportErrorMapper, TransportErrorMapper},
	obs::{self, OperationKind},
	registration::{RegistrationId, RegistrationRepository},
};

/// Boxed future returned by [`TokenAuthorizer::authorize`].
pub type AuthorizeFuture<'a> =
	Pin<Box<dyn Future<Output = Result<TokenRecord, AuthorizationError>> + 'a + Send>>;
/// Boxed future returned by [`TokenAuthorizer::invalidate`].
pub type InvalidateFuture<'a> =
	Pin<Box<dyn Future<Output = Result<(), AuthorizationError>> + 'a + Send>>;

/// Supplies access tokens for registered client identities.
pub trait TokenAuthorizer
where
	Self: Send + Sync,
{
	/// Returns a valid, non-expired token for the identity described by `request`.
	fn authorize<'a>(&'a self, request: &'a AuthorizeRequest) -> AuthorizeFuture<'a>;

	/// Drops `rejected` so the next [`authorize`](Self::authorize) call does not return it again.
	///
	/// Authorizers without a cache have nothing to drop.
	fn invalidate<'a>(
		&'a self,
		request: &'a AuthorizeRequest,
		rejected: &'a TokenRecord,
	) -> InvalidateFuture<'a> {
		let _ = (request, rejected);

		Box::pin(async { Ok(()) })
	}
}

/// Identity and freshness requirements for one token lookup.
#[derive(Clone, Debug)]
pub struct AuthorizeRequest {
	/// Registration the token is requested for.
	pub registration_id: RegistrationId,
	/// Principal the token is issued to.
	pub principal: ClientPrincipal,
	/// Cached tokens expiring within this window are refreshed early.
	pub preemptive_window: Duration,
}
impl AuthorizeRequest {
	const DEFAULT_PREEMPTIVE_WINDOW: Duration = Duration::seconds(30);

	/// Creates a request for the provided registration + principal.
	pub fn new(registration_id: RegistrationId, principal: ClientPrincipal) -> Self {
		Self { registration_id, principal, preemptive_window: Self::DEFAULT_PREEMPTIVE_WINDOW }
	}

	/// Overrides the preemptive window (defaults to 30 seconds); negative values clamp to zero.
	pub fn with_preemptive_window(mut self, window: Duration) -> Self {
		self.preemptive_window = if window.is_negative() { Duration::ZERO } else { window };

		self
	}

	/// Cache key for this identity.
	pub fn cache_key(&self) -> CacheKey {
		CacheKey::new(&self.registration_id, self.principal.name())
	}

	/// Determines whether a cached record must be replaced before use.
	pub fn should_refresh(&self, record: &TokenRecord, now: OffsetDateTime) -> bool {
		if record.is_expired_at(now) {
			return true;
		}

		record.expires_at - now <= self.preemptive_window
	}
}

/// Client-credentials [`TokenAuthorizer`] backed by a [`TokenCache`].
pub struct ClientCredentialsAuthorizer<C = ReqwestHttpClient, M = ReqwestTransportErrorMapper>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Registrations the authorizer can issue tokens for.
	pub registrations: Arc<RegistrationRepository>,
	/// Cache holding issued tokens.
	pub cache: Arc<dyn TokenCache>,
	/// HTTP client used for token endpoint calls.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors.
	pub transport_mapper: Arc<M>,
	flow_guards: Arc<Mutex<HashMap<CacheKey, Arc<AsyncMutex<()>>>>>,
}
impl<C, M> ClientCredentialsAuthorizer<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates an authorizer that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		registrations: Arc<RegistrationRepository>,
		cache: Arc<dyn TokenCache>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			registrations,
			cache,
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			flow_guards: Default::default(),
		}
	}

	/// Performs the client-credentials grant unless a fresh cached token exists.
	pub async fn client_credentials(
		&self,
		request: &AuthorizeRequest,
	) -> Result<TokenRecord, AuthorizationError> {
		obs::observe(OperationKind::Authorize, "client_credentials", async move {
			let registration = self.registrations.find(&request.registration_id).ok_or_else(|| {
				AuthorizationError::UnknownRegistration {
					registration: request.registration_id.to_string(),
				}
			})?;
			let key = request.cache_key();
			let guard = self.flow_guard(&key);
			let _singleflight = guard.lock().await;
			let now = OffsetDateTime::now_utc();

			if let Some(current) = self
				.cache
				.load(&key)
				.await?
				.filter(|record| !request.should_refresh(record, now))
			{
				return Ok(current);
			}

			let exchange = <ClientCredentialsExchange<'_, C, M>>::new(
				registration,
				self.http_client.clone(),
				self.transport_mapper.clone(),
			);
			let record = exchange.exchange(&request.principal).await?;

			#[cfg(feature = "tracing")]
			tracing::debug!(
				registration = %record.registration,
				expires_at = %record.expires_at,
				"issued client-credentials token"
			);

			self.cache.save(record.clone()).await?;

			Ok(record)
		})
		.await
	}

	/// Evicts the cached token for `request` if it is still `rejected`.
	///
	/// A newer token cached by a concurrent exchange is kept.
	pub async fn invalidate_token(
		&self,
		request: &AuthorizeRequest,
		rejected: &TokenRecord,
	) -> Result<(), AuthorizationError> {
		let key = request.cache_key();
		let guard = self.flow_guard(&key);
		let _singleflight = guard.lock().await;
		let current = self.cache.load(&key).await?;

		if current.is_some_and(|record| record.access_token == rejected.access_token) {
			self.cache.evict(&key).await?;

			#[cfg(feature = "tracing")]
			tracing::debug!(registration = %key.registration, "evicted rejected token");
		}

		Ok(())
	}

	fn flow_guard(&self, key: &CacheKey) -> Arc<AsyncMutex<()>> {
		let mut guards = self.flow_guards.lock();

		guards.entry(key.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}
}
impl ClientCredentialsAuthorizer<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates an authorizer with its own default reqwest transport.
	pub fn new(registrations: Arc<RegistrationRepository>, cache: Arc<dyn TokenCache>) -> Self {
		Self::with_http_client(
			registrations,
			cache,
			ReqwestHttpClient::default(),
			ReqwestTransportErrorMapper,
		)
	}
}
impl<C, M> TokenAuthorizer for ClientCredentialsAuthorizer<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn authorize<'a>(&'a self, request: &'a AuthorizeRequest) -> AuthorizeFuture<'a> {
		Box::pin(self.client_credentials(request))
	}

	fn invalidate<'a>(
		&'a self,
		request: &'a AuthorizeRequest,
		rejected: &'a TokenRecord,
	) -> InvalidateFuture<'a> {
		Box::pin(self.invalidate_token(request, rejected))
	}
}
impl<C, M> Debug for ClientCredentialsAuthorizer<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentialsAuthorizer")
			.field("registrations", &self.registrations.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::{_preludet::test_registration, cache::MemoryTokenCache};

	fn record(expires_at: OffsetDateTime) -> TokenRecord {
		TokenRecord::builder(RegistrationId::default(), "test")
			.access_token("token")
			.issued_at(expires_at - Duration::hours(1))
			.expires_at(expires_at)
			.build()
			.expect("Token record fixture should build.")
	}

	fn request() -> AuthorizeRequest {
		AuthorizeRequest::new(RegistrationId::default(), ClientPrincipal::new("test"))
	}

	#[test]
	fn refresh_window() {
		let now = macros::datetime!(2025-01-01 00:00 UTC);
		let fresh = record(now + Duration::minutes(10));
		let closing = record(now + Duration::seconds(10));
		let expired = record(now - Duration::seconds(1));

		assert!(!request().should_refresh(&fresh, now));
		assert!(request().should_refresh(&closing, now));
		assert!(request().should_refresh(&expired, now));
		assert!(
			!request().with_preemptive_window(Duration::seconds(-5)).should_refresh(&closing, now)
		);
	}

	#[tokio::test]
	async fn invalidate_evicts_only_the_rejected_token() {
		let cache = Arc::new(MemoryTokenCache::default());
		let authorizer = ClientCredentialsAuthorizer::new(
			Arc::new(RegistrationRepository::from_iter([test_registration(
				"https://localhost/oauth2/token",
			)])),
			cache.clone(),
		);
		let now = OffsetDateTime::now_utc();
		let current = record(now + Duration::hours(1));
		let stale = TokenRecord::builder(RegistrationId::default(), "test")
			.access_token("older-token")
			.issued_at(now - Duration::hours(1))
			.expires_at(now + Duration::minutes(5))
			.build()
			.expect("Stale record fixture should build.");

		cache.save(current.clone()).await.expect("Save should succeed.");
		authorizer.invalidate(&request(), &stale).await.expect("Invalidate should succeed.");

		assert_eq!(cache.len(), 1);

		authorizer.invalidate(&request(), &current).await.expect("Invalidate should succeed.");

		assert!(cache.is_empty());
	}

	#[test]
	fn cache_key_uses_registration_and_principal() {
		assert_eq!(request().cache_key(), CacheKey::new(&RegistrationId::default(), "test"));
	}
}
