//! Typed async client for the Beer REST API: list, fetch, create, update, and delete beers
//! through a request pipeline that attaches an OAuth 2.0 client-credentials bearer token to
//! every outbound call.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod authorizer;
pub mod beer;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod pipeline;
pub mod registration;
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests and demos.

	pub use crate::_prelude::*;

	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use crate::{
		auth::{TokenRecord, TokenSecret},
		authorizer::{AuthorizeFuture, AuthorizeRequest, ClientCredentialsAuthorizer, TokenAuthorizer},
		beer::BeerClient,
		cache::{MemoryTokenCache, TokenCache},
		error::AuthorizationError,
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		pipeline::AuthorizingPipeline,
		registration::{ClientAuthMethod, ClientRegistration, RegistrationId, RegistrationRepository},
	};

	/// Client identifier used by test registrations.
	pub const TEST_CLIENT_ID: &str = "test";
	/// Client secret used by test registrations.
	pub const TEST_CLIENT_SECRET: &str = "test-secret";

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Builds the default `springauth` registration pointing at `token_endpoint`.
	pub fn test_registration(token_endpoint: &str) -> ClientRegistration {
		ClientRegistration::builder(RegistrationId::default())
			.client_id(TEST_CLIENT_ID)
			.client_secret(TEST_CLIENT_SECRET)
			.token_endpoint(
				Url::parse(token_endpoint).expect("Test token endpoint should be a valid URL."),
			)
			.client_auth_method(ClientAuthMethod::ClientSecretPost)
			.build()
			.expect("Test registration should build successfully.")
	}

	/// Wires a [`BeerClient`] through the real client-credentials authorizer, an in-memory
	/// token cache, and the insecure test transport.
	pub fn build_reqwest_test_client(
		base_url: &str,
		token_endpoint: &str,
	) -> (BeerClient, Arc<MemoryTokenCache>) {
		let registrations =
			Arc::new(RegistrationRepository::from_iter([test_registration(token_endpoint)]));
		let cache_backend = Arc::new(MemoryTokenCache::default());
		let cache: Arc<dyn TokenCache> = cache_backend.clone();
		let http_client = test_reqwest_http_client();
		let authorizer = <ClientCredentialsAuthorizer>::with_http_client(
			registrations.clone(),
			cache,
			http_client.clone(),
			Arc::new(ReqwestTransportErrorMapper),
		);
		let pipeline = AuthorizingPipeline::new(
			http_client,
			Arc::new(authorizer),
			&registrations,
			&RegistrationId::default(),
		)
		.expect("Test pipeline should resolve the default registration.");
		let client = BeerClient::with_pipeline(
			Url::parse(base_url).expect("Test base URL should be valid."),
			pipeline,
		);

		(client, cache_backend)
	}

	/// Wires a [`BeerClient`] whose pipeline uses `authorizer` instead of a token endpoint.
	pub fn build_test_client_with_authorizer(
		base_url: &str,
		authorizer: Arc<dyn TokenAuthorizer>,
	) -> BeerClient {
		let registrations = RegistrationRepository::from_iter([test_registration(
			"https://localhost/oauth2/token",
		)]);
		let pipeline = AuthorizingPipeline::new(
			test_reqwest_http_client(),
			authorizer,
			&registrations,
			&RegistrationId::default(),
		)
		.expect("Test pipeline should resolve the default registration.");

		BeerClient::with_pipeline(
			Url::parse(base_url).expect("Test base URL should be valid."),
			pipeline,
		)
	}

	/// Authorizer that hands out a fixed token and counts how often it was asked.
	#[derive(Debug)]
	pub struct StaticAuthorizer {
		token: TokenSecret,
		calls: AtomicUsize,
	}
	impl StaticAuthorizer {
		/// Creates an authorizer that always returns `token`.
		pub fn new(token: impl Into<String>) -> Self {
			Self { token: TokenSecret::new(token), calls: AtomicUsize::new(0) }
		}

		/// Number of `authorize` calls observed so far.
		pub fn calls(&self) -> usize {
			self.calls.load(Ordering::SeqCst)
		}
	}
	impl TokenAuthorizer for StaticAuthorizer {
		fn authorize<'a>(&'a self, request: &'a AuthorizeRequest) -> AuthorizeFuture<'a> {
			self.calls.fetch_add(1, Ordering::SeqCst);

			let record = TokenRecord::builder(
				request.registration_id.clone(),
				request.principal.name().to_owned(),
			)
			.access_token(self.token.expose())
			.issued_now()
			.expires_in(Duration::hours(1))
			.build()
			.map_err(AuthorizationError::from);

			Box::pin(async move { record })
		}
	}

	/// Authorizer that always fails, as if the token endpoint refused the client.
	#[derive(Debug, Default)]
	pub struct RejectingAuthorizer;
	impl TokenAuthorizer for RejectingAuthorizer {
		fn authorize<'a>(&'a self, _request: &'a AuthorizeRequest) -> AuthorizeFuture<'a> {
			Box::pin(async move {
				Err(AuthorizationError::InvalidClient { reason: "missing credentials".into() })
			})
		}
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;
	pub use uuid::Uuid;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
pub use uuid;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
