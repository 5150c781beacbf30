//! CRUD operations against `/api/v1/beer`.

// crates.io
use reqwest::{
	Method, RequestBuilder, Response, StatusCode,
	header::{ACCEPT, CONTENT_TYPE, HeaderMap, LOCATION},
};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	authorizer::ClientCredentialsAuthorizer,
	beer::{Beer, BeerPage, ListBeersQuery},
	cache::{MemoryTokenCache, TokenCache},
	config::ClientConfig,
	error::{RemoteError, TransportError},
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
	obs::{self, OperationKind},
	pipeline::AuthorizingPipeline,
	registration::RegistrationRepository,
};

/// Collection path, relative to the base URL.
pub const BEER_PATH: &str = "/api/v1/beer";

const JSON: &str = "application/json";

/// Typed client for the Beer API.
///
/// Every request goes through an [`AuthorizingPipeline`], so each call first obtains (or reuses)
/// a bearer token. Cloning is cheap and clones share the transport and the token cache.
///
/// Create and update are two round-trips each (mutation, then a read). They are not atomic: when
/// the follow-up read fails its error is returned even though the mutation already happened.
#[derive(Clone, Debug)]
pub struct BeerClient {
	base_url: Url,
	pipeline: AuthorizingPipeline,
}
impl BeerClient {
	/// Wires the default stack: a reqwest transport, an in-memory token cache, and the
	/// client-credentials authorizer bound to `config.registration_id`.
	pub fn new(config: &ClientConfig, registrations: RegistrationRepository) -> Result<Self> {
		config.validate()?;

		let registrations = Arc::new(registrations);
		let http_client = ReqwestHttpClient::from_builder(ReqwestClient::builder())?;
		let cache: Arc<dyn TokenCache> = Arc::new(MemoryTokenCache::default());
		let authorizer = <ClientCredentialsAuthorizer>::with_http_client(
			registrations.clone(),
			cache,
			http_client.clone(),
			ReqwestTransportErrorMapper,
		);
		let pipeline = AuthorizingPipeline::new(
			http_client,
			Arc::new(authorizer),
			&registrations,
			&config.registration_id,
		)?;

		Ok(Self::with_pipeline(config.base_url.clone(), pipeline))
	}

	/// Uses a caller-assembled pipeline.
	pub fn with_pipeline(base_url: Url, pipeline: AuthorizingPipeline) -> Self {
		Self { base_url, pipeline }
	}

	/// API base URL.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Lists one page of beers matching `query`.
	pub async fn list_beers(&self, query: &ListBeersQuery) -> Result<BeerPage> {
		obs::observe(OperationKind::ListBeers, "list_beers", async move {
			let mut url = self.collection_url();

			query.apply_to(&mut url);

			let response = self.send(self.pipeline.request(Method::GET, url).header(ACCEPT, JSON)).await?;

			if !response.status().is_success() {
				return Err(remote_status(response).await);
			}

			decode(response).await
		})
		.await
	}

	/// Lists the first page with server defaults.
	pub async fn list_all_beers(&self) -> Result<BeerPage> {
		self.list_beers(&ListBeersQuery::default()).await
	}

	/// Fetches one beer; `404` maps to [`Error::NotFound`].
	pub async fn get_beer_by_id(&self, id: Uuid) -> Result<Beer> {
		obs::observe(OperationKind::GetBeer, "get_beer_by_id", self.fetch(self.item_url(id))).await
	}

	/// Creates `beer` and returns the stored resource read back from its `Location`.
	pub async fn create_beer(&self, beer: &Beer) -> Result<Beer> {
		obs::observe(OperationKind::CreateBeer, "create_beer", async move {
			let response = self.send_json(Method::POST, self.collection_url(), beer).await?;
			let status = response.status();

			if !status.is_success() {
				return Err(remote_status(response).await);
			}

			let location = self.location_url(status.as_u16(), response.headers())?;

			self.fetch(location).await
		})
		.await
	}

	/// Replaces the beer identified by `beer.id` and returns the stored state.
	///
	/// Any non-2xx answer to the `PUT`, `404` included, is an [`Error::Remote`].
	pub async fn update_beer(&self, beer: &Beer) -> Result<Beer> {
		obs::observe(OperationKind::UpdateBeer, "update_beer", async move {
			let id = beer.id.ok_or(Error::MissingBeerId)?;
			let url = self.item_url(id);
			let response = self.send_json(Method::PUT, url.clone(), beer).await?;

			if !response.status().is_success() {
				return Err(remote_status(response).await);
			}

			self.fetch(url).await
		})
		.await
	}

	/// Deletes one beer; `404` maps to [`Error::NotFound`].
	pub async fn delete_beer(&self, id: Uuid) -> Result<()> {
		obs::observe(OperationKind::DeleteBeer, "delete_beer", async move {
			let url = self.item_url(id);
			let response = self.send(self.pipeline.request(Method::DELETE, url.clone())).await?;

			match response.status() {
				StatusCode::NOT_FOUND => Err(Error::NotFound { url: url.to_string() }),
				status if status.is_success() => Ok(()),
				_ => Err(remote_status(response).await),
			}
		})
		.await
	}

	async fn fetch(&self, url: Url) -> Result<Beer> {
		let response =
			self.send(self.pipeline.request(Method::GET, url.clone()).header(ACCEPT, JSON)).await?;

		match response.status() {
			StatusCode::NOT_FOUND => Err(Error::NotFound { url: url.to_string() }),
			status if status.is_success() => decode(response).await,
			_ => Err(remote_status(response).await),
		}
	}

	async fn send_json(&self, method: Method, url: Url, beer: &Beer) -> Result<Response> {
		let body = serde_json::to_vec(beer).map_err(Error::Encode)?;

		self.send(
			self.pipeline
				.request(method, url)
				.header(CONTENT_TYPE, JSON)
				.header(ACCEPT, JSON)
				.body(body),
		)
		.await
	}

	async fn send(&self, builder: RequestBuilder) -> Result<Response> {
		let request = builder.build().map_err(TransportError::from)?;

		self.pipeline.authorize_and_send(request).await
	}

	fn collection_url(&self) -> Url {
		self.endpoint(BEER_PATH)
	}

	fn item_url(&self, id: Uuid) -> Url {
		self.endpoint(&format!("{BEER_PATH}/{id}"))
	}

	fn endpoint(&self, path: &str) -> Url {
		let mut url = self.base_url.clone();
		let prefix = self.base_url.path().trim_end_matches('/');

		url.set_path(&format!("{prefix}{path}"));
		url.set_query(None);
		url.set_fragment(None);

		url
	}

	// Only the path of `Location` is kept; scheme, host and port come from the base URL.
	fn location_url(&self, status: u16, headers: &HeaderMap) -> Result<Url, RemoteError> {
		let raw = headers.get(LOCATION).ok_or(RemoteError::MissingLocation { status })?;
		let invalid = || RemoteError::InvalidLocation {
			status,
			location: String::from_utf8_lossy(raw.as_bytes()).into_owned(),
		};
		let location = raw.to_str().map_err(|_| invalid())?;

		if location.trim().is_empty() {
			return Err(invalid());
		}

		let resolved = self.base_url.join(location).map_err(|_| invalid())?;
		let mut url = self.base_url.clone();

		url.set_path(resolved.path());
		url.set_query(None);
		url.set_fragment(None);

		Ok(url)
	}
}

async fn decode<T>(response: Response) -> Result<T>
where
	T: DeserializeOwned,
{
	let status = response.status().as_u16();
	let bytes = response.bytes().await.map_err(TransportError::from)?;
	let mut deserializer = serde_json::Deserializer::from_slice(&bytes);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|source| Error::Decode { source, status })
}

async fn remote_status(response: Response) -> Error {
	let status = response.status().as_u16();
	let body = body_text(response.text().await);

	#[cfg(feature = "tracing")]
	tracing::warn!(status, body_len = body.len(), "remote API rejected the request");

	RemoteError::Status { status, body }.into()
}

// A body that cannot be read is reported in place of the body so the status is not lost.
fn body_text<E>(read: Result<String, E>) -> String
where
	E: Display,
{
	match read {
		Ok(body) => body,
		Err(e) => {
			#[cfg(feature = "tracing")]
			tracing::warn!(error = %e, "failed to read error response body");

			format!("<unreadable response body: {e}>")
		},
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use reqwest::header::HeaderValue;
	// self
	use super::*;
	use crate::_preludet::{StaticAuthorizer, build_test_client_with_authorizer};

	fn client(base_url: &str) -> BeerClient {
		build_test_client_with_authorizer(base_url, Arc::new(StaticAuthorizer::new("testToken")))
	}

	fn location(value: &'static str) -> HeaderMap {
		let mut headers = HeaderMap::new();

		headers.insert(LOCATION, HeaderValue::from_static(value));

		headers
	}

	#[test]
	fn endpoints_hang_off_the_base_path() {
		let id = Uuid::parse_str("5f2b8f7e-3f44-4c59-9a52-8f0d5d1a7b11").expect("Id should parse.");
		let root = client("http://localhost:8080");
		let prefixed = client("http://localhost:8080/brewery/");

		assert_eq!(root.collection_url().as_str(), "http://localhost:8080/api/v1/beer");
		assert_eq!(
			root.item_url(id).as_str(),
			"http://localhost:8080/api/v1/beer/5f2b8f7e-3f44-4c59-9a52-8f0d5d1a7b11"
		);
		assert_eq!(prefixed.collection_url().as_str(), "http://localhost:8080/brewery/api/v1/beer");
	}

	#[test]
	fn location_keeps_only_the_path() {
		let client = client("http://localhost:8080");
		let absolute = client
			.location_url(201, &location("http://beer-api.internal:9000/api/v1/beer/42?x=1"))
			.expect("Absolute location should resolve.");
		let relative = client
			.location_url(201, &location("/api/v1/beer/42"))
			.expect("Relative location should resolve.");

		assert_eq!(absolute.as_str(), "http://localhost:8080/api/v1/beer/42");
		assert_eq!(relative, absolute);
	}

	#[test]
	fn location_failures_are_remote_errors() {
		let client = client("http://localhost:8080");

		assert!(matches!(
			client.location_url(201, &HeaderMap::new()),
			Err(RemoteError::MissingLocation { status: 201 })
		));
		assert!(matches!(
			client.location_url(202, &location("http://[broken")),
			Err(RemoteError::InvalidLocation { status: 202, .. })
		));
	}

	#[test]
	fn unreadable_body_is_described() {
		let failed: Result<String, std::io::Error> =
			Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "connection closed"));

		assert_eq!(body_text(Ok::<_, std::io::Error>("boom".into())), "boom");
		assert_eq!(body_text(failed), "<unreadable response body: connection closed>");
	}

	#[tokio::test]
	async fn update_without_id_is_rejected_before_sending() {
		let authorizer = Arc::new(StaticAuthorizer::new("testToken"));
		let client = build_test_client_with_authorizer("http://127.0.0.1:9", authorizer.clone());
		let beer = Beer::new(
			"Galaxy Cat",
			crate::beer::BeerStyle::PaleAle,
			"9122089364369",
			rust_decimal::Decimal::new(1299, 2),
		);
		let err = client.update_beer(&beer).await.expect_err("Update without id must fail.");

		assert!(matches!(err, Error::MissingBeerId));
		assert_eq!(authorizer.calls(), 0);
	}
}
