//! Client-credentials token exchange on top of the `oauth2` crate.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet, HttpClientError,
	RequestTokenError, Scope, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicErrorResponseType, BasicRequestTokenError},
};
// self
use crate::{
	_prelude::*,
	auth::{ClientPrincipal, TokenRecord},
	error::{AuthorizationError, TransportError},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	registration::{ClientAuthMethod, ClientRegistration},
};

type TokenEndpointClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Maps transport failures raised during a token exchange into [`AuthorizationError`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport.
	fn map_transport_error(
		&self,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> AuthorizationError;
}

/// Default mapper for reqwest-backed transports.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> AuthorizationError {
		match err {
			HttpClientError::Reqwest(inner) if inner.is_timeout() =>
				AuthorizationError::TokenEndpoint {
					message: "request timed out while calling the token endpoint".into(),
					status: meta_status(meta).or_else(|| inner.status().map(|s| s.as_u16())),
					retry_after: meta_retry_after(meta),
				},
			HttpClientError::Reqwest(inner) => TransportError::from(*inner).into(),
			HttpClientError::Http(inner) => AuthorizationError::Request(inner),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => AuthorizationError::TokenEndpoint {
				message: format!("HTTP client error while calling the token endpoint: {message}"),
				status: meta_status(meta),
				retry_after: meta_retry_after(meta),
			},
			_ => AuthorizationError::TokenEndpoint {
				message: "HTTP client error while calling the token endpoint".into(),
				status: meta_status(meta),
				retry_after: meta_retry_after(meta),
			},
		}
	}
}

/// Performs the client-credentials grant for one registration.
pub(crate) struct ClientCredentialsExchange<'r, C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	registration: &'r ClientRegistration,
	oauth_client: TokenEndpointClient,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<'r, C, M> ClientCredentialsExchange<'r, C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn new(
		registration: &'r ClientRegistration,
		http_client: Arc<C>,
		error_mapper: Arc<M>,
	) -> Self {
		let token_url = TokenUrl::from_url(registration.token_endpoint.clone());
		let mut oauth_client = BasicClient::new(ClientId::new(registration.client_id.clone()))
			.set_token_uri(token_url);

		if let Some(secret) = &registration.client_secret {
			oauth_client = oauth_client.set_client_secret(ClientSecret::new(secret.expose().to_owned()));
		}
		if matches!(registration.client_auth_method, ClientAuthMethod::ClientSecretPost) {
			oauth_client = oauth_client.set_auth_type(AuthType::RequestBody);
		}

		Self { registration, oauth_client, http_client, error_mapper }
	}

	/// Requests a fresh access token for `principal`.
	pub(crate) async fn exchange(
		&self,
		principal: &ClientPrincipal,
	) -> Result<TokenRecord, AuthorizationError> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let mut request = self.oauth_client.exchange_client_credentials();

		for scope in &self.registration.scopes {
			request = request.add_scope(Scope::new(scope.clone()));
		}

		let response = request
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(meta.take(), err, self.error_mapper.as_ref()))?;
		let expires_in = response
			.expires_in()
			.ok_or(AuthorizationError::InvalidTokenResponse { reason: "expires_in is missing" })?
			.as_secs();
		let expires_in = i64::try_from(expires_in).map_err(|_| {
			AuthorizationError::InvalidTokenResponse { reason: "expires_in is out of range" }
		})?;

		if expires_in <= 0 {
			return Err(AuthorizationError::InvalidTokenResponse {
				reason: "expires_in must be positive",
			});
		}

		let scopes = match response.scopes() {
			Some(granted) => granted.iter().map(|scope| String::clone(scope)).collect(),
			None => self.registration.scopes.clone(),
		};

		TokenRecord::builder(self.registration.id.clone(), principal.name())
			.access_token(response.access_token().secret().to_owned())
			.scopes(scopes)
			.issued_now()
			.expires_in(Duration::seconds(expires_in))
			.build()
			.map_err(AuthorizationError::from)
	}
}

fn map_request_error<E, M>(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> AuthorizationError
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let meta = meta.as_ref();

	match err {
		RequestTokenError::ServerResponse(response) => map_server_response_error(response, meta),
		RequestTokenError::Request(error) => mapper.map_transport_error(meta, error),
		RequestTokenError::Parse(source, _body) =>
			AuthorizationError::TokenResponseParse { source, status: meta_status(meta) },
		RequestTokenError::Other(message) => AuthorizationError::TokenEndpoint {
			message,
			status: meta_status(meta),
			retry_after: meta_retry_after(meta),
		},
	}
}

fn map_server_response_error(
	response: BasicErrorResponse,
	meta: Option<&ResponseMetadata>,
) -> AuthorizationError {
	let reason = match response.error_description() {
		Some(description) => format!("{}: {description}", response.error().as_ref()),
		None => response.error().as_ref().to_owned(),
	};

	match response.error() {
		BasicErrorResponseType::InvalidClient | BasicErrorResponseType::UnauthorizedClient =>
			AuthorizationError::InvalidClient { reason },
		BasicErrorResponseType::InvalidGrant
		| BasicErrorResponseType::InvalidScope
		| BasicErrorResponseType::UnsupportedGrantType => AuthorizationError::InvalidGrant { reason },
		_ => AuthorizationError::TokenEndpoint {
			message: reason,
			status: meta_status(meta),
			retry_after: meta_retry_after(meta),
		},
	}
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

fn meta_retry_after(meta: Option<&ResponseMetadata>) -> Option<Duration> {
	meta.and_then(|value| value.retry_after)
}
