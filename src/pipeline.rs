//! Request pipeline that authorizes every outbound call with a bearer token.

// crates.io
use reqwest::{
	Method, Request, RequestBuilder, Response, StatusCode,
	header::{AUTHORIZATION, HeaderValue},
};
// self
use crate::{
	_prelude::*,
	auth::{ClientPrincipal, TokenRecord},
	authorizer::{AuthorizeRequest, TokenAuthorizer},
	error::{ConfigError, TransportError},
	http::ReqwestHttpClient,
	obs::{self, OperationKind},
	registration::{RegistrationId, RegistrationRepository},
};

/// Attaches `Authorization: Bearer <token>` to requests before handing them to the transport.
///
/// The pipeline is bound to one registration, resolved when it is built. Token acquisition
/// failures abort the request before anything is sent and are never retried. A `401` from the
/// API invalidates the token it rejected; the response is still returned unchanged.
#[derive(Clone)]
pub struct AuthorizingPipeline {
	http_client: ReqwestHttpClient,
	authorizer: Arc<dyn TokenAuthorizer>,
	registration_id: RegistrationId,
	principal: ClientPrincipal,
}
impl AuthorizingPipeline {
	/// Binds the pipeline to the registration stored under `registration_id`.
	///
	/// Fails with [`ConfigError::UnknownRegistration`] when the key is not configured.
	pub fn new(
		http_client: ReqwestHttpClient,
		authorizer: Arc<dyn TokenAuthorizer>,
		registrations: &RegistrationRepository,
		registration_id: &RegistrationId,
	) -> Result<Self> {
		let registration = registrations.require(registration_id)?;
		let principal = ClientPrincipal::new(registration.client_id.clone());

		Ok(Self { http_client, authorizer, registration_id: registration_id.clone(), principal })
	}

	/// Registration the pipeline requests tokens for.
	pub fn registration_id(&self) -> &RegistrationId {
		&self.registration_id
	}

	/// Principal presented to the authorizer.
	pub fn principal(&self) -> &ClientPrincipal {
		&self.principal
	}

	/// Starts a request on the shared transport; finish it with [`Self::authorize_and_send`].
	pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
		self.http_client.request(method, url)
	}

	/// Obtains a token, sets the bearer header (replacing any previous value), and sends
	/// `request`.
	///
	/// Responses are returned as-is regardless of status; transport failures surface as
	/// [`Error::Transport`].
	pub async fn authorize_and_send(&self, mut request: Request) -> Result<Response> {
		obs::observe(OperationKind::Dispatch, "authorize_and_send", async move {
			let authorize = self.authorize_request();
			let record = self.authorize(&authorize, &mut request).await?;

			#[cfg(feature = "tracing")]
			tracing::debug!(method = %request.method(), url = %request.url(), "sending authorized request");

			let response = self.http_client.execute(request).await.map_err(TransportError::from)?;

			if response.status() == StatusCode::UNAUTHORIZED {
				if let Err(e) = self.authorizer.invalidate(&authorize, &record).await {
					#[cfg(feature = "tracing")]
					tracing::warn!(error = %e, "failed to invalidate rejected token");
					#[cfg(not(feature = "tracing"))]
					let _ = e;
				}
			}

			Ok(response)
		})
		.await
	}

	fn authorize_request(&self) -> AuthorizeRequest {
		AuthorizeRequest::new(self.registration_id.clone(), self.principal.clone())
	}

	// Replaces every existing `Authorization` value with the bearer token.
	async fn authorize(
		&self,
		authorize: &AuthorizeRequest,
		request: &mut Request,
	) -> Result<TokenRecord> {
		let record = self.authorizer.authorize(authorize).await?;
		let mut value = HeaderValue::from_str(&record.access_token.bearer())
			.map_err(|_| ConfigError::InvalidToken)?;

		value.set_sensitive(true);
		request.headers_mut().insert(AUTHORIZATION, value);

		Ok(record)
	}
}
impl Debug for AuthorizingPipeline {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizingPipeline")
			.field("registration_id", &self.registration_id)
			.field("principal", &self.principal)
			.finish()
	}
}
