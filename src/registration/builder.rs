//! Validating builder for client registrations.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	registration::{ClientAuthMethod, ClientRegistration, RegistrationId},
};

/// Errors raised while constructing or validating registrations.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum RegistrationError {
	/// Client id is mandatory.
	#[error("Missing client id.")]
	MissingClientId,
	/// Token endpoint is mandatory.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// Token endpoint must use HTTPS unless it points at a loopback host.
	#[error("The token endpoint must use HTTPS: {url}.")]
	InsecureTokenEndpoint {
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Scopes cannot be empty or contain whitespace.
	#[error("Scope `{scope}` is empty or contains whitespace.")]
	InvalidScope {
		/// Offending scope value.
		scope: String,
	},
}

/// Builder for [`ClientRegistration`] values; also the shape registrations deserialize from.
#[derive(Debug, Deserialize)]
pub struct ClientRegistrationBuilder {
	/// Registration key.
	pub id: RegistrationId,
	/// OAuth 2.0 client identifier.
	#[serde(default)]
	pub client_id: Option<String>,
	/// Optional client secret.
	#[serde(default)]
	pub client_secret: Option<TokenSecret>,
	/// Token endpoint.
	#[serde(default)]
	pub token_endpoint: Option<Url>,
	/// Scopes requested with every token.
	#[serde(default)]
	pub scopes: Vec<String>,
	/// Client authentication method.
	#[serde(default)]
	pub client_auth_method: ClientAuthMethod,
}
impl ClientRegistrationBuilder {
	/// Creates a new builder seeded with the provided key.
	pub fn new(id: RegistrationId) -> Self {
		Self {
			id,
			client_id: None,
			client_secret: None,
			token_endpoint: None,
			scopes: Vec::new(),
			client_auth_method: ClientAuthMethod::default(),
		}
	}

	/// Sets the client id.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(TokenSecret::new(secret));

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Adds a requested scope.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scopes.push(scope.into());

		self
	}

	/// Overrides the client authentication method.
	pub fn client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.client_auth_method = method;

		self
	}

	/// Consumes the builder and validates the resulting registration.
	pub fn build(self) -> Result<ClientRegistration, RegistrationError> {
		let client_id = self
			.client_id
			.filter(|value| !value.trim().is_empty())
			.ok_or(RegistrationError::MissingClientId)?;
		let token_endpoint = self.token_endpoint.ok_or(RegistrationError::MissingTokenEndpoint)?;

		validate_token_endpoint(&token_endpoint)?;

		for scope in &self.scopes {
			if scope.is_empty() || scope.chars().any(char::is_whitespace) {
				return Err(RegistrationError::InvalidScope { scope: scope.clone() });
			}
		}

		Ok(ClientRegistration {
			id: self.id,
			client_id,
			client_secret: self.client_secret,
			token_endpoint,
			scopes: self.scopes,
			client_auth_method: self.client_auth_method,
		})
	}
}
impl TryFrom<ClientRegistrationBuilder> for ClientRegistration {
	type Error = RegistrationError;

	fn try_from(builder: ClientRegistrationBuilder) -> Result<Self, Self::Error> {
		builder.build()
	}
}

fn validate_token_endpoint(url: &Url) -> Result<(), RegistrationError> {
	let loopback = match url.host() {
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
		Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
		None => false,
	};

	if url.scheme() == "https" || (url.scheme() == "http" && loopback) {
		Ok(())
	} else {
		Err(RegistrationError::InsecureTokenEndpoint { url: url.to_string() })
	}
}
