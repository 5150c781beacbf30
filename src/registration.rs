//! Client registrations: the identity and token endpoint used for the client-credentials grant.
//!
//! Registrations are looked up by a stable [`RegistrationId`] (the default key is
//! `springauth`). The pipeline resolves its key once when it is constructed, so a missing
//! registration is a wiring error rather than a per-request failure.

pub mod builder;

pub use builder::*;

pub use crate::auth::RegistrationId;

// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// How the client authenticates itself against the token endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	#[default]
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
}

/// Validated client-credentials registration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "ClientRegistrationBuilder")]
pub struct ClientRegistration {
	/// Registration key.
	pub id: RegistrationId,
	/// OAuth 2.0 client identifier; also names the client principal.
	pub client_id: String,
	/// Client secret for confidential authentication methods.
	pub client_secret: Option<TokenSecret>,
	/// Token endpoint used for the client-credentials grant.
	pub token_endpoint: Url,
	/// Scopes requested with every token.
	pub scopes: Vec<String>,
	/// Client authentication method used at the token endpoint.
	pub client_auth_method: ClientAuthMethod,
}
impl ClientRegistration {
	/// Creates a new builder for the provided registration key.
	pub fn builder(id: RegistrationId) -> ClientRegistrationBuilder {
		ClientRegistrationBuilder::new(id)
	}
}

/// In-memory registry of client registrations keyed by [`RegistrationId`].
#[derive(Clone, Debug, Default)]
pub struct RegistrationRepository(HashMap<RegistrationId, ClientRegistration>);
impl RegistrationRepository {
	/// Adds or replaces a registration, returning the previous one under the same key.
	pub fn insert(&mut self, registration: ClientRegistration) -> Option<ClientRegistration> {
		self.0.insert(registration.id.clone(), registration)
	}

	/// Looks up a registration by key.
	pub fn find(&self, id: &str) -> Option<&ClientRegistration> {
		self.0.get(id)
	}

	/// Looks up a registration and fails with [`ConfigError::UnknownRegistration`] when absent.
	pub fn require(&self, id: &str) -> Result<&ClientRegistration, ConfigError> {
		self.find(id)
			.ok_or_else(|| ConfigError::UnknownRegistration { registration: id.to_owned() })
	}

	/// Number of configured registrations.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when no registration is configured.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl FromIterator<ClientRegistration> for RegistrationRepository {
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = ClientRegistration>,
	{
		let mut repository = Self::default();

		for registration in iter {
			repository.insert(registration);
		}

		repository
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn registration(id: &str) -> ClientRegistration {
		ClientRegistration::builder(RegistrationId::new(id).expect("Key fixture should be valid."))
			.client_id("messaging-client")
			.client_secret("secret")
			.token_endpoint(
				Url::parse("https://auth.example.com/oauth2/token")
					.expect("Token endpoint fixture should parse."),
			)
			.build()
			.expect("Registration fixture should build.")
	}

	#[test]
	fn require_reports_unknown_keys() {
		let repository = RegistrationRepository::from_iter([registration("springauth")]);

		assert_eq!(repository.len(), 1);
		assert_eq!(
			repository.require("springauth").expect("Known key should resolve.").client_id,
			"messaging-client"
		);

		let err = repository.require("other").expect_err("Unknown key must fail.");

		assert!(
			matches!(err, ConfigError::UnknownRegistration { ref registration } if registration == "other")
		);
	}

	#[test]
	fn insert_replaces_same_key() {
		let mut repository = RegistrationRepository::default();

		assert!(repository.is_empty());
		assert!(repository.insert(registration("springauth")).is_none());
		assert!(repository.insert(registration("springauth")).is_some());
		assert_eq!(repository.len(), 1);
	}

	#[test]
	fn deserializes_through_validation() {
		let registration: ClientRegistration = serde_json::from_str(
			r#"{
				"id": "springauth",
				"client_id": "messaging-client",
				"client_secret": "secret",
				"token_endpoint": "https://auth.example.com/oauth2/token",
				"scopes": ["message.read", "message.write"],
				"client_auth_method": "client_secret_post"
			}"#,
		)
		.expect("Registration JSON should deserialize.");

		assert_eq!(registration.client_auth_method, ClientAuthMethod::ClientSecretPost);
		assert_eq!(registration.scopes.len(), 2);
		assert!(
			serde_json::from_str::<ClientRegistration>(
				r#"{"id": "springauth", "client_id": "c", "token_endpoint": "http://auth.example.com/token"}"#,
			)
			.is_err()
		);
	}

	#[test]
	fn debug_redacts_client_secret() {
		assert!(!format!("{:?}", registration("springauth")).contains("\"secret\""));
	}
}
