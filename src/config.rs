//! Client configuration: where the API lives and which registration authorizes it.

// self
use crate::{_prelude::*, auth::RegistrationId, error::ConfigError};

/// Connection settings for a [`BeerClient`](crate::beer::BeerClient).
///
/// Deserialized configs are not validated until [`ClientConfig::validate`] runs;
/// [`BeerClient::new`](crate::beer::BeerClient::new) does so before wiring anything.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
	/// Absolute `http`/`https` URL the API paths are appended to.
	pub base_url: Url,
	/// Registration whose client credentials authorize every request.
	#[serde(default)]
	pub registration_id: RegistrationId,
}
impl ClientConfig {
	/// Creates a validated config using the default registration.
	pub fn new(base_url: Url) -> Result<Self, ConfigError> {
		let config = Self { base_url, registration_id: RegistrationId::default() };

		config.validate()?;

		Ok(config)
	}

	/// Parses `base_url` and delegates to [`ClientConfig::new`].
	pub fn parse(base_url: &str) -> Result<Self, ConfigError> {
		let url = Url::parse(base_url)
			.map_err(|_| ConfigError::InvalidBaseUrl { url: base_url.to_owned() })?;

		Self::new(url)
	}

	/// Selects another registration.
	pub fn with_registration_id(mut self, registration_id: RegistrationId) -> Self {
		self.registration_id = registration_id;

		self
	}

	/// Ensures the base URL is an absolute `http`/`https` URL with a host.
	pub fn validate(&self) -> Result<(), ConfigError> {
		let url = &self.base_url;
		let usable = matches!(url.scheme(), "http" | "https")
			&& url.host_str().is_some_and(|host| !host.is_empty())
			&& !url.cannot_be_a_base();

		if usable { Ok(()) } else { Err(ConfigError::InvalidBaseUrl { url: url.to_string() }) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn deserializes_with_default_registration() {
		let config: ClientConfig =
			serde_json::from_str(r#"{"baseUrl": "http://localhost:8080"}"#)
				.expect("Config should deserialize.");

		assert_eq!(config.registration_id.as_ref(), "springauth");
		assert!(config.validate().is_ok());
	}

	#[test]
	fn custom_registration_is_kept() {
		let config: ClientConfig = serde_json::from_str(
			r#"{"baseUrl": "https://beer.example.com", "registrationId": "inventory"}"#,
		)
		.expect("Config should deserialize.");

		assert_eq!(config.registration_id.as_ref(), "inventory");
	}

	#[test]
	fn rejects_non_http_base_urls() {
		for raw in ["ftp://localhost/", "mailto:brewer@example.com", "not a url"] {
			let err = ClientConfig::parse(raw).expect_err("Non-http base URL must be rejected.");

			assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }), "{raw}");
		}

		assert!(ClientConfig::parse("https://beer.example.com/brewery/").is_ok());
	}
}
