//! Strongly typed registration key used to look up client identities.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("Registration identifier cannot be empty.")]
	Empty,
	/// The identifier contains whitespace characters.
	#[error("Registration identifier contains whitespace.")]
	ContainsWhitespace,
	/// The identifier exceeded the allowed character count.
	#[error("Registration identifier exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Stable key naming a client registration (for example `springauth`).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegistrationId(String);
impl RegistrationId {
	/// Key used when no registration is named explicitly.
	pub const DEFAULT: &'static str = "springauth";

	/// Creates a new identifier after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Default for RegistrationId {
	fn default() -> Self {
		Self(Self::DEFAULT.to_owned())
	}
}
impl Deref for RegistrationId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for RegistrationId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for RegistrationId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<RegistrationId> for String {
	fn from(value: RegistrationId) -> Self {
		value.0
	}
}
impl TryFrom<String> for RegistrationId {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl FromStr for RegistrationId {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for RegistrationId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Registration({})", self.0)
	}
}
impl Display for RegistrationId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

fn validate_view(view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace);
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}
