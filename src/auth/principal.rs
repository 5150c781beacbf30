//! The identity a client-credentials token is issued to.

// self
use crate::_prelude::*;

/// Authenticated identity presented when requesting a token.
///
/// With the client-credentials grant there is no end user; the client authenticates as itself,
/// so the principal is named after the registration's client id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientPrincipal {
	name: String,
}
impl ClientPrincipal {
	/// Creates a principal with the provided name.
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into() }
	}

	/// Principal name, equal to the client id for client-credentials registrations.
	pub fn name(&self) -> &str {
		&self.name
	}
}
impl Display for ClientPrincipal {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.name)
	}
}
