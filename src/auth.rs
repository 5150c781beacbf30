//! Auth-domain identifiers, the client principal, and token models.

pub mod id;
pub mod principal;
pub mod token;

pub use id::*;
pub use principal::*;
pub use token::{record::*, secret::*};
