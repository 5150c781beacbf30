//! The Beer resource: wire models and the typed CRUD client.

pub mod client;
pub mod model;
pub mod page;
pub mod query;

pub use client::*;
pub use model::*;
pub use page::*;
pub use query::*;
