//! Resource Access Layer: HTTP transport, the `{success, result|message}`
//! envelope, and per-resource transport functions.

pub mod client;
pub mod envelope;
pub mod resource;
pub mod resources;
#[cfg(test)]
pub(crate) mod testing;
pub mod transport;

pub use client::ApiClient;
pub use envelope::{Envelope, Listing};
pub use resource::{Resource, ResourceApi};
pub use resources::*;
pub use transport::{ApiRequest, HttpTransport, Transport};
