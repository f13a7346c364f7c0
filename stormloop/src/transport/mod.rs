//! Transport abstraction for fetching remote snapshot resources.
//!
//! Every resource this crate consumes (the index, trajectory and report
//! documents, overlay rasters) is a plain HTTP GET beneath one base URL.
//! Components depend on the [`AsyncHttpClient`] trait so tests can inject
//! canned responses instead of touching the network.

mod http;
mod types;

pub use http::{join_url, AsyncHttpClient, AsyncReqwestClient};
pub use types::TransportError;

#[cfg(test)]
pub use http::tests::MockHttpClient;
