//! Transport error types.

use thiserror::Error;

/// Errors that can occur while fetching a remote resource.
///
/// The type is `Clone` because a single failed fetch may be reported to
/// several coalesced waiters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Request could not be sent or no response arrived.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Response body could not be read.
    #[error("Failed to read response body: {0}")]
    Body(String),
}
