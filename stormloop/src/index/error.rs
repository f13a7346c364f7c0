//! Error types for index loading.

use thiserror::Error;

use crate::transport::TransportError;

/// Errors that prevent a session from obtaining its snapshot index.
///
/// Both variants are fatal at startup: without an index there is nothing
/// to play.
#[derive(Debug, Clone, Error)]
pub enum IndexError {
    /// The index resource could not be fetched.
    #[error("Snapshot index unavailable at {url}: {source}")]
    Unavailable {
        url: String,
        #[source]
        source: TransportError,
    },

    /// The index was fetched but is not a non-empty array of descriptors.
    #[error("Snapshot index malformed: {0}")]
    Malformed(String),
}
