//! Snapshot index loading.
//!
//! The index is a single JSON array listing every snapshot of the event
//! being replayed. It is fetched once at session start; everything else
//! (prefetch, playback bounds) is derived from the descriptors it yields.

mod error;
mod parse;

pub use error::IndexError;
pub use parse::parse_index;

use std::sync::Arc;
use tracing::{debug, info};

use crate::model::SnapshotDescriptor;
use crate::transport::AsyncHttpClient;

/// Loads the ordered list of snapshot descriptors from the index resource.
pub struct MetadataIndex<C> {
    client: Arc<C>,
    url: String,
}

impl<C: AsyncHttpClient> MetadataIndex<C> {
    /// Creates an index loader for the resource at `url`.
    pub fn new(client: Arc<C>, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches and parses the index.
    ///
    /// Returns the descriptors sorted ascending by timestamp (stable for
    /// equal timestamps).
    ///
    /// # Errors
    ///
    /// - [`IndexError::Unavailable`] if the fetch fails
    /// - [`IndexError::Malformed`] if the body is not a non-empty array of
    ///   well-formed descriptors
    pub async fn load(&self) -> Result<Vec<SnapshotDescriptor>, IndexError> {
        debug!(url = %self.url, "Fetching snapshot index");

        let body = self
            .client
            .get(&self.url)
            .await
            .map_err(|source| IndexError::Unavailable {
                url: self.url.clone(),
                source,
            })?;

        let descriptors = parse_index(&body)?;

        info!(
            url = %self.url,
            snapshots = descriptors.len(),
            first = descriptors.first().map(|d| d.timestamp),
            last = descriptors.last().map(|d| d.timestamp),
            "Snapshot index loaded"
        );

        Ok(descriptors)
    }
}
