//! Data source configuration.

use super::defaults::{DEFAULT_INDEX_PATH, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::transport::join_url;

/// Where snapshot data is fetched from.
///
/// All paths found in the index (trajectory, report and overlay files) are
/// resolved beneath the same base URL as the index itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    base_url: String,
    index_path: String,
    request_timeout_secs: u64,
}

impl SourceConfig {
    /// Create a source configuration rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            index_path: DEFAULT_INDEX_PATH.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Set the index resource path relative to the base URL.
    /// Default: `api_data.json`.
    pub fn with_index_path(mut self, path: impl Into<String>) -> Self {
        self.index_path = path.into();
        self
    }

    /// Set the per-request timeout in seconds, at least 1. Default: 30 seconds.
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs.max(1);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn index_path(&self) -> &str {
        &self.index_path
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
    }

    /// Absolute URL of the index resource.
    pub fn index_url(&self) -> String {
        self.resolve(&self.index_path)
    }

    /// Absolute URL of a resource referenced from the index.
    pub fn resolve(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SourceConfig::new("https://h/api");
        assert_eq!(config.index_path(), DEFAULT_INDEX_PATH);
        assert_eq!(config.request_timeout_secs(), DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.index_url(), "https://h/api/api_data.json");
    }

    #[test]
    fn test_zero_timeout_is_raised_to_one() {
        let config = SourceConfig::new("https://h/api").with_request_timeout_secs(0);
        assert_eq!(config.request_timeout_secs(), 1);

        let config = SourceConfig::new("https://h/api").with_request_timeout_secs(5);
        assert_eq!(config.request_timeout_secs(), 5);
    }

    #[test]
    fn test_resolve_relative_path() {
        let config = SourceConfig::new("https://h/api/").with_index_path("idx/all.json");
        assert_eq!(config.index_url(), "https://h/api/idx/all.json");
        assert_eq!(
            config.resolve("trajectories/a.json"),
            "https://h/api/trajectories/a.json"
        );
    }
}
