//! Best-effort preloading of raster overlay images.

use std::sync::Arc;

use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use image::ImageFormat;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::transport::{join_url, AsyncHttpClient};

/// A preloaded overlay raster, ready to hand to a map layer.
#[derive(Debug, Clone)]
pub struct OverlayImage {
    pub data: Bytes,
    pub format: ImageFormat,
}

/// Result of one preload attempt.
///
/// Preloading never fails its caller; a failure is just an outcome that
/// has already been logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreloadOutcome {
    /// Fetched and stored by this call.
    Loaded,
    /// Already in the store; no request was made.
    AlreadyLoaded,
    /// Could not be fetched, was not a raster image, or arrived after
    /// teardown.
    Failed(String),
}

impl PreloadOutcome {
    /// True if the overlay is available after this attempt.
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Loaded | Self::AlreadyLoaded)
    }
}

/// Fetches overlay rasters once and keeps them keyed by URL.
pub struct OverlayPreloader<C> {
    client: Arc<C>,
    base_url: String,
    store: DashMap<String, OverlayImage>,
    in_flight: DashMap<String, broadcast::Sender<PreloadOutcome>>,
    liveness: CancellationToken,
}

impl<C: AsyncHttpClient> OverlayPreloader<C> {
    /// Creates a preloader resolving paths beneath `base_url`.
    ///
    /// Preloads that complete after `liveness` is cancelled are discarded.
    pub fn new(client: Arc<C>, base_url: impl Into<String>, liveness: CancellationToken) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            store: DashMap::new(),
            in_flight: DashMap::new(),
            liveness,
        }
    }

    /// Preloads the overlay at `path` (relative to the base URL).
    ///
    /// Concurrent calls for the same URL share one fetch; callers that
    /// joined an in-flight preload see `AlreadyLoaded` on success.
    pub async fn preload(&self, path: &str) -> PreloadOutcome {
        let url = join_url(&self.base_url, path);
        if self.store.contains_key(&url) {
            return PreloadOutcome::AlreadyLoaded;
        }

        let tx = match self.register(&url) {
            Registration::Stored => return PreloadOutcome::AlreadyLoaded,
            Registration::Waiter(mut rx) => {
                debug!(url = %url, "Joining in-flight overlay preload");
                return match rx.recv().await {
                    Ok(PreloadOutcome::Loaded) => PreloadOutcome::AlreadyLoaded,
                    Ok(outcome) => outcome,
                    Err(_) => PreloadOutcome::Failed("preload abandoned".to_string()),
                };
            }
            Registration::Leader(tx) => tx,
        };

        let guard = InFlightGuard {
            in_flight: &self.in_flight,
            url: &url,
        };
        let outcome = self.fetch(&url).await;
        // Store first, then clear the marker, then notify: a caller arriving
        // in between sees the stored image.
        drop(guard);
        let _ = tx.send(outcome.clone());
        outcome
    }

    fn register(&self, url: &str) -> Registration {
        match self.in_flight.entry(url.to_string()) {
            Entry::Occupied(entry) => Registration::Waiter(entry.get().subscribe()),
            // Stored between the first check and taking the entry.
            Entry::Vacant(_) if self.store.contains_key(url) => Registration::Stored,
            Entry::Vacant(entry) => {
                let (tx, _rx) = broadcast::channel(1);
                entry.insert(tx.clone());
                Registration::Leader(tx)
            }
        }
    }

    async fn fetch(&self, url: &str) -> PreloadOutcome {
        let body = match self.client.get(url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to preload overlay image");
                return PreloadOutcome::Failed(e.to_string());
            }
        };

        let format = match image::guess_format(&body) {
            Ok(format) => format,
            Err(e) => {
                warn!(url = %url, error = %e, "Overlay is not a recognizable image");
                return PreloadOutcome::Failed(e.to_string());
            }
        };

        if self.liveness.is_cancelled() {
            debug!(url = %url, "Discarding overlay preloaded after teardown");
            return PreloadOutcome::Failed("session closed".to_string());
        }

        debug!(url = %url, bytes = body.len(), format = ?format, "Overlay preloaded");
        self.store.insert(
            url.to_string(),
            OverlayImage {
                data: Bytes::from(body),
                format,
            },
        );
        PreloadOutcome::Loaded
    }

    /// True if the overlay at `path` has been preloaded.
    pub fn is_preloaded(&self, path: &str) -> bool {
        self.store.contains_key(&join_url(&self.base_url, path))
    }

    /// Returns the preloaded overlay at `path`, if any.
    pub fn get(&self, path: &str) -> Option<OverlayImage> {
        self.store
            .get(&join_url(&self.base_url, path))
            .map(|entry| entry.value().clone())
    }

    /// Number of preloaded overlays.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Drops every preloaded overlay.
    pub fn clear(&self) {
        self.store.clear();
    }
}

enum Registration {
    Stored,
    Leader(broadcast::Sender<PreloadOutcome>),
    Waiter(broadcast::Receiver<PreloadOutcome>),
}

/// Clears the in-flight marker for a URL, also when the preload is dropped.
struct InFlightGuard<'a> {
    in_flight: &'a DashMap<String, broadcast::Sender<PreloadOutcome>>,
    url: &'a str,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.remove(self.url);
    }
}
