//! Stormloop - time-lapse replay of tropical cyclone tracks
//!
//! This library loads a remote index of timestamped cyclone snapshots,
//! prefetches every snapshot's trajectories, bulletin and satellite
//! overlays, and plays them back frame by frame.
//!
//! # High-Level API
//!
//! The [`session`] module ties everything together:
//!
//! ```ignore
//! use stormloop::config::{ReplayConfig, SourceConfig};
//! use stormloop::session::ReplaySession;
//!
//! let config = ReplayConfig::new(SourceConfig::new("https://example.org/meteo-france-api"));
//! let session = ReplaySession::connect(config)?;
//!
//! session.start().await?;
//! session.scheduler().restart();
//! ```
//!
//! The lower-level pieces ([`index::MetadataIndex`], [`cache::SnapshotCache`],
//! [`prefetch::Prefetcher`], [`playback::PlaybackScheduler`]) are usable on
//! their own.

pub mod cache;
pub mod config;
pub mod index;
pub mod loader;
pub mod logging;
pub mod model;
pub mod playback;
pub mod prefetch;
pub mod session;
pub mod transport;

/// Version of the Stormloop library and CLI.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
