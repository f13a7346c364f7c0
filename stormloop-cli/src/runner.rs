//! CLI runner: logging setup and the replay loop.

use std::future::Future;
use std::time::Duration;

use stormloop::config::ReplayConfig;
use stormloop::logging::{init_logging, LoggingGuard};
use stormloop::session::ReplaySession;
use stormloop::transport::AsyncReqwestClient;
use tracing::info;

use crate::error::CliError;
use crate::output::{format_frame, print_status};

/// How often the runner checks whether non-looping playback has stopped.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runner that owns logging for the life of the process.
pub struct CliRunner {
    _logging_guard: LoggingGuard,
}

impl CliRunner {
    /// Initializes logging into `log_dir/log_file`.
    pub fn new(log_dir: &str, log_file: &str) -> Result<Self, CliError> {
        let guard =
            init_logging(log_dir, log_file).map_err(|e| CliError::LoggingInit(e.to_string()))?;
        info!("Stormloop v{}", stormloop::VERSION);
        info!(log = %guard.path().display(), "Logging initialized");
        Ok(Self {
            _logging_guard: guard,
        })
    }

    /// Loads, prefetches and plays one replay until it stops or `shutdown`
    /// resolves.
    pub async fn replay(
        &self,
        config: ReplayConfig,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), CliError> {
        let session = ReplaySession::<AsyncReqwestClient>::connect(config)
            .map_err(CliError::SessionCreation)?;
        tokio::pin!(shutdown);

        let mut status = session.subscribe_status();
        let progress = tokio::spawn(async move {
            while status.changed().await.is_ok() {
                let current = status.borrow_and_update().clone();
                print_status(&current);
                if !current.is_loading() {
                    break;
                }
            }
        });

        let started = tokio::select! {
            started = session.start() => Some(started),
            _ = &mut shutdown => None,
        };
        let Some(started) = started else {
            info!("Interrupted while loading");
            session.shutdown();
            let _ = progress.await;
            return Ok(());
        };
        started?;

        let total = session.descriptors().len();
        let mut frames = session.subscribe_frames();
        if let Some(frame) = frames.borrow_and_update().as_ref() {
            println!("{}", format_frame(frame, total));
        }

        session.scheduler().restart();
        let mut stop_poll = tokio::time::interval(STOP_POLL_INTERVAL);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Interrupted, stopping playback");
                    break;
                }
                changed = frames.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    if let Some(frame) = frames.borrow_and_update().as_ref() {
                        println!("{}", format_frame(frame, total));
                    }
                }
                _ = stop_poll.tick() => {
                    if !session.scheduler().state().is_playing {
                        info!("Playback finished");
                        break;
                    }
                }
            }
        }

        session.cache().log_stats();
        session.shutdown();
        let _ = progress.await;
        Ok(())
    }
}
