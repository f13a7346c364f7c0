//! Stormloop CLI - headless replay of cyclone snapshots
//!
//! Loads a snapshot index, prefetches every snapshot with a progress line,
//! then prints one line per frame as playback advances.

mod error;
mod output;
mod runner;

use clap::Parser;
use stormloop::config::{
    defaults::{DEFAULT_INDEX_PATH, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SPEED_MS},
    PlaybackConfig, PrefetchConfig, ReplayConfig, SourceConfig,
};
use stormloop::logging::{DEFAULT_LOG_DIR, DEFAULT_LOG_FILE};

use error::CliError;
use runner::CliRunner;

#[derive(Debug, Parser)]
#[command(name = "stormloop", version = stormloop::VERSION)]
#[command(about = "Replay tropical cyclone snapshots frame by frame", long_about = None)]
struct Args {
    /// Root URL every index path is resolved against
    #[arg(long)]
    base_url: String,

    /// Index file path beneath the base URL
    #[arg(long, default_value = DEFAULT_INDEX_PATH)]
    index: String,

    /// Milliseconds between frames (clamped to 100-3000)
    #[arg(long, default_value_t = DEFAULT_SPEED_MS)]
    speed_ms: u64,

    /// Stop at the last frame instead of wrapping to the first
    #[arg(long)]
    no_loop: bool,

    /// Maximum snapshots fetched at once (unbounded if omitted)
    #[arg(long)]
    max_concurrent: Option<usize>,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Directory for the log file
    #[arg(long, default_value = DEFAULT_LOG_DIR)]
    log_dir: String,

    /// Log file name
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    log_file: String,
}

impl Args {
    fn to_config(&self) -> Result<ReplayConfig, CliError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(CliError::Config(format!(
                "--base-url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(CliError::Config(
                "--timeout-secs must be at least 1".to_string(),
            ));
        }

        let source = SourceConfig::new(&self.base_url)
            .with_index_path(&self.index)
            .with_request_timeout_secs(self.timeout_secs);
        let playback = PlaybackConfig::new()
            .with_initial_speed_ms(self.speed_ms)
            .with_looping(!self.no_loop);
        let prefetch = match self.max_concurrent {
            Some(0) => {
                return Err(CliError::Config(
                    "--max-concurrent must be at least 1".to_string(),
                ))
            }
            Some(limit) => PrefetchConfig::new().with_max_concurrent(limit),
            None => PrefetchConfig::new(),
        };

        Ok(ReplayConfig::new(source)
            .with_playback(playback)
            .with_prefetch(prefetch))
    }
}

async fn run(args: Args) -> Result<(), CliError> {
    let config = args.to_config()?;
    let runner = CliRunner::new(&args.log_dir, &args.log_file)?;
    runner
        .replay(config, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    if let Err(e) = run(args).await {
        e.exit();
    }
}
