//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and exit codes.

use std::fmt;
use std::process;
use stormloop::index::IndexError;
use stormloop::session::SessionError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Invalid command-line options
    Config(String),
    /// Failed to create the replay session
    SessionCreation(SessionError),
    /// The session could not load anything to play
    Replay(SessionError),
}

impl CliError {
    /// Exit the process with an error message and code 1.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Replay(SessionError::Index(IndexError::Unavailable { .. })) => {
                eprintln!();
                eprintln!("Check that:");
                eprintln!("  1. --base-url points at the data server root");
                eprintln!("  2. --index names the index file beneath it");
                eprintln!("  3. The server is reachable from this machine");
            }
            CliError::Replay(SessionError::Index(IndexError::Malformed(_))) => {
                eprintln!();
                eprintln!("The index was fetched but is not a list of snapshots.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::SessionCreation(e) => write!(f, "Failed to create session: {}", e),
            CliError::Replay(e) => write!(f, "Replay failed: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::SessionCreation(e) | CliError::Replay(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SessionError> for CliError {
    fn from(e: SessionError) -> Self {
        CliError::Replay(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_wraps_session_error() {
        let err = CliError::Replay(SessionError::Closed);
        assert_eq!(err.to_string(), "Replay failed: Session closed");
    }

    #[test]
    fn test_config_message() {
        let err = CliError::Config("--max-concurrent must be at least 1".into());
        assert_eq!(
            err.to_string(),
            "Configuration error: --max-concurrent must be at least 1"
        );
    }
}
