//! Tracing subscriber setup for the runner and CLI.
//!
//! The core crate never logs; it returns warnings with its results and the
//! runner turns them into events here.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `screenlab_runner=debug`.
    pub log_level: String,
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            ansi: true,
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self {
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            ansi: std::env::var("NO_COLOR").is_err(),
        }
    }

    /// Raise the level to `debug` unless a filter was given explicitly.
    pub fn verbose(mut self, verbose: bool) -> Self {
        if verbose && std::env::var("RUST_LOG").is_err() {
            self.log_level = "debug".to_string();
        }
        self
    }
}

/// Install the global subscriber, writing to stderr so stdout stays clean
/// for command output. Fails if a subscriber is already installed.
pub fn init_logging(config: LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| anyhow::anyhow!("invalid log filter '{}': {e}", config.log_level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(config.ansi)
                .with_writer(std::io::stderr),
        )
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_level_is_info() {
        let config = LoggingConfig::default();
        assert_eq!(config.log_level, "info");
        assert!(config.ansi);
    }
}
