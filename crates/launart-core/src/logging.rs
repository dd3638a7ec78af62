//! Optional helper for setting up logging via `env_logger`, with a
//! feature-gated no-op fallback when that feature is disabled.

use crate::error::CoreError;

#[cfg(feature = "env_logger")]
pub fn setup_logging(log_level: &str) -> Result<(), CoreError> {
    use env_logger::{Builder, Env};
    use log::LevelFilter;
    use std::str::FromStr;

    let level = LevelFilter::from_str(log_level).unwrap_or(LevelFilter::Info);

    Builder::from_env(Env::default().default_filter_or(level.to_string()))
        .filter_module("tungstenite", LevelFilter::Info)
        .filter_module("tokio_tungstenite", LevelFilter::Info)
        .filter_module("hyper", LevelFilter::Info)
        .filter_module("h2", LevelFilter::Info)
        .try_init()
        .map_err(|e| CoreError::LoggingSetup(e.to_string()))
}

#[cfg(not(feature = "env_logger"))]
pub fn setup_logging(_log_level: &str) -> Result<(), CoreError> {
    log::debug!("env_logger feature not enabled, logging setup skipped");
    Ok(())
}
