//! Runtime configuration, layered: struct defaults, then an optional
//! `launart.toml` (or `.yaml`/`.json`), then `LAUNART_`-prefixed
//! environment variables.

use crate::error::CoreError;
use config::{Config as ConfigLoader, Environment, File};
use serde::Deserialize;
use std::time::Duration;

mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub global: GlobalConfig,
    pub transport: TransportConfig,
    pub manager: ManagerConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GlobalConfig {
    pub log_level: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TransportConfig {
    #[serde(with = "duration_ms_serde")]
    pub connect_timeout: Duration,
    #[serde(with = "duration_ms_serde")]
    pub request_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(20),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Tuning knobs for the manager's launch/cleanup waves.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ManagerConfig {
    /// Convention: concrete adapters bound an ASGI-style server's
    /// shutdown to a 5-second timer. Not enforced by the core itself
    /// (there are no built-in timeouts), but exposed here so embedders
    /// can wire it into their own cleanup bodies.
    #[serde(with = "duration_ms_serde")]
    pub cleanup_grace_period: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            cleanup_grace_period: Duration::from_secs(5),
        }
    }
}

/// Loads configuration from `launart.{toml,yaml,json,...}` in the current
/// directory (if present) and `LAUNART_`-prefixed environment variables
/// (double underscore `__` separates nested fields, e.g.
/// `LAUNART_GLOBAL__LOG_LEVEL=debug`).
pub fn load_config() -> Result<Config, CoreError> {
    let builder = ConfigLoader::builder()
        .set_default("global.log_level", "info")?
        .set_default("transport.connect_timeout_ms", 20_000u64)?
        .set_default("transport.request_timeout_ms", 30_000u64)?
        .set_default("manager.cleanup_grace_period_ms", 5_000u64)?
        .add_source(File::with_name("launart").required(false))
        .add_source(
            Environment::with_prefix("LAUNART")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    builder.try_deserialize().map_err(CoreError::ConfigLoad)
}
