//! # launart-core
//!
//! The observable-status primitive (`Statv`) and its specializations
//! (`ConnectionStatus`, `LaunchableStatus`, `ManagerStatus`), the pure
//! requirement resolver the manager stages components with, and the
//! crate-wide ambient stack (config loading, logging setup, the shared
//! error taxonomy).

pub mod config;
pub mod error;
pub mod logging;
pub mod resolver;
pub mod statv;
pub mod status;

pub use config::{load_config, Config};
pub use error::CoreError;
pub use resolver::resolve_layers;
pub use statv::{StatSnapshot, Statv};
pub use status::{
    ConnectionSnapshot, ConnectionStatus, LaunchableSnapshot, LaunchableStatus, ManagerSnapshot,
    ManagerStage, ManagerStatus, Stage,
};
