//! `ManagerError`: the root crate's own error kinds, plus `#[from]`
//! conversions wrapping the three library crates' errors into one
//! enum per orchestrator.

use launart_core::CoreError;
use launart_interfaces::InterfaceError;
use launart_transport::TransportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManagerError {
    /// Two launchables were added under the same `id`.
    #[error("launchable id `{0}` is already registered")]
    DuplicateId(String),

    /// `launch()` called while `status.stage() != Unset`.
    #[error("manager.launch() called while already running")]
    AlreadyRunning,

    /// A second interrupt arrived while cleanup was already underway;
    /// resolved in favor of force-abort (see DESIGN.md).
    #[error("a second interrupt force-aborted the cleanup wave")]
    ForceAborted,

    /// The spawned `launch()` task itself panicked or was aborted.
    #[error("the manager task failed: {0}")]
    TaskFailed(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Interface(#[from] InterfaceError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
