//! # launart-interfaces
//!
//! The component contract (`Launchable`), its service specialization
//! (`Service`/`ExportInterface`), and the priority-pattern builder used to
//! resolve interface-type conflicts across services.

pub mod error;
pub mod launchable;
pub mod priority;
pub mod service;

pub use error::InterfaceError;
pub use launchable::{LaunchError, LaunchStage, Launchable, ManagerHandle, ManagerHandleExt};
pub use priority::{Claim, Priority, PriorityLevel};
pub use service::{resolve_priority_bindings, ExportInterface, Service};
