mod connection;
mod launchable;
mod manager;

pub use connection::{ConnectionSnapshot, ConnectionStatus};
pub use launchable::{LaunchableSnapshot, LaunchableStatus, Stage};
pub use manager::{ManagerSnapshot, ManagerStatus, ManagerStage};
