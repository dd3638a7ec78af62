use thiserror::Error;

/// Errors raised by the primitives in `launart-core`: observable status,
/// requirement resolution, configuration and logging setup.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("config loading failed: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("logging setup failed: {0}")]
    LoggingSetup(String),

    /// Illegal lifecycle transition on a `LaunchableStatus`/`ManagerStatus`
    /// (e.g. `blocking -> prepare`, or re-entering an already-passed stage).
    #[error("stage violation: cannot move {0} from {1} to {2}")]
    StageViolation(&'static str, &'static str, &'static str),

    /// Dependency graph has a cycle, or a `required` id refers to nothing.
    #[error("requirement graph is unresolvable: {0}")]
    RequirementUnresolvable(String),

    /// A typed `Statv` snapshot makes foreign-stat updates a compile error,
    /// so this variant is unreachable from safe code; kept for API parity.
    /// See DESIGN.md.
    #[error("stat does not belong to this record: {0}")]
    InvalidStatOwnership(&'static str),

    /// Kept for the same reason: a `Statv` snapshot always has every field
    /// populated by construction.
    #[error("missing required stat: {0}")]
    MissingRequiredStat(&'static str),
}
