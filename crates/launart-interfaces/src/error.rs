use thiserror::Error;

#[derive(Error, Debug)]
pub enum InterfaceError {
    /// Two services claim the same interface type without a priority
    /// winner (both "unlocated", or a tie at the same numeric priority).
    #[error("interface conflict over `{0}`: both claims are unlocated or tied")]
    InterfaceConflict(&'static str),

    /// `get_interface(T)` asked for a `T` no service supports.
    #[error("no service supports interface `{0}`")]
    UnsupportedInterface(&'static str),
}
