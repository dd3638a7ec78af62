//! The `Launchable` component contract.

use async_trait::async_trait;
use launart_core::LaunchableStatus;
use std::collections::HashSet;
use std::error::Error as StdError;

/// One phase a `Launchable` participates in. Purely informational: the
/// manager uses it to tell a component that declared `Prepare` but never
/// called `set_prepare`/`set_blocking` apart from one that never meant to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LaunchStage {
    Prepare,
    Blocking,
    Cleanup,
}

pub type LaunchError = Box<dyn StdError + Send + Sync + 'static>;

/// A capability handle the manager exposes to a `Launchable`'s launch body.
/// Kept separate from the concrete `Launart` type (which lives in the root
/// crate) so `launart-interfaces` never depends back on it.
#[async_trait]
pub trait ManagerHandle: Send + Sync {
    /// Resolve an interface type by its `TypeId`. Returns the resolved
    /// service's exported interface, type-erased; see
    /// [`ManagerHandleExt::get_interface`] for the typed convenience.
    fn get_interface_any(
        &self,
        type_id: std::any::TypeId,
    ) -> Option<std::sync::Arc<dyn std::any::Any + Send + Sync>>;

    /// Resolves once the manager itself has left `blocking` and moved into
    /// cleanup. This is the only way a component's own launch body can
    /// learn that it's time to stop blocking and start its own cleanup
    /// sequence - nothing else ever sets a component's status for it.
    async fn wait_for_cleanup(&self);
}

/// Typed convenience layered over the object-safe [`ManagerHandle`], the
/// way `get_interface(T)` reads naturally. Kept out of the trait
/// itself so `ManagerHandle` stays object-safe (a generic method on a
/// `dyn`-used trait is not).
pub trait ManagerHandleExt: ManagerHandle {
    fn get_interface<T: crate::ExportInterface + 'static>(
        &self,
    ) -> Result<std::sync::Arc<T>, crate::InterfaceError> {
        self.get_interface_any(std::any::TypeId::of::<T>())
            .and_then(|any| any.downcast::<T>().ok())
            .ok_or(crate::InterfaceError::UnsupportedInterface(std::any::type_name::<T>()))
    }
}
impl<M: ManagerHandle + ?Sized> ManagerHandleExt for M {}

/// A long-lived, cooperatively-scheduled component. Identified by a stable
/// `id` unique within its manager; declares the ids it requires to have
/// *prepared* before it runs its own logical work, and the subset of
/// {prepare, blocking, cleanup} it participates in.
///
/// Contract: if `declared_stages()` contains `Prepare`, the
/// launch body must call `status().set_prepare()` then
/// `status().set_blocking()` before entering its long-running loop. If it
/// contains `Cleanup`, the body must await `manager.wait_for_cleanup()` to
/// know when to stop blocking, then call `status().set_cleanup()` and
/// `status().set_finished()` before returning. Components declaring
/// neither stage simply run to completion.
#[async_trait]
pub trait Launchable: Send + Sync {
    fn id(&self) -> &str;

    /// Ids of other Launchables this one requires to have prepared first.
    fn required(&self) -> &HashSet<String>;

    fn declared_stages(&self) -> &HashSet<LaunchStage>;

    fn status(&self) -> &LaunchableStatus;

    /// The launch body. Runs as an independent cooperative task for the
    /// whole lifetime of the component.
    async fn launch(&self, manager: &dyn ManagerHandle) -> Result<(), LaunchError>;

    /// Called once the subset of `required` ids that declare `Prepare`
    /// have all reached `blocking`, with that subset.
    async fn on_require_prepared(&self, _ids: &HashSet<String>) {}

    /// Called during cleanup once the subset of this component's
    /// *dependents* (other components that named this one in their own
    /// `required()`) that declare `Cleanup` have all reached `finished`,
    /// with that subset. The reverse-order counterpart of
    /// `on_require_prepared`: cleanup runs downstream-first, so a
    /// component hears about the ones that depended on it exiting, not
    /// about its own upstream requirements.
    async fn on_require_exited(&self, _ids: &HashSet<String>) {}
}
