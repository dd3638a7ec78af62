//! `Service`: a `Launchable` that additionally exports typed interfaces,
//! and the priority-strategy algorithm that resolves conflicts across
//! services.

use crate::error::InterfaceError;
use crate::launchable::Launchable;
use crate::priority::{Priority, PriorityLevel};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Marker for a concrete type a `Service` can hand back from
/// `get_interface`. Any `'static + Send + Sync` value qualifies - the
/// constraint is load-bearing for `Any::downcast`, not a capability.
pub trait ExportInterface: Any + Send + Sync {}
impl<T: Any + Send + Sync> ExportInterface for T {}

/// A `Launchable` that exports typed interfaces to other components.
pub trait Service: Launchable {
    /// The priority pattern this service claims interface types under.
    fn supported_interface_types(&self) -> Priority;

    /// Resolves `type_id` to a concrete exported interface, type-erased.
    /// Only called for types this service won under the priority
    /// strategy, so returning `None` here is a configuration bug.
    fn get_interface_any(&self, type_id: TypeId) -> Option<Arc<dyn Any + Send + Sync>>;
}

/// Computes, for every interface type any service claims, which service
/// (by index into `services`) wins it.
///
/// Resolution rules:
/// - unclaimed type -> claimed at whatever level this pattern gives it.
/// - claimed again at `Unlocated` (either side) -> `interface-conflict`.
/// - claimed again at a strictly higher `Numeric` priority -> new winner.
/// - claimed again at an equal `Numeric` priority -> `interface-conflict`.
/// - claimed again at a strictly lower `Numeric` priority -> no-op.
pub fn resolve_priority_bindings(
    services: &[Arc<dyn Service>],
) -> Result<HashMap<TypeId, usize>, InterfaceError> {
    let mut winners: HashMap<TypeId, (usize, PriorityLevel, &'static str)> = HashMap::new();

    for (index, service) in services.iter().enumerate() {
        for claim in service.supported_interface_types().claims() {
            match winners.get(&claim.type_id).copied() {
                None => {
                    winners.insert(claim.type_id, (index, claim.level, claim.type_name));
                }
                Some((_, existing_level, name)) => {
                    let conflict = matches!(existing_level, PriorityLevel::Unlocated)
                        || matches!(claim.level, PriorityLevel::Unlocated);
                    if conflict {
                        return Err(InterfaceError::InterfaceConflict(name));
                    }
                    let (PriorityLevel::Numeric(existing_n), PriorityLevel::Numeric(new_n)) =
                        (existing_level, claim.level)
                    else {
                        unreachable!("Unlocated case handled above");
                    };
                    if new_n > existing_n {
                        winners.insert(claim.type_id, (index, claim.level, claim.type_name));
                    } else if new_n == existing_n {
                        return Err(InterfaceError::InterfaceConflict(name));
                    }
                    // new_n < existing_n: existing winner stands.
                }
            }
        }
    }

    Ok(winners.into_iter().map(|(type_id, (index, _, _))| (type_id, index)).collect())
}
