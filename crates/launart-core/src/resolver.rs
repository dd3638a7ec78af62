//! Kahn-style topological leveling of components by declared requirements.
//!
//! Pure and side-effect free: the manager calls this once at prepare-time
//! and once more (with the layer order reversed) at cleanup-time.

use crate::error::CoreError;
use std::collections::HashSet;

/// Partitions `nodes` (id, required-ids) into layers where every id in a
/// layer has its requirements fully satisfied by ids in earlier layers.
/// Layer membership order inside a layer is unspecified (we preserve
/// input order for determinism in tests, but callers must not rely on it).
pub fn resolve_layers(nodes: &[(String, HashSet<String>)]) -> Result<Vec<Vec<String>>, CoreError> {
    let mut remaining: Vec<&(String, HashSet<String>)> = nodes.iter().collect();
    let mut resolved: HashSet<String> = HashSet::new();
    let mut layers = Vec::new();

    while !remaining.is_empty() {
        let (ready, not_ready): (Vec<_>, Vec<_>) = remaining
            .into_iter()
            .partition(|(_, required)| required.is_subset(&resolved));

        if ready.is_empty() {
            let stuck: Vec<String> = not_ready.iter().map(|(id, _)| id.clone()).collect();
            return Err(CoreError::RequirementUnresolvable(format!(
                "cycle or missing dependency among: {}",
                stuck.join(", ")
            )));
        }

        let layer: Vec<String> = ready.iter().map(|(id, _)| id.clone()).collect();
        resolved.extend(layer.iter().cloned());
        layers.push(layer);
        remaining = not_ready;
    }

    Ok(layers)
}
