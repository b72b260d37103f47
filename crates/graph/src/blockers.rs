use crate::types::{BlockerInfo, DependencyMap};
use planner_catalog::{FeatureKey, StatusSnapshot};
use std::collections::BTreeMap;

/// Evaluate which features are blocked under `snapshot`.
///
/// Returns a new map; the dependency map is only read.
pub fn compute_blockers(
    dependencies: &DependencyMap,
    snapshot: &StatusSnapshot,
) -> BTreeMap<FeatureKey, BlockerInfo> {
    let blockers: BTreeMap<FeatureKey, BlockerInfo> = dependencies
        .iter()
        .map(|(key, info)| {
            let blockers: Vec<FeatureKey> = info
                .dep_keys()
                .filter(|dep| !snapshot.is_implemented(dep))
                .cloned()
                .collect();
            let blocker_info = BlockerInfo {
                is_blocked: !blockers.is_empty(),
                blockers,
            };
            (key.clone(), blocker_info)
        })
        .collect();

    log::debug!(
        "Blockers: {} of {} features blocked",
        blockers.values().filter(|info| info.is_blocked).count(),
        blockers.len()
    );

    blockers
}
