use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use super::types::ChangeKind;
use crate::registry::{Registry, RouteKey};

/// Map debounced changes to the routes they trigger.
///
/// Paths are matched root-relative. Removals never trigger a chain; they
/// are only logged. The result is sorted and free of duplicates.
pub(super) fn route_changes(
    changes: FxHashMap<PathBuf, ChangeKind>,
    root: &Path,
    registry: &Registry,
) -> Vec<RouteKey> {
    let mut paths: Vec<_> = changes.into_iter().collect();
    paths.sort_by(|a, b| a.0.cmp(&b.0));

    let mut keys = BTreeSet::new();
    for (path, kind) in paths {
        let Ok(rel) = path.strip_prefix(root) else {
            crate::debug!("watch"; "outside root: {}", path.display());
            continue;
        };
        if kind == ChangeKind::Removed {
            crate::log!("watch"; "removed: {}", rel.display());
            continue;
        }

        let triggered = registry.routes_triggered_by(rel);
        if triggered.is_empty() {
            crate::debug!("watch"; "no route for {}", rel.display());
        }
        keys.extend(triggered);
    }
    keys.into_iter().collect()
}
