use std::path::PathBuf;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;

/// Keeps the glob base directories attached to the watcher.
///
/// A base that does not exist yet (an empty section) or that was deleted
/// and recreated is attached on the next maintenance pass, which the fs
/// actor runs on a fixed interval and after every quiet window.
pub(super) struct WatchRoots {
    desired: Vec<PathBuf>,
    attached: FxHashSet<PathBuf>,
}

impl WatchRoots {
    pub(super) fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            desired: paths,
            attached: FxHashSet::default(),
        }
    }

    pub(super) fn attach_existing(&mut self, watcher: &mut RecommendedWatcher) -> notify::Result<()> {
        for path in &self.desired {
            if !path.exists() {
                crate::debug!("watch"; "not yet present: {}", path.display());
                continue;
            }
            watcher.watch(path, RecursiveMode::Recursive)?;
            self.attached.insert(path.clone());
        }
        Ok(())
    }

    pub(super) fn maintain(&mut self, watcher: &mut RecommendedWatcher) {
        self.attached.retain(|path| path.exists());

        for path in &self.desired {
            if self.attached.contains(path) || !path.exists() {
                continue;
            }
            if watcher.watch(path, RecursiveMode::Recursive).is_ok() {
                self.attached.insert(path.clone());
                crate::debug!("watch"; "attached: {}", path.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn watcher() -> RecommendedWatcher {
        notify::recommended_watcher(|_: notify::Result<notify::Event>| {}).unwrap()
    }

    #[test]
    fn test_late_base_attached_on_maintain() {
        let dir = TempDir::new().unwrap();
        let present = dir.path().join("src/docs");
        let late = dir.path().join("src/demo");
        fs::create_dir_all(&present).unwrap();

        let mut watcher = watcher();
        let mut roots = WatchRoots::new(vec![present.clone(), late.clone()]);
        roots.attach_existing(&mut watcher).unwrap();
        assert!(roots.attached.contains(&present));
        assert!(!roots.attached.contains(&late));

        fs::create_dir_all(&late).unwrap();
        roots.maintain(&mut watcher);
        assert!(roots.attached.contains(&late));
    }

    #[test]
    fn test_deleted_base_detached() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("src/item");
        fs::create_dir_all(&base).unwrap();

        let mut watcher = watcher();
        let mut roots = WatchRoots::new(vec![base.clone()]);
        roots.attach_existing(&mut watcher).unwrap();
        fs::remove_dir_all(&base).unwrap();
        roots.maintain(&mut watcher);
        assert!(roots.attached.is_empty());
    }
}
