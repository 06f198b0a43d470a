use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use super::types::ChangeKind;
use crate::utils::path::normalize_path;

/// Quiet window: changes are released once no event arrived for this long.
pub(super) const DEBOUNCE_MS: u64 = 300;

/// Pure debouncer: timing and per-path deduplication only.
pub(super) struct Debouncer {
    pub(super) changes: FxHashMap<PathBuf, ChangeKind>,
    pub(super) last_event: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self {
            changes: FxHashMap::default(),
            last_event: None,
        }
    }

    /// Add a notify event, applying dedup rules:
    /// - Removed, then Created/Modified: restored, keep the new kind
    /// - Modified, then Removed: upgrade to Removed
    /// - Created, then Removed: never existed as far as chains care, drop
    /// - otherwise the first kind wins
    pub(super) fn add_event(&mut self, event: &notify::Event) {
        use notify::EventKind;
        use notify::event::ModifyKind;

        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Remove(_) => ChangeKind::Removed,
            // mtime/chmod noise would re-trigger chains that just wrote files
            EventKind::Modify(ModifyKind::Metadata(_)) => return,
            EventKind::Modify(_) => ChangeKind::Modified,
            _ => return,
        };

        for path in &event.paths {
            if is_temp_file(path) {
                continue;
            }
            let path = normalize_path(path);

            match (self.changes.get(&path).copied(), kind) {
                (None, _) | (Some(ChangeKind::Removed), ChangeKind::Created | ChangeKind::Modified) => {
                    crate::debug!("watch"; "{}: {}", kind.label(), path.display());
                    self.changes.insert(path, kind);
                }
                (Some(ChangeKind::Modified), ChangeKind::Removed) => {
                    self.changes.insert(path, ChangeKind::Removed);
                }
                (Some(ChangeKind::Created), ChangeKind::Removed) => {
                    crate::debug!("watch"; "discard created+removed: {}", path.display());
                    self.changes.remove(&path);
                }
                _ => continue,
            }
            self.last_event = Some(Instant::now());
        }
    }

    /// Take the pending changes once the quiet window has passed.
    pub(super) fn take_if_ready(&mut self) -> Option<FxHashMap<PathBuf, ChangeKind>> {
        if !self.is_ready() {
            return None;
        }
        self.last_event = None;
        let changes = std::mem::take(&mut self.changes);
        (!changes.is_empty()).then_some(changes)
    }

    pub(super) fn is_ready(&self) -> bool {
        self.last_event
            .is_some_and(|t| t.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
    }

    /// Sleep until the quiet window could next close.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return Duration::from_secs(86400);
        };
        Duration::from_millis(DEBOUNCE_MS)
            .saturating_sub(last_event.elapsed())
            .max(Duration::from_millis(1))
    }
}

/// Editor artifacts: backups, swap files, dotfiles.
pub(super) fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
        || name.ends_with("___jb_tmp___")
}
