//! Manifest validation against the public tree.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use super::PublicError;
use crate::registry::Pattern;

/// Resolve manifest entries to files under `public`, in manifest order.
///
/// Literal entries must exist; glob entries must match at least one file.
/// A file listed twice is kept at its first position.
pub fn resolve_manifest(public: &Path, entries: &[String]) -> Result<Vec<PathBuf>, PublicError> {
    let mut seen = FxHashSet::default();
    let mut files = Vec::new();

    for entry in entries {
        let matched = if is_glob(entry) {
            let pattern = Pattern::new(entry).map_err(|source| PublicError::Pattern {
                pattern: entry.clone(),
                source,
            })?;
            let matched = pattern.expand(public);
            if matched.is_empty() {
                return Err(PublicError::EmptyGlob(entry.clone()));
            }
            matched
        } else {
            let path = public.join(entry);
            if !path.is_file() {
                return Err(PublicError::MissingEntry(entry.clone()));
            }
            vec![path]
        };

        for path in matched {
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }
    Ok(files)
}

fn is_glob(entry: &str) -> bool {
    entry.contains(['*', '?', '[', '{'])
}
