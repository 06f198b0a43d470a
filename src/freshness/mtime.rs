//! Mtime-based freshness detection for chain outputs.

use std::path::Path;
use std::time::SystemTime;

/// Get the modification time of a file
///
/// Returns `None` if the file doesn't exist or mtime cannot be read
pub fn get_mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

/// Check if `output` is at least as new as `source`.
///
/// Returns `true` if both exist and the output was modified no earlier than
/// the source, meaning processing can be skipped. Any missing file or
/// unreadable timestamp counts as stale.
pub fn is_output_fresh(output: &Path, source: &Path) -> bool {
    let (Some(output_time), Some(source_time)) = (get_mtime(output), get_mtime(source)) else {
        return false;
    };
    output_time >= source_time
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_missing_output_is_stale() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.png");
        fs::write(&source, b"x").unwrap();
        assert!(!is_output_fresh(&dir.path().join("out.png"), &source));
    }

    #[test]
    fn test_output_written_after_source_is_fresh() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.png");
        let output = dir.path().join("out.png");
        fs::write(&source, b"x").unwrap();
        fs::write(&output, b"y").unwrap();
        assert!(is_output_fresh(&output, &source));
    }

    #[test]
    fn test_touched_source_is_stale() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.png");
        let output = dir.path().join("out.png");
        fs::write(&output, b"y").unwrap();
        fs::write(&source, b"x").unwrap();

        let later = SystemTime::now() + Duration::from_secs(60);
        fs::File::options()
            .write(true)
            .open(&source)
            .unwrap()
            .set_modified(later)
            .unwrap();
        assert!(!is_output_fresh(&output, &source));
    }
}
