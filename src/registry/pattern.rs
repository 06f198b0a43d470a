//! Compiled source globs.

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use jwalk::WalkDir;

const GLOB_CHARS: &[char] = &['*', '?', '[', '{'];

/// A root-relative glob with its non-glob base directory.
///
/// `*` never crosses `/`; `**` does.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    base: PathBuf,
    matcher: GlobMatcher,
}

impl Pattern {
    pub fn new(raw: &str) -> Result<Self, globset::Error> {
        let raw = raw.trim_start_matches("./").to_string();
        let matcher = GlobBuilder::new(&raw)
            .literal_separator(true)
            .build()?
            .compile_matcher();
        let base = glob_base(&raw);
        Ok(Self { raw, base, matcher })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Longest directory prefix without glob syntax, relative to the root.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Whether a root-relative path matches.
    pub fn matches(&self, rel: &Path) -> bool {
        self.matcher.is_match(rel)
    }

    /// Files under `root` matching this pattern, sorted by path.
    ///
    /// A pattern matching nothing yields an empty list.
    pub fn expand(&self, root: &Path) -> Vec<PathBuf> {
        let base = root.join(&self.base);
        if !base.is_dir() {
            return Vec::new();
        }

        WalkDir::new(&base)
            .sort(true)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path())
            .filter(|path| {
                path.strip_prefix(root)
                    .is_ok_and(|rel| self.matcher.is_match(rel))
            })
            .collect()
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// `src/item/scss/*.scss` -> `src/item/scss`; `src/item/js/app.js` -> `src/item/js`.
fn glob_base(raw: &str) -> PathBuf {
    let segments: Vec<&str> = raw.split('/').collect();
    let literal = segments
        .iter()
        .take_while(|seg| !seg.contains(GLOB_CHARS))
        .count();

    // A fully literal pattern names a file; its base is the parent.
    let take = if literal == segments.len() {
        literal.saturating_sub(1)
    } else {
        literal
    };
    segments[..take].iter().collect()
}
