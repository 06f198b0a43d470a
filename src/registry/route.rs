//! Route kinds, keys and the default source layout.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Pattern;

/// What a route does with its matched files.
///
/// Declaration order is the build order within a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteKind {
    /// SCSS entry points compiled to CSS.
    Style,
    /// HTML pages with include directives resolved.
    Markup,
    /// Raster and SVG images, compressed.
    Image,
    /// JavaScript, minified in production.
    Script,
    /// Third-party files copied verbatim.
    Vendor,
    /// SCSS sources copied for downstream consumers. Runs last in `build`.
    StyleSource,
}

impl RouteKind {
    /// Every kind, in order.
    pub const ALL: [Self; 6] = [
        Self::Style,
        Self::Markup,
        Self::Image,
        Self::Script,
        Self::Vendor,
        Self::StyleSource,
    ];

    /// Kinds that run as part of a section's chain sequence.
    pub const SECTION_ORDER: [Self; 5] = [
        Self::Style,
        Self::Markup,
        Self::Image,
        Self::Script,
        Self::Vendor,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Style => "style",
            Self::Markup => "markup",
            Self::Image => "image",
            Self::Script => "script",
            Self::Vendor => "vendor",
            Self::StyleSource => "style-source",
        }
    }

    /// Whether file changes re-run this kind's chain.
    pub const fn is_watched(self) -> bool {
        !matches!(self, Self::StyleSource)
    }

    /// Default `(source, dest, aux)` layout relative to the section's
    /// source and output directories.
    fn layout(self) -> (&'static str, &'static str, &'static [&'static str]) {
        match self {
            Self::Style => ("scss/*.scss", "css", &["scss/partials/*.scss"]),
            Self::Markup => ("*.html", "", &["html/*.html"]),
            Self::Image => ("images/**", "images", &[]),
            Self::Script => ("js/*.js", "js", &[]),
            Self::Vendor => ("vendor/**/*", "vendor", &[]),
            Self::StyleSource => ("scss/**/*.scss", "scss", &[]),
        }
    }
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown route kind `{s}`"))
    }
}

/// `(section, kind)`; unique across the registry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteKey {
    pub section: String,
    pub kind: RouteKind,
}

impl RouteKey {
    pub fn new(section: impl Into<String>, kind: RouteKind) -> Self {
        Self {
            section: section.into(),
            kind,
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.section.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}:{}", self.section, self.kind)
        }
    }
}

/// A source glob bound to a destination directory.
#[derive(Debug, Clone)]
pub struct Route {
    pub key: RouteKey,
    pub source: Pattern,
    /// Destination directory, relative to the project root.
    pub dest: PathBuf,
    /// Partials and fragments: changes re-run this route but are not
    /// entry points themselves.
    pub aux: Vec<Pattern>,
    /// Emit fitted thumbnails (image routes only).
    pub thumbnails: bool,
}

impl Route {
    pub fn kind(&self) -> RouteKind {
        self.key.kind
    }

    /// Source files currently matched, sorted.
    pub fn sources(&self, root: &Path) -> Vec<PathBuf> {
        self.source.expand(root)
    }

    /// Output path for an absolute source path, preserving the path
    /// relative to the source glob's base.
    pub fn output_path(&self, root: &Path, source: &Path) -> PathBuf {
        let base = root.join(self.source.base());
        let rel = source
            .strip_prefix(&base)
            .unwrap_or_else(|_| Path::new(source.file_name().unwrap_or_default()));
        root.join(&self.dest).join(rel)
    }

    /// Whether a root-relative path belongs to this route's source or aux globs.
    pub fn is_triggered_by(&self, rel: &Path) -> bool {
        self.source.matches(rel) || self.aux.iter().any(|p| p.matches(rel))
    }
}

/// Default globs for `kind` in `section`: `(source, dest, aux)`.
///
/// The unnamed section drops the `<section>/` segment.
pub(super) fn default_layout(
    source_dir: &str,
    output_dir: &str,
    section: &str,
    kind: RouteKind,
) -> (String, PathBuf, Vec<String>) {
    let (src, dest, aux) = kind.layout();
    let join = |dir: &str, tail: &str| {
        [dir, section, tail]
            .into_iter()
            .filter(|seg| !seg.is_empty())
            .collect::<Vec<_>>()
            .join("/")
    };
    (
        join(source_dir, src),
        PathBuf::from(join(output_dir, dest)),
        aux.iter().map(|a| join(source_dir, a)).collect(),
    )
}
