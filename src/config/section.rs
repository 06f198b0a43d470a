//! `preset` and `[[sections]]` configuration.
//!
//! A section is a named group of routes under `src/<name>/`. When no
//! `[[sections]]` table is given, the preset decides which sections exist.
//!
//! # Example
//!
//! ```toml
//! preset = "sections"
//!
//! [[sections]]
//! name = "docs"
//! kinds = ["style", "markup", "image", "script"]
//! thumbnails = true
//!
//! [sections.patterns]
//! script = "src/docs/js/**/*.js"
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ConfigDiagnostics;
use crate::core::Mode;
use crate::registry::RouteKind;

/// Built-in section layouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// `docs`, `item` and `demo` sections.
    #[default]
    Sections,
    /// One unnamed section rooted directly at `src/`.
    Single,
}

impl Preset {
    pub fn sections(self) -> Vec<SectionConfig> {
        use RouteKind::*;
        match self {
            Self::Sections => vec![
                SectionConfig::new("docs", &[Style, Markup, Image, Script], true),
                SectionConfig::new(
                    "item",
                    &[Style, Markup, Image, Script, Vendor, StyleSource],
                    false,
                ),
                SectionConfig::new("demo", &[Style, Markup, Image, Script], true),
            ],
            Self::Single => vec![SectionConfig::new(
                "",
                &[Style, Markup, Image, Script, Vendor],
                true,
            )],
        }
    }

    /// Public manifest used when `[public] files` is not set.
    ///
    /// Development builds write no `.min` artifacts, so those entries are
    /// left out in that mode.
    pub fn public_files(self, mode: Mode) -> Vec<String> {
        match self {
            Self::Sections => [
                "item/css/*.css",
                "demo/css/*.css",
                "item/*.html",
                "demo/*.html",
                "item/js/item.js",
                "item/js/item.min.js",
                "demo/js/demo.js",
                "demo/js/demo.min.js",
            ]
            .into_iter()
            .filter(|entry| !mode.is_dev() || !entry.contains(".min."))
            .map(String::from)
            .collect(),
            Self::Single => Vec::new(),
        }
    }

    pub const fn start_path(self) -> &'static str {
        match self {
            Self::Sections => "/item/index.html",
            Self::Single => "/index.html",
        }
    }
}

/// One `[[sections]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SectionConfig {
    /// Section name; empty for the unnamed section.
    pub name: String,

    /// Route kinds, in build order.
    pub kinds: Vec<RouteKind>,

    /// Produce fitted thumbnails for raster images.
    pub thumbnails: bool,

    /// Per-kind source glob overrides, keyed by kind name.
    pub patterns: BTreeMap<String, String>,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            kinds: RouteKind::SECTION_ORDER.to_vec(),
            thumbnails: false,
            patterns: BTreeMap::new(),
        }
    }
}

impl SectionConfig {
    fn new(name: &str, kinds: &[RouteKind], thumbnails: bool) -> Self {
        Self {
            name: name.to_string(),
            kinds: kinds.to_vec(),
            thumbnails,
            patterns: BTreeMap::new(),
        }
    }

    pub fn validate(&self, index: usize, diag: &mut ConfigDiagnostics) {
        let field = format!("sections[{index}]");
        if self.name.contains(['/', '\\']) || self.name == "." || self.name == ".." {
            diag.error(
                format!("{field}.name"),
                format!("`{}` is not a valid directory name", self.name),
            );
        }
        if self.kinds.is_empty() {
            diag.error_with_hint(
                format!("{field}.kinds"),
                "section declares no route kinds",
                "remove the section or list at least one kind",
            );
        }
        for key in self.patterns.keys() {
            match key.parse::<RouteKind>() {
                Ok(kind) if !self.kinds.contains(&kind) => diag.error(
                    format!("{field}.patterns.{key}"),
                    format!("override for `{key}` but the section has no such route"),
                ),
                Ok(_) => {}
                Err(_) => diag.error(
                    format!("{field}.patterns.{key}"),
                    format!("unknown route kind `{key}`"),
                ),
            }
        }
    }
}
