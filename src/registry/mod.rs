//! Section registry: section name to ordered routes.
//!
//! Built once from [`PipelineConfig`] at startup. Every glob is compiled
//! here, so malformed patterns fail before any chain runs.

mod pattern;
mod route;

pub use pattern::Pattern;
pub use route::{Route, RouteKey, RouteKind};

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use crate::config::{ConfigError, PipelineConfig};
use crate::utils::path::to_slash;

/// A named group of routes in build order.
#[derive(Debug, Clone)]
pub struct Section {
    pub name: String,
    routes: Vec<Route>,
}

impl Section {
    /// Chain routes in build order (style, markup, image, script, vendor).
    pub fn chain_routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter().filter(|r| r.kind().is_watched())
    }

    pub fn style_source(&self) -> Option<&Route> {
        self.routes
            .iter()
            .find(|r| r.kind() == RouteKind::StyleSource)
    }
}

#[derive(Debug, Clone)]
pub struct Registry {
    sections: Vec<Section>,
}

impl Registry {
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ConfigError> {
        let source_dir = to_slash(&config.source);
        let output_dir = to_slash(&config.output);

        let mut seen = FxHashSet::default();
        let mut sections = Vec::new();

        for (index, section) in config.effective_sections().into_iter().enumerate() {
            let field = format!("sections[{index}]");

            for key in section.patterns.keys() {
                if key.parse::<RouteKind>().is_err() {
                    return Err(ConfigError::UnknownKind {
                        field: format!("{field}.patterns"),
                        kind: key.clone(),
                    });
                }
            }

            let mut routes = Vec::with_capacity(section.kinds.len());
            for &kind in &section.kinds {
                let key = RouteKey::new(section.name.clone(), kind);
                if !seen.insert(key.clone()) {
                    return Err(ConfigError::DuplicateRoute(key.to_string()));
                }

                let (default_src, dest, aux) =
                    route::default_layout(&source_dir, &output_dir, &section.name, kind);
                let src = section
                    .patterns
                    .get(kind.as_str())
                    .cloned()
                    .unwrap_or(default_src);

                let source = compile(&format!("{field}.patterns.{kind}"), &src)?;
                let aux = if kind.is_watched() {
                    aux.iter()
                        .map(|a| compile(&format!("{field}.{kind}.aux"), a))
                        .collect::<Result<_, _>>()?
                } else {
                    Vec::new()
                };

                routes.push(Route {
                    key,
                    source,
                    dest,
                    aux,
                    thumbnails: section.thumbnails && kind == RouteKind::Image,
                });
            }
            routes.sort_by_key(Route::kind);

            sections.push(Section {
                name: section.name,
                routes,
            });
        }

        Ok(Self { sections })
    }

    /// Sections in declared order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn route(&self, key: &RouteKey) -> Option<&Route> {
        self.section(&key.section)?
            .routes
            .iter()
            .find(|r| r.kind() == key.kind)
    }

    /// Every route that file changes can re-run.
    pub fn watched_routes(&self) -> impl Iterator<Item = &Route> {
        self.sections.iter().flat_map(Section::chain_routes)
    }

    /// Routes whose source or aux globs match a root-relative path.
    pub fn routes_triggered_by(&self, rel: &Path) -> Vec<RouteKey> {
        self.watched_routes()
            .filter(|r| r.is_triggered_by(rel))
            .map(|r| r.key.clone())
            .collect()
    }

    /// Distinct base directories of every watched glob, relative to root.
    ///
    /// Nested bases are collapsed into their ancestor.
    pub fn watch_bases(&self) -> Vec<PathBuf> {
        let mut bases: Vec<PathBuf> = self
            .watched_routes()
            .flat_map(|r| std::iter::once(&r.source).chain(&r.aux))
            .map(|p| p.base().to_path_buf())
            .collect();
        bases.sort();
        bases.dedup();

        let mut collapsed: Vec<PathBuf> = Vec::new();
        for base in bases {
            if !collapsed.iter().any(|kept| base.starts_with(kept)) {
                collapsed.push(base);
            }
        }
        collapsed
    }
}

fn compile(field: &str, raw: &str) -> Result<Pattern, ConfigError> {
    Pattern::new(raw).map_err(|source| ConfigError::Glob {
        field: field.to_string(),
        pattern: raw.to_string(),
        source,
    })
}
