//! Selector renaming across stylesheets, markup and scripts.
//!
//! Names are collected from the manifest's stylesheets only, in manifest
//! order, then every manifest file is rewritten with the same mapping.
//! Generated names are drawn in first-appearance order, so the n-th name of
//! an obfuscated tree is already the n-th generated name and a second run
//! with the same rules maps every name to itself.

mod css;
mod html;
mod js;
mod names;

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use names::{Affixes, Exclusions, NameMap};

use super::PublicError;
use crate::config::ObfuscateConfig;
use crate::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameKind {
    Class,
    Id,
    Keyframes,
}

/// The full mapping for one run.
#[derive(Debug, Default)]
pub struct Renames {
    classes: NameMap,
    ids: NameMap,
    keyframes: NameMap,
}

impl Renames {
    pub fn lookup(&self, kind: NameKind, name: &str) -> Option<&str> {
        match kind {
            NameKind::Class => self.classes.get(name),
            NameKind::Id => self.ids.get(name),
            NameKind::Keyframes => self.keyframes.get(name),
        }
    }

    fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.ids.is_empty() && self.keyframes.is_empty()
    }

    #[cfg(test)]
    fn for_test(classes: &[(&str, &str)], ids: &[(&str, &str)]) -> Self {
        let mut renames = Self::default();
        renames.classes = NameMap::from_pairs(classes);
        renames.ids = NameMap::from_pairs(ids);
        renames
    }
}

#[derive(Debug, Clone, Copy)]
enum FileKind {
    Css,
    Html,
    Js,
}

impl FileKind {
    fn of(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "css" => Some(Self::Css),
            "html" | "htm" => Some(Self::Html),
            "js" | "mjs" => Some(Self::Js),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ObfuscateReport {
    pub files_rewritten: usize,
    pub classes: usize,
    pub ids: usize,
    pub keyframes: usize,
}

pub struct Obfuscator {
    affixes: Affixes,
    exclude: Exclusions,
    exclude_ids: Exclusions,
    rename_keyframes: bool,
}

impl Obfuscator {
    pub fn new(config: &ObfuscateConfig) -> Result<Self, PublicError> {
        Ok(Self {
            affixes: Affixes {
                prefix: config.prefix.clone(),
                suffix: config.suffix.clone(),
            },
            exclude: Exclusions::new(&config.exclude)?,
            exclude_ids: Exclusions::new(&config.exclude_ids)?,
            rename_keyframes: config.rename_keyframes,
        })
    }

    /// Rewrite every file in place. `files` is the resolved manifest.
    pub fn run(&self, files: &[PathBuf]) -> Result<ObfuscateReport, PublicError> {
        let mut sources = Vec::with_capacity(files.len());
        for path in files {
            let Some(kind) = FileKind::of(path) else {
                debug!("obfuscate"; "skipping {}: unsupported file type", path.display());
                continue;
            };
            let bytes = fs::read(path).map_err(|e| PublicError::Io(path.clone(), e))?;
            let text = String::from_utf8(bytes).map_err(|_| PublicError::NotUtf8(path.clone()))?;
            sources.push((path, kind, text));
        }

        let stylesheets = sources
            .iter()
            .filter(|(_, kind, _)| matches!(kind, FileKind::Css))
            .map(|(_, _, text)| text.as_str());
        let renames = self.plan(stylesheets);

        let mut report = ObfuscateReport {
            classes: renames.classes.len(),
            ids: renames.ids.len(),
            keyframes: renames.keyframes.len(),
            ..ObfuscateReport::default()
        };
        if renames.is_empty() {
            return Ok(report);
        }

        for (path, kind, text) in &sources {
            let rewritten = match kind {
                FileKind::Css => css::rewrite(text, &renames),
                FileKind::Html => html::rewrite(text, &renames),
                FileKind::Js => js::rewrite(text, &renames),
            };
            if rewritten != *text {
                fs::write(path, rewritten).map_err(|e| PublicError::Io(path.to_path_buf(), e))?;
                report.files_rewritten += 1;
            }
        }
        Ok(report)
    }

    fn is_excluded(&self, kind: NameKind, name: &str) -> bool {
        match kind {
            NameKind::Id => self.exclude_ids.contains(name),
            NameKind::Class | NameKind::Keyframes => self.exclude.contains(name),
        }
    }

    /// Build the mapping from stylesheets, first appearance first.
    fn plan<'a>(&self, stylesheets: impl Iterator<Item = &'a str>) -> Renames {
        let mut order: Vec<(NameKind, String)> = Vec::new();
        let mut seen = FxHashSet::default();
        for text in stylesheets {
            css::collect(text, |kind, name| {
                if kind == NameKind::Keyframes && !self.rename_keyframes {
                    return;
                }
                if seen.insert((kind, name.to_string())) {
                    order.push((kind, name.to_string()));
                }
            });
        }

        // Excluded names stay as they are, so no generated name may equal one.
        let taken: FxHashSet<String> = order
            .iter()
            .filter(|(kind, name)| self.is_excluded(*kind, name))
            .map(|(_, name)| name.clone())
            .collect();

        let mut renames = Renames::default();
        for (kind, name) in &order {
            let (map, exclude) = match kind {
                NameKind::Class => (&mut renames.classes, &self.exclude),
                NameKind::Id => (&mut renames.ids, &self.exclude_ids),
                NameKind::Keyframes => (&mut renames.keyframes, &self.exclude),
            };
            if !exclude.contains(name) {
                map.assign(name, &self.affixes, &taken);
            }
        }
        renames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CSS: &str = ".card { animation: spin 1s; }\n\
                       .fa, .fa-icon { display: inline; }\n\
                       #main .card-title { color: red; }\n\
                       @keyframes spin { to { transform: rotate(1turn); } }\n";
    const HTML: &str = r#"<main id="main"><div class="card"><i class="fa fa-icon"></i><h2 class="card-title">x</h2></div></main>"#;
    const JS: &str = "document.querySelector('#main .card').classList.add('fa-icon', 'card-title');\n";

    fn write_tree(dir: &Path) -> Vec<PathBuf> {
        let files = [("main.css", CSS), ("index.html", HTML), ("item.js", JS)];
        files
            .iter()
            .map(|(name, text)| {
                let path = dir.join(name);
                fs::write(&path, text).unwrap();
                path
            })
            .collect()
    }

    fn obfuscator() -> Obfuscator {
        Obfuscator::new(&ObfuscateConfig::default()).unwrap()
    }

    #[test]
    fn test_excluded_names_survive_everywhere() {
        let dir = TempDir::new().unwrap();
        let files = write_tree(dir.path());
        let report = obfuscator().run(&files).unwrap();

        let css = fs::read_to_string(&files[0]).unwrap();
        let html = fs::read_to_string(&files[1]).unwrap();
        let js = fs::read_to_string(&files[2]).unwrap();

        assert!(css.contains(".fa, .fa-icon"));
        assert!(html.contains(r#"class="fa fa-icon""#));
        assert!(js.contains("'fa-icon'"));

        assert_eq!(report.classes, 2);
        assert_eq!(report.ids, 1);
        assert_eq!(report.keyframes, 1);
        assert_eq!(report.files_rewritten, 3);
    }

    #[test]
    fn test_consistent_names_across_files() {
        let dir = TempDir::new().unwrap();
        let files = write_tree(dir.path());
        obfuscator().run(&files).unwrap();

        let css = fs::read_to_string(&files[0]).unwrap();
        let html = fs::read_to_string(&files[1]).unwrap();
        let js = fs::read_to_string(&files[2]).unwrap();

        // card -> a, card-title -> b (classes); main -> a (ids); spin -> a (keyframes)
        assert!(css.contains(".preasuf { animation: preasuf 1s; }"));
        assert!(css.contains("#preasuf .prebsuf"));
        assert!(css.contains("@keyframes preasuf"));
        assert!(html.contains(r#"<main id="preasuf"><div class="preasuf">"#));
        assert!(html.contains(r#"class="prebsuf""#));
        assert_eq!(
            js,
            "document.querySelector('#preasuf .preasuf').classList.add('fa-icon', 'prebsuf');\n"
        );
    }

    #[test]
    fn test_rerun_is_noop() {
        let dir = TempDir::new().unwrap();
        let files = write_tree(dir.path());
        obfuscator().run(&files).unwrap();
        let snapshot: Vec<_> = files.iter().map(|f| fs::read(f).unwrap()).collect();

        let report = obfuscator().run(&files).unwrap();
        assert_eq!(report.files_rewritten, 0);
        assert_eq!(report.classes, 0);
        let again: Vec<_> = files.iter().map(|f| fs::read(f).unwrap()).collect();
        assert_eq!(snapshot, again);
    }

    #[test]
    fn test_short_affixes_rename_every_name() {
        let dir = TempDir::new().unwrap();
        let css = dir.path().join("main.css");
        let html = dir.path().join("index.html");
        fs::write(&css, ".active { color: red; }\n.card { color: blue; }\n").unwrap();
        fs::write(&html, r#"<div class="card active"></div>"#).unwrap();
        let files = vec![css.clone(), html.clone()];

        let config = ObfuscateConfig {
            prefix: "a".into(),
            suffix: String::new(),
            ..ObfuscateConfig::default()
        };
        let obfuscator = Obfuscator::new(&config).unwrap();
        let report = obfuscator.run(&files).unwrap();
        assert_eq!(report.classes, 2);
        assert_eq!(
            fs::read_to_string(&css).unwrap(),
            ".aa { color: red; }\n.ab { color: blue; }\n"
        );
        assert_eq!(fs::read_to_string(&html).unwrap(), r#"<div class="ab aa"></div>"#);

        let again = obfuscator.run(&files).unwrap();
        assert_eq!(again.files_rewritten, 0);
        assert_eq!(again.classes, 0);
    }

    #[test]
    fn test_generated_name_never_shadows_excluded_name() {
        let dir = TempDir::new().unwrap();
        let css = dir.path().join("main.css");
        fs::write(&css, ".preasuf { color: red; }\n.card { color: blue; }\n").unwrap();

        let config = ObfuscateConfig {
            exclude: vec!["preasuf".into()],
            ..ObfuscateConfig::default()
        };
        Obfuscator::new(&config).unwrap().run(&[css.clone()]).unwrap();
        assert_eq!(
            fs::read_to_string(&css).unwrap(),
            ".preasuf { color: red; }\n.prebsuf { color: blue; }\n"
        );
    }

    #[test]
    fn test_keyframes_kept_when_disabled() {
        let dir = TempDir::new().unwrap();
        let files = write_tree(dir.path());
        let config = ObfuscateConfig {
            rename_keyframes: false,
            ..ObfuscateConfig::default()
        };
        Obfuscator::new(&config).unwrap().run(&files).unwrap();
        let css = fs::read_to_string(&files[0]).unwrap();
        assert!(css.contains("@keyframes spin"));
        assert!(css.contains("animation: spin 1s"));
    }

    #[test]
    fn test_exclude_ids() {
        let dir = TempDir::new().unwrap();
        let files = write_tree(dir.path());
        let config = ObfuscateConfig {
            exclude_ids: vec!["*".into()],
            ..ObfuscateConfig::default()
        };
        let report = Obfuscator::new(&config).unwrap().run(&files).unwrap();
        assert_eq!(report.ids, 0);
        assert!(fs::read_to_string(&files[1]).unwrap().contains(r#"id="main""#));
    }
}
