//! Per-route transformation chains.
//!
//! # Architecture
//!
//! ```text
//! Route ──expand──► [src files] ──rayon──► kind handler ──► dest files
//!                                              │
//!                                              └─ error: logged, file skipped
//! ```
//!
//! Files inside one chain are independent and processed in parallel.
//! A failing file never aborts its siblings; the outcome of every file is
//! folded into a [`ChainReport`].

mod copy;
mod error;
mod image;
mod markup;
mod minify;
mod script;
mod style;

pub use error::{IncludeError, TransformError};
pub use minify::{CssOutput, minify_js, process_css};

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::core::PipelineContext;
use crate::log;
use crate::registry::{Route, RouteKind};

/// What happened to one source file.
#[derive(Debug)]
pub enum FileOutcome {
    /// Artifacts written, in write order.
    Written(Vec<PathBuf>),
    /// Destination already up to date, or the file is not an entry point.
    Skipped,
}

#[derive(Debug, Clone)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of one chain run.
#[derive(Debug, Default, Clone)]
pub struct ChainReport {
    /// Every artifact written, sorted.
    pub written: Vec<PathBuf>,
    pub skipped: usize,
    pub failed: Vec<FileFailure>,
}

impl ChainReport {
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }

    fn record(&mut self, path: PathBuf, outcome: Result<FileOutcome, TransformError>) {
        match outcome {
            Ok(FileOutcome::Written(paths)) => self.written.extend(paths),
            Ok(FileOutcome::Skipped) => self.skipped += 1,
            Err(err) => self.failed.push(FileFailure {
                path,
                message: error_chain(&err),
            }),
        }
    }
}

/// Run one route's chain over every file its source glob currently matches.
pub fn run_chain(route: &Route, ctx: &PipelineContext) -> ChainReport {
    let root = ctx.root();
    let sources = route.sources(root);

    let outcomes: Vec<_> = sources
        .into_par_iter()
        .map(|src| {
            let outcome = process_file(route, ctx, &src);
            (src, outcome)
        })
        .collect();

    let mut report = ChainReport::default();
    for (src, outcome) in outcomes {
        if let Err(err) = &outcome {
            log!("error"; "{}: {}", ctx.config.root_relative(&src).display(), error_chain(err));
        }
        report.record(src, outcome);
    }
    report.written.sort();
    report
}

fn process_file(
    route: &Route,
    ctx: &PipelineContext,
    src: &Path,
) -> Result<FileOutcome, TransformError> {
    match route.kind() {
        RouteKind::Style => style::compile(route, ctx, src),
        RouteKind::Markup => markup::render(route, ctx, src),
        RouteKind::Image => image::compress(route, ctx, src),
        RouteKind::Script => script::process(route, ctx, src),
        RouteKind::Vendor | RouteKind::StyleSource => copy::passthrough(route, ctx, src),
    }
}

/// Render an error with its sources, `outer: inner: innermost`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, TransformError> {
    fs::read(path).map_err(|e| TransformError::Read(path.to_path_buf(), e))
}

fn read_string(path: &Path) -> Result<String, TransformError> {
    fs::read_to_string(path).map_err(|e| TransformError::Read(path.to_path_buf(), e))
}

/// Write a file, creating parent directories.
fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), TransformError> {
    let wrap = |e| TransformError::Write(path.to_path_buf(), e);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(wrap)?;
    }
    fs::write(path, contents).map_err(wrap)
}

/// `dir/name.ext` -> `dir/name<suffix>.ext`
fn with_stem_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    let name = match path.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    path.with_file_name(name)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scratch project helpers shared by chain tests.

    use std::fs;
    use std::path::Path;

    use crate::config::PipelineConfig;
    use crate::core::{Mode, PipelineContext};

    pub fn context(root: &Path, mode: Mode) -> PipelineContext {
        let config = PipelineConfig {
            root: root.to_path_buf(),
            ..PipelineConfig::default()
        };
        PipelineContext::new(config, mode).unwrap()
    }

    pub fn write(root: &Path, rel: &str, contents: impl AsRef<[u8]>) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Mode;
    use crate::registry::RouteKey;
    use tempfile::TempDir;

    #[test]
    fn test_with_stem_suffix() {
        assert_eq!(
            with_stem_suffix(Path::new("build/js/item.js"), ".min"),
            PathBuf::from("build/js/item.min.js")
        );
        assert_eq!(
            with_stem_suffix(Path::new("a/photo.jpg"), "-thumb"),
            PathBuf::from("a/photo-thumb.jpg")
        );
    }

    #[test]
    fn test_failure_does_not_stop_siblings() {
        let dir = TempDir::new().unwrap();
        testing::write(dir.path(), "src/item/index.html", "<!--=include html/missing.html -->");
        testing::write(dir.path(), "src/item/about.html", "<p>about</p>");

        let ctx = testing::context(dir.path(), Mode::Production);
        let route = ctx
            .registry
            .route(&RouteKey::new("item", RouteKind::Markup))
            .unwrap();
        let report = run_chain(route, &ctx);

        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].path.ends_with("index.html"));
        assert_eq!(report.written, [dir.path().join("build/item/about.html")]);
        assert!(!report.is_ok());
    }

    #[test]
    fn test_empty_glob_is_ok() {
        let dir = TempDir::new().unwrap();
        let ctx = testing::context(dir.path(), Mode::Development);
        for route in ctx.registry.watched_routes() {
            let report = run_chain(route, &ctx);
            assert!(report.is_ok());
            assert!(report.written.is_empty());
        }
    }
}
