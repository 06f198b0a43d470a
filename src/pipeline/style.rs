//! Style chain: SCSS entry points to CSS.

use std::path::Path;

use super::{CssOutput, FileOutcome, TransformError, process_css, with_stem_suffix, write_file};
use crate::core::PipelineContext;
use crate::registry::Route;

/// Compile one SCSS entry point.
///
/// Development writes `name.css` with an inline source map. Production
/// writes `name.css` and `name.min.css`.
pub(super) fn compile(
    route: &Route,
    ctx: &PipelineContext,
    src: &Path,
) -> Result<FileOutcome, TransformError> {
    // Partials are only reachable through @use/@import.
    if is_partial(src) {
        return Ok(FileOutcome::Skipped);
    }

    let mut options = grass::Options::default();
    if let Some(dir) = src.parent() {
        options = options.load_path(dir);
    }
    let css = grass::from_path(src, &options).map_err(|e| TransformError::Scss(e.to_string()))?;

    let dest = route.output_path(ctx.root(), src).with_extension("css");
    let filename = src
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if ctx.mode.is_dev() {
        write_file(&dest, process_css(&css, &filename, CssOutput::PrettyWithMap)?)?;
        return Ok(FileOutcome::Written(vec![dest]));
    }

    let min_dest = with_stem_suffix(&dest, ".min");
    write_file(&dest, process_css(&css, &filename, CssOutput::Pretty)?)?;
    write_file(&min_dest, process_css(&css, &filename, CssOutput::Minified)?)?;
    Ok(FileOutcome::Written(vec![dest, min_dest]))
}

fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'))
}
