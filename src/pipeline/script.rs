//! Script chain.
//!
//! Development copies sources verbatim. Production writes the unminified
//! `name.js` next to a minified `name.min.js`; both are published.

use std::path::Path;

use super::{FileOutcome, TransformError, minify_js, read_string, with_stem_suffix, write_file};
use crate::core::PipelineContext;
use crate::registry::Route;

pub(super) fn process(
    route: &Route,
    ctx: &PipelineContext,
    src: &Path,
) -> Result<FileOutcome, TransformError> {
    let source = read_string(src)?;
    let dest = route.output_path(ctx.root(), src);

    if ctx.mode.is_dev() || is_minified(src) {
        write_file(&dest, &source)?;
        return Ok(FileOutcome::Written(vec![dest]));
    }

    let minified = minify_js(&source, ctx.config.script.drop_console)?;
    let min_dest = with_stem_suffix(&dest, ".min");
    write_file(&dest, &source)?;
    write_file(&min_dest, minified)?;
    Ok(FileOutcome::Written(vec![dest, min_dest]))
}

/// `vendor.min.js` is shipped as-is.
fn is_minified(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.ends_with(".min"))
}
