//! Passthrough chain for vendor files and SCSS sources.

use std::fs;
use std::path::Path;

use super::{FileOutcome, TransformError};
use crate::core::PipelineContext;
use crate::freshness::is_output_fresh;
use crate::registry::Route;

pub(super) fn passthrough(
    route: &Route,
    ctx: &PipelineContext,
    src: &Path,
) -> Result<FileOutcome, TransformError> {
    let dest = route.output_path(ctx.root(), src);
    if is_output_fresh(&dest, src) {
        return Ok(FileOutcome::Skipped);
    }

    let wrap = |e| TransformError::Write(dest.clone(), e);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(wrap)?;
    }
    fs::copy(src, &dest).map_err(wrap)?;
    Ok(FileOutcome::Written(vec![dest]))
}
