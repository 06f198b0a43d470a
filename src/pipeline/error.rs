//! Per-file transformation errors.
//!
//! Every variant is scoped to a single source file: the chain logs it,
//! skips that file and keeps going.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("failed to read `{0}`")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("failed to write `{0}`")]
    Write(PathBuf, #[source] std::io::Error),

    /// grass reports location and message in one rendered string.
    #[error("{0}")]
    Scss(String),

    #[error("css post-processing failed: {0}")]
    Css(String),

    #[error("script parse failed: {0}")]
    Script(String),

    #[error("image encoding failed")]
    Image(#[from] image::ImageError),

    #[error("svg optimization failed")]
    Svg(#[from] usvg::Error),

    #[error(transparent)]
    Include(#[from] IncludeError),
}

#[derive(Debug, Error)]
pub enum IncludeError {
    #[error("include cycle: {}", format_chain(.chain))]
    Cycle { chain: Vec<PathBuf> },

    #[error("included file `{}` not found (from `{}`)", .path.display(), .from.display())]
    Missing { path: PathBuf, from: PathBuf },
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| {
            p.file_name()
                .map_or_else(|| p.display().to_string(), |n| n.to_string_lossy().into_owned())
        })
        .collect::<Vec<_>>()
        .join(" -> ")
}
