//! Public copy: the build tree mirrored into `build-public`, with selectors
//! renamed in an explicit manifest of files.
//!
//! ```text
//! build/ ──copy──► build-public/ ──manifest──► [css, html, js] ──rewrite──► in place
//! ```
//!
//! The manifest is validated against the public tree before anything is
//! rewritten; a missing entry aborts the build.

mod copy;
mod manifest;
mod obfuscate;

pub use copy::public_copy;
pub use manifest::resolve_manifest;
pub use obfuscate::Obfuscator;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublicError {
    #[error("IO error on `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("manifest entry `{0}` does not exist in the public tree")]
    MissingEntry(String),

    #[error("manifest glob `{0}` matches no files in the public tree")]
    EmptyGlob(String),

    #[error("invalid pattern `{pattern}`")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("public tree `{public}` overlaps build tree `{build}`")]
    Overlap { build: PathBuf, public: PathBuf },

    #[error("`{0}` is not valid UTF-8")]
    NotUtf8(PathBuf),
}
