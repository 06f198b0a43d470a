//! `[image]` and `[script]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [image]
//! thumb_width = 520
//! thumb_height = 390
//! thumb_suffix = "-thumb"
//! jpeg_quality = 90
//!
//! [script]
//! drop_console = true
//! ```

use serde::{Deserialize, Serialize};

use super::ConfigDiagnostics;

/// Image compression and thumbnail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageConfig {
    /// Thumbnails fit inside this box, aspect ratio kept (no crop).
    pub thumb_width: u32,
    pub thumb_height: u32,
    /// Appended to the file stem of thumbnail variants.
    pub thumb_suffix: String,
    /// Quality for re-encoded JPEG files (1-100).
    pub jpeg_quality: u8,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            thumb_width: 520,
            thumb_height: 390,
            thumb_suffix: "-thumb".into(),
            jpeg_quality: 90,
        }
    }
}

impl ImageConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.thumb_width == 0 || self.thumb_height == 0 {
            diag.error("image.thumb_width", "thumbnail dimensions must be non-zero");
        }
        if self.thumb_suffix.is_empty() {
            diag.error_with_hint(
                "image.thumb_suffix",
                "suffix must not be empty",
                "an empty suffix would overwrite the compressed original",
            );
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            diag.error("image.jpeg_quality", "quality must be within 1..=100");
        }
    }
}

/// Script minification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScriptConfig {
    /// Remove `console.*` calls from minified output.
    pub drop_console: bool,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self { drop_console: true }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{ConfigDiagnostics, test_parse_config};

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.image.thumb_width, 520);
        assert_eq!(config.image.thumb_height, 390);
        assert_eq!(config.image.thumb_suffix, "-thumb");
        assert!(config.script.drop_console);
    }

    #[test]
    fn test_invalid_quality() {
        let config = test_parse_config("[image]\njpeg_quality = 0");
        let mut diag = ConfigDiagnostics::new();
        config.image.validate(&mut diag);
        assert_eq!(diag.errors().len(), 1);
        assert_eq!(diag.errors()[0].field, "image.jpeg_quality");
    }
}
