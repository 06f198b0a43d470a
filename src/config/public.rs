//! `[public]` section configuration.
//!
//! Controls the obfuscated public copy produced at the end of `build`.
//!
//! # Example
//!
//! ```toml
//! [public]
//! output = "build-public"
//! files = ["item/css/*.css", "item/*.html", "item/js/item.js"]
//!
//! [public.obfuscate]
//! exclude = ["fa", "fa-*"]   # class patterns never renamed
//! exclude_ids = []           # id patterns never renamed
//! prefix = "pre"
//! suffix = "suf"
//! rename_keyframes = true
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigDiagnostics;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublicConfig {
    /// Public tree, relative to the project root.
    pub output: PathBuf,

    /// Manifest of files to obfuscate, relative to the public tree.
    /// Falls back to the preset's manifest when unset.
    pub files: Option<Vec<String>>,

    pub obfuscate: ObfuscateConfig,
}

impl Default for PublicConfig {
    fn default() -> Self {
        Self {
            output: "build-public".into(),
            files: None,
            obfuscate: ObfuscateConfig::default(),
        }
    }
}

impl PublicConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.output.as_os_str().is_empty() {
            diag.error("public.output", "output directory must not be empty");
        }
        if let Some(files) = &self.files {
            for (i, file) in files.iter().enumerate() {
                if file.starts_with('/') || file.split('/').any(|seg| seg == "..") {
                    diag.error_with_hint(
                        format!("public.files[{i}]"),
                        format!("`{file}` escapes the public tree"),
                        "manifest entries are relative to public.output",
                    );
                }
            }
        }
        self.obfuscate.validate(diag);
    }
}

/// Selector renaming rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ObfuscateConfig {
    pub exclude: Vec<String>,
    pub exclude_ids: Vec<String>,
    pub prefix: String,
    pub suffix: String,
    pub rename_keyframes: bool,
}

impl Default for ObfuscateConfig {
    fn default() -> Self {
        Self {
            exclude: vec!["fa".into(), "fa-*".into()],
            exclude_ids: Vec::new(),
            prefix: "pre".into(),
            suffix: "suf".into(),
            rename_keyframes: true,
        }
    }
}

impl ObfuscateConfig {
    fn validate(&self, diag: &mut ConfigDiagnostics) {
        let is_ident = |s: &str| s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if self.prefix.is_empty() || !self.prefix.starts_with(|c: char| c.is_ascii_alphabetic()) {
            diag.error_with_hint(
                "public.obfuscate.prefix",
                "prefix must start with an ASCII letter",
                "generated names must stay valid CSS identifiers",
            );
        } else if !is_ident(&self.prefix) {
            diag.error("public.obfuscate.prefix", "prefix contains invalid characters");
        }
        if !is_ident(&self.suffix) {
            diag.error("public.obfuscate.suffix", "suffix contains invalid characters");
        }
    }
}
