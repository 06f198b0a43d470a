//! Pipeline configuration management for `pipewright.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── assets     # [image], [script]
//! ├── error      # ConfigError, ConfigDiagnostics
//! ├── public     # [public], [public.obfuscate]
//! ├── section    # preset, [[sections]]
//! ├── serve      # [serve], [serve.ghost]
//! └── mod.rs     # PipelineConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section              | Purpose                                       |
//! |----------------------|-----------------------------------------------|
//! | `preset`             | Built-in section layout (`sections`/`single`) |
//! | `[serve]`            | Dev server (interface, port, ghost mode)      |
//! | `[image]`            | Compression quality and thumbnail box         |
//! | `[script]`           | Minifier options                              |
//! | `[public]`           | Public copy and obfuscation manifest          |
//! | `[[sections]]`       | Explicit sections, replacing the preset       |
//!
//! The file is optional. Without one, the built-in preset is used with the
//! current directory as the project root.

mod assets;
mod error;
mod public;
mod section;
mod serve;

pub use assets::{ImageConfig, ScriptConfig};
pub use error::{ConfigDiagnostic, ConfigDiagnostics, ConfigError};
pub use public::{ObfuscateConfig, PublicConfig};
pub use section::{Preset, SectionConfig};
pub use serve::{GhostMode, ServeConfig};

use crate::{
    cli::{Cli, Commands},
    core::Mode,
    debug,
};
use anyhow::{Context, Result};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing pipewright.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Absolute path to the config file, if one was found (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Project root directory (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    pub preset: Preset,

    /// Source tree, relative to root
    pub source: PathBuf,

    /// Build tree, relative to root
    pub output: PathBuf,

    pub serve: ServeConfig,
    pub image: ImageConfig,
    pub script: ScriptConfig,
    pub public: PublicConfig,

    /// Explicit sections; empty means "use the preset"
    pub sections: Vec<SectionConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            config_path: None,
            root: PathBuf::new(),
            preset: Preset::default(),
            source: "src".into(),
            output: "build".into(),
            serve: ServeConfig::default(),
            image: ImageConfig::default(),
            script: ScriptConfig::default(),
            public: PublicConfig::default(),
            sections: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration for the given CLI invocation.
    ///
    /// Searches upward from cwd for the config file. The project root is the
    /// config file's parent directory, or cwd when no file exists.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cwd, &cli.config) {
            Some(path) => {
                debug!("config"; "using {}", path.display());
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or(cwd);
                config.config_path = Some(path);
                config
            }
            None => {
                debug!("config"; "no {} found, using preset", cli.config.display());
                Self {
                    root: cwd,
                    ..Self::default()
                }
            }
        };

        config.apply_command_options(cli);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Apply command-specific overrides.
    fn apply_command_options(&mut self, cli: &Cli) {
        if let Commands::Dev { interface, port } = &cli.command {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
        }
    }

    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Validate every section, collecting all errors before failing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        if self.source == self.output {
            diag.error_with_hint(
                "output",
                "output directory equals the source directory",
                "build output would overwrite sources",
            );
        }
        if self.public.output.starts_with(&self.output) || self.output.starts_with(&self.public.output) {
            diag.error("public.output", "public tree must not overlap the build tree");
        }

        self.serve.validate(&mut diag);
        self.image.validate(&mut diag);
        self.public.validate(&mut diag);

        let mut names = FxHashSet::default();
        let sections = self.effective_sections();
        for (i, section) in sections.iter().enumerate() {
            section.validate(i, &mut diag);
            if !names.insert(section.name.as_str()) {
                diag.error(
                    format!("sections[{i}].name"),
                    format!("section `{}` is declared twice", section.name),
                );
            }
        }
        if sections.len() > 1 && names.contains("") {
            diag.error_with_hint(
                "sections",
                "the unnamed section cannot be combined with named sections",
                "give every section a name",
            );
        }

        diag.into_result()
    }

    // ========================================================================
    // effective values
    // ========================================================================

    /// Sections in declared order: `[[sections]]` when present, else the preset's.
    pub fn effective_sections(&self) -> Vec<SectionConfig> {
        if self.sections.is_empty() {
            self.preset.sections()
        } else {
            self.sections.clone()
        }
    }

    /// `[public] files` when set, else the preset's manifest for `mode`.
    pub fn effective_public_files(&self, mode: Mode) -> Vec<String> {
        self.public
            .files
            .clone()
            .unwrap_or_else(|| self.preset.public_files(mode))
    }

    pub fn start_path(&self) -> &str {
        self.serve
            .start_path
            .as_deref()
            .unwrap_or_else(|| self.preset.start_path())
    }

    // ========================================================================
    // paths
    // ========================================================================

    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root_join(&self.output)
    }

    pub fn public_dir(&self) -> PathBuf {
        self.root_join(&self.public.output)
    }

    /// Path relative to the project root, for display.
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }
}

/// Find config file by searching upward from `start`.
///
/// ```text
/// /home/user/site/src/item/    ← cwd
/// /home/user/site/pipewright.toml ← found
/// ```
fn find_config_file(start: &Path, config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.is_file() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}

/// Parse a config snippet in tests, panicking on error.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> PipelineConfig {
    PipelineConfig::from_str(content).expect("test config should parse")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_file_upward() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("src/item/js");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("pipewright.toml"), "").unwrap();

        let found = find_config_file(&nested, Path::new("pipewright.toml")).unwrap();
        assert_eq!(found, dir.path().join("pipewright.toml"));
    }

    #[test]
    fn test_find_config_file_missing() {
        let dir = TempDir::new().unwrap();
        assert!(find_config_file(dir.path(), Path::new("no-such-pipewright.toml")).is_none());
    }

    #[test]
    fn test_default_paths() {
        let config = PipelineConfig {
            root: PathBuf::from("/site"),
            ..PipelineConfig::default()
        };
        assert_eq!(config.output_dir(), PathBuf::from("/site/build"));
        assert_eq!(config.public_dir(), PathBuf::from("/site/build-public"));
        assert_eq!(
            config.root_relative("/site/build/item/css/main.css"),
            PathBuf::from("build/item/css/main.css")
        );
        assert_eq!(config.start_path(), "/item/index.html");
    }

    #[test]
    fn test_validate_default_is_ok() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_collects_every_error() {
        let config = test_parse_config(
            r#"
output = "src"

[serve]
port = 0

[[sections]]
name = "docs"
kinds = ["style"]

[[sections]]
name = "docs"
kinds = ["script"]
"#,
        );
        let Err(ConfigError::Diagnostics(diag)) = config.validate() else {
            panic!("expected diagnostics");
        };
        let fields: Vec<_> = diag.errors().iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"output"));
        assert!(fields.contains(&"serve.port"));
        assert!(fields.contains(&"sections[1].name"));
    }

    #[test]
    fn test_nested_public_tree_rejected() {
        let config = test_parse_config("[public]\noutput = \"build/public\"");
        let Err(ConfigError::Diagnostics(diag)) = config.validate() else {
            panic!("expected diagnostics");
        };
        assert_eq!(diag.errors()[0].field, "public.output");
    }

    #[test]
    fn test_unnamed_section_must_be_alone() {
        let config = test_parse_config(
            "[[sections]]\nkinds = [\"style\"]\n[[sections]]\nname = \"item\"\nkinds = [\"style\"]",
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_top_level_field() {
        assert!(PipelineConfig::from_str("theme = \"dark\"").is_err());
    }
}
