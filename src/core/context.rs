//! Startup-resolved state shared by every chain.

use std::path::Path;

use super::Mode;
use crate::config::{ConfigError, PipelineConfig};
use crate::registry::Registry;

/// Everything a chain needs, built once and never mutated.
///
/// Shared through `Arc` in watch mode; borrowed in one-shot graphs.
#[derive(Debug)]
pub struct PipelineContext {
    pub config: PipelineConfig,
    pub registry: Registry,
    pub mode: Mode,
}

impl PipelineContext {
    /// Compile the registry and freeze the mode.
    pub fn new(config: PipelineConfig, mode: Mode) -> Result<Self, ConfigError> {
        let registry = Registry::from_config(&config)?;
        Ok(Self {
            config,
            registry,
            mode,
        })
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }
}
