//! `[serve]` section configuration.
//!
//! Contains development server settings.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"         # Network interface (127.0.0.1 = localhost only)
//! port = 4000                     # HTTP port number (no fallback port)
//! start_path = "/item/index.html" # Where `/` redirects to
//!
//! [serve.ghost]                   # Mirror interactions across clients
//! clicks = false
//! scroll = false
//! location = false
//! forms = false
//! ```

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

use super::ConfigDiagnostics;

/// Development server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServeConfig {
    /// Network interface to bind.
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// Page `/` redirects to. Falls back to the preset's entry page.
    pub start_path: Option<String>,

    /// Mirrored interactions, each independently togglable.
    pub ghost: GhostMode,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 4000,
            start_path: None,
            ghost: GhostMode::default(),
        }
    }
}

impl ServeConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.port == 0 {
            diag.error_with_hint(
                "serve.port",
                "port must not be 0",
                "the dev server binds one fixed port",
            );
        }
        if let Some(path) = &self.start_path
            && !path.starts_with('/')
        {
            diag.error("serve.start_path", format!("`{path}` must start with `/`"));
        }
    }
}

/// Which client interactions are mirrored to every other connected client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GhostMode {
    pub clicks: bool,
    pub scroll: bool,
    pub location: bool,
    pub forms: bool,
}

impl GhostMode {
    /// Whether a mirrored event kind is enabled.
    pub fn allows(&self, kind: &str) -> bool {
        match kind {
            "click" => self.clicks,
            "scroll" => self.scroll,
            "location" => self.location,
            "input" => self.forms,
            _ => false,
        }
    }

    pub fn any(&self) -> bool {
        self.clicks || self.scroll || self.location || self.forms
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use crate::config::test_parse_config;

    #[test]
    fn test_serve_config_defaults() {
        let config = test_parse_config("");

        assert_eq!(
            config.serve.interface,
            IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
        );
        assert_eq!(config.serve.port, 4000);
        assert!(config.serve.start_path.is_none());
        assert!(!config.serve.ghost.any());
    }

    #[test]
    fn test_serve_config_partial_override() {
        let config = test_parse_config("[serve]\nport = 3000\n[serve.ghost]\nscroll = true");

        assert_eq!(config.serve.port, 3000);
        assert!(config.serve.ghost.scroll);
        assert!(!config.serve.ghost.clicks);
        assert!(config.serve.ghost.allows("scroll"));
        assert!(!config.serve.ghost.allows("click"));
        assert!(!config.serve.ghost.allows("unknown"));
    }

    #[test]
    fn test_serve_config_rejects_unknown_field() {
        let result = crate::config::PipelineConfig::from_str("[serve]\nwatch = true");
        assert!(result.is_err());
    }
}
