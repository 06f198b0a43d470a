//! Build mode: development or production output.

use std::fmt;

/// Environment variable selecting the build mode.
pub const MODE_ENV: &str = "PIPEWRIGHT_ENV";

/// Build mode, resolved once at startup and passed into every chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Unminified output, inline source maps, no suffixed artifacts.
    Development,
    /// Minified `.min` artifacts next to the unminified ones.
    Production,
}

impl Mode {
    /// Map the raw environment value to a mode.
    ///
    /// Only `development` (case-insensitive) selects development output;
    /// anything else, including an unset variable, is production.
    pub fn resolve(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("development") => Self::Development,
            _ => Self::Production,
        }
    }

    /// Read [`MODE_ENV`] from the process environment.
    ///
    /// Called from `main` only; chains receive the resolved value.
    pub fn from_env() -> Self {
        Self::resolve(std::env::var(MODE_ENV).ok().as_deref())
    }

    #[inline]
    pub const fn is_dev(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Production => "production",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_development() {
        assert_eq!(Mode::resolve(Some("development")), Mode::Development);
        assert_eq!(Mode::resolve(Some(" Development ")), Mode::Development);
    }

    #[test]
    fn test_resolve_defaults_to_production() {
        assert_eq!(Mode::resolve(None), Mode::Production);
        assert_eq!(Mode::resolve(Some("")), Mode::Production);
        assert_eq!(Mode::resolve(Some("dev")), Mode::Production);
        assert_eq!(Mode::resolve(Some("production")), Mode::Production);
    }

    #[test]
    fn test_is_dev() {
        assert!(Mode::Development.is_dev());
        assert!(!Mode::Production.is_dev());
    }
}
