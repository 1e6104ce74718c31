use serde::Deserialize;

use crate::errors::ConfigError;

/// Packages that are only needed while building the layer.
pub const DEFAULT_PACKAGES: &[&str] = &["setuptools"];

/// Executables in `<layer>/bin` that are probed and removed when broken.
pub const DEFAULT_PATTERN: &str = "pip*";

pub const DEFAULT_PYTHON: &str = "python3";

/// Settings for a single layer cleanup.
///
/// Every field falls back to its default when omitted from the TOML file:
///
/// ```toml
/// packages = ["setuptools", "wheel"]
/// pattern = "pip*"
/// python = "python3"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// Packages to uninstall, in order.
    pub packages: Vec<String>,
    /// Glob matched against file names directly inside `<layer>/bin`.
    pub pattern: String,
    /// Interpreter used to run `-m pip`.
    pub python: String,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            packages: DEFAULT_PACKAGES.iter().map(|p| p.to_string()).collect(),
            pattern: DEFAULT_PATTERN.to_string(),
            python: DEFAULT_PYTHON.to_string(),
        }
    }
}

impl CleanupConfig {
    /// Apply command line overrides on top of the loaded values.
    ///
    /// An empty `packages` slice keeps the configured list.
    pub fn with_overrides(
        mut self,
        packages: &[String],
        pattern: Option<&str>,
        python: Option<&str>,
    ) -> Self {
        if !packages.is_empty() {
            self.packages = packages.to_vec();
        }
        if let Some(pattern) = pattern {
            self.pattern = pattern.to_string();
        }
        if let Some(python) = python {
            self.python = python.to_string();
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(pos) = self.packages.iter().position(|p| p.trim().is_empty()) {
            return Err(ConfigError::InvalidConfiguration {
                message: format!("package name at index {} is empty", pos),
            });
        }

        if self.python.trim().is_empty() {
            return Err(ConfigError::InvalidConfiguration {
                message: "python interpreter name is empty".to_string(),
            });
        }

        glob::Pattern::new(&self.pattern).map_err(|e| ConfigError::InvalidPattern {
            pattern: self.pattern.clone(),
            message: e.msg.to_string(),
        })?;

        Ok(())
    }
}

/// Verbosity requested by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    /// Parse a `BP_LOG_LEVEL` value. Only `DEBUG` (any case) turns on
    /// verbose output; anything else is treated as the default level.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("debug") {
            LogLevel::Debug
        } else {
            LogLevel::Info
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, LogLevel::Debug)
    }
}
