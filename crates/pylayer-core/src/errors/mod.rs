use std::error::Error;

pub use pylayer_config::ConfigError;

/// Base trait for all application errors
pub trait PylayerError: Error + Send + Sync + 'static {
    /// Error code for programmatic handling
    fn error_code(&self) -> &'static str;

    /// Whether the failure was caused by user input rather than the layer or
    /// the environment
    fn is_user_error(&self) -> bool {
        false
    }
}

/// Common result type for the application
pub type PylayerResult<T> = Result<T, Box<dyn PylayerError>>;

impl PylayerError for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            ConfigError::ConfigNotFound { .. } => "CONFIG_NOT_FOUND",
            ConfigError::ConfigParseError { .. } => "CONFIG_PARSE_ERROR",
            ConfigError::InvalidPattern { .. } => "CONFIG_INVALID_PATTERN",
            ConfigError::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            ConfigError::IoError { .. } => "CONFIG_IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            ConfigError::ConfigNotFound { .. }
                | ConfigError::ConfigParseError { .. }
                | ConfigError::InvalidPattern { .. }
                | ConfigError::InvalidConfiguration { .. }
        )
    }
}
