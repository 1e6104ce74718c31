use crate::errors::PylayerError;
use crate::process::ProcessError;

/// Fatal cleanup failures.
///
/// Each variant shows the underlying error unchanged; the variant only
/// records which step of the pipeline stopped.
#[derive(Debug, thiserror::Error)]
pub enum CleanupError {
    /// `pip --version` failed, so no pip command can be trusted.
    #[error(transparent)]
    ManagerUnusable { source: ProcessError },

    #[error(transparent)]
    UninstallFailed { source: ProcessError },

    #[error(transparent)]
    InvalidPattern { source: glob::PatternError },

    #[error(transparent)]
    DeleteFailed { source: std::io::Error },
}

impl PylayerError for CleanupError {
    fn error_code(&self) -> &'static str {
        match self {
            CleanupError::ManagerUnusable { .. } => "CLEANUP_MANAGER_UNUSABLE",
            CleanupError::UninstallFailed { .. } => "CLEANUP_UNINSTALL_FAILED",
            CleanupError::InvalidPattern { .. } => "CLEANUP_INVALID_PATTERN",
            CleanupError::DeleteFailed { .. } => "CLEANUP_DELETE_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, CleanupError::InvalidPattern { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_unusable_is_transparent() {
        let error = CleanupError::ManagerUnusable {
            source: ProcessError::ExitFailure {
                program: "python3".to_string(),
                code: Some(1),
            },
        };
        assert_eq!(error.to_string(), "'python3' exited with status 1");
        assert_eq!(error.error_code(), "CLEANUP_MANAGER_UNUSABLE");
        assert!(!error.is_user_error());
    }

    #[test]
    fn test_delete_failed_is_transparent() {
        let error = CleanupError::DeleteFailed {
            source: std::io::Error::new(std::io::ErrorKind::Other, "failed to delete file"),
        };
        assert_eq!(error.to_string(), "failed to delete file");
        assert_eq!(error.error_code(), "CLEANUP_DELETE_FAILED");
    }

    #[test]
    fn test_invalid_pattern() {
        let source = glob::Pattern::new("[").unwrap_err();
        let expected = source.to_string();
        let error = CleanupError::InvalidPattern { source };
        assert_eq!(error.to_string(), expected);
        assert!(error.to_string().contains("invalid range pattern"));
        assert_eq!(error.error_code(), "CLEANUP_INVALID_PATTERN");
        assert!(error.is_user_error());
    }
}
