use crate::errors::PylayerError;

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to start '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for '{program}': {source}")]
    WaitFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' {}", describe_exit(.code))]
    ExitFailure { program: String, code: Option<i32> },

    #[error("failed to forward output of '{program}': {source}")]
    OutputFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

impl PylayerError for ProcessError {
    fn error_code(&self) -> &'static str {
        match self {
            ProcessError::SpawnFailed { .. } => "PROCESS_SPAWN_FAILED",
            ProcessError::WaitFailed { .. } => "PROCESS_WAIT_FAILED",
            ProcessError::ExitFailure { .. } => "PROCESS_EXIT_FAILURE",
            ProcessError::OutputFailed { .. } => "PROCESS_OUTPUT_FAILED",
        }
    }
}
