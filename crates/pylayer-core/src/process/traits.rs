//! Process runner trait definition.

use std::io::Write;

use crate::env::Environment;
use crate::process::errors::ProcessError;

/// One invocation of an [`Executable`].
pub struct Execution<'a> {
    pub args: Vec<String>,
    pub env: &'a Environment,
    pub stdout: &'a mut dyn Write,
    pub stderr: &'a mut dyn Write,
}

/// Something that can be run to completion with arguments and an environment.
///
/// Implementations block until the program exits. Success means a zero exit
/// status; everything else is a [`ProcessError`].
pub trait Executable: Send + Sync {
    fn execute(&self, execution: Execution<'_>) -> Result<(), ProcessError>;
}
