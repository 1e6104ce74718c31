use std::path::Path;

use crate::cleanup::traits::{ExecutableProber, FileDeleter};
use crate::process::{Executable, ProcessExecutable};

/// Probes with real processes and deletes with `std::fs::remove_file`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutableDeleter;

impl ExecutableProber for SystemExecutableDeleter {
    fn executable(&self, path: &Path) -> Box<dyn Executable> {
        Box::new(ProcessExecutable::new(path))
    }
}

impl FileDeleter for SystemExecutableDeleter {
    fn delete(&self, path: &Path) -> std::io::Result<()> {
        std::fs::remove_file(path)
    }
}
