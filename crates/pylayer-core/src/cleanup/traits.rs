//! Collaborator traits for the cleanup pipeline.

use std::path::Path;

use crate::binfs::BinFs;
use crate::cleanup::errors::CleanupError;
use crate::process::Executable;

/// Hands out runnable handles for files in the layer.
pub trait ExecutableProber: Send + Sync {
    /// A handle that runs the file at `path`. Nothing is checked until the
    /// handle is executed.
    fn executable(&self, path: &Path) -> Box<dyn Executable>;
}

pub trait FileDeleter: Send + Sync {
    /// Remove the file at `path`.
    fn delete(&self, path: &Path) -> std::io::Result<()>;
}

/// Entry point used by build phases to tidy a freshly installed layer.
pub trait PythonPipCleanup {
    /// Uninstall `packages` that are present, then delete every file directly
    /// in `<layer>/bin` that matches `pattern` and fails to run with
    /// `--version`.
    ///
    /// # Arguments
    /// * `packages` - Package names, uninstalled in order
    /// * `layer` - Root of the Python layer
    /// * `bin_fs` - View of `<layer>/bin` used to find candidates
    /// * `pattern` - Glob matched against file names in `bin_fs`
    fn cleanup(
        &self,
        packages: &[String],
        layer: &Path,
        bin_fs: &dyn BinFs,
        pattern: &str,
    ) -> Result<(), CleanupError>;
}
