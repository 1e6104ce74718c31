use std::path::Path;

use tracing::{debug, error, info};

use crate::binfs::{BinFs, glob_bin};
use crate::cleanup::errors::CleanupError;
use crate::cleanup::traits::{ExecutableProber, FileDeleter, PythonPipCleanup};
use crate::env::{Environment, layer_environment};
use crate::layer::LayerPaths;
use crate::process::{DebugLogWriter, Executable, Execution, ProcessError};

const VERSION_FLAG: &str = "--version";

const PIP_VERSION_HINT: &str =
    "pip --version failed. Run with --env BP_LOG_LEVEL=DEBUG to see more information";
const PIP_UNINSTALL_HINT: &str =
    "pip uninstall failed. Run with --env BP_LOG_LEVEL=DEBUG to see more information";

fn pip_args(rest: &[&str]) -> Vec<String> {
    ["-m", "pip"]
        .iter()
        .chain(rest)
        .map(|arg| arg.to_string())
        .collect()
}

/// Removes build-time packages and broken pip shims from a Python layer.
///
/// Runs strictly in order and stops at the first fatal error:
/// 1. `python -m pip --version` (only when there are packages to remove)
/// 2. per package: `pip show -q`, then `pip uninstall -y` if it is present
/// 3. per matching file in `<layer>/bin`: run it with `--version`, delete it
///    if that fails
///
/// Nothing already done is rolled back on failure.
pub struct PipCleanup {
    python: Box<dyn Executable>,
    prober: Box<dyn ExecutableProber>,
    deleter: Box<dyn FileDeleter>,
}

impl PipCleanup {
    pub fn new(
        python: Box<dyn Executable>,
        prober: Box<dyn ExecutableProber>,
        deleter: Box<dyn FileDeleter>,
    ) -> Self {
        Self {
            python,
            prober,
            deleter,
        }
    }

    /// Cleanup against an explicit base environment instead of the ambient one.
    pub fn cleanup_with_env(
        &self,
        packages: &[String],
        layer: &Path,
        bin_fs: &dyn BinFs,
        pattern: &str,
        base_env: &Environment,
    ) -> Result<(), CleanupError> {
        let paths = LayerPaths::new(layer);
        let env = layer_environment(base_env, &paths);

        info!(
            event = "core.cleanup.started",
            layer = %layer.display(),
            packages = packages.len(),
            pattern = pattern
        );

        if !packages.is_empty() {
            self.verify_pip(&env)?;
            self.remove_packages(packages, &env)?;
        }

        self.remove_broken_executables(&paths, bin_fs, pattern, &env)?;

        info!(event = "core.cleanup.completed", layer = %layer.display());
        Ok(())
    }

    fn run_python(&self, args: Vec<String>, env: &Environment) -> Result<(), ProcessError> {
        let mut stdout = DebugLogWriter::stdout();
        let mut stderr = DebugLogWriter::stderr();
        self.python.execute(Execution {
            args,
            env,
            stdout: &mut stdout,
            stderr: &mut stderr,
        })
    }

    fn verify_pip(&self, env: &Environment) -> Result<(), CleanupError> {
        debug!(event = "core.cleanup.pip_version_started");

        if let Err(e) = self.run_python(pip_args(&[VERSION_FLAG]), env) {
            error!(event = "core.cleanup.pip_version_failed", error = %e, "{}", PIP_VERSION_HINT);
            return Err(CleanupError::ManagerUnusable { source: e });
        }

        Ok(())
    }

    fn remove_packages(&self, packages: &[String], env: &Environment) -> Result<(), CleanupError> {
        for name in packages {
            debug!(
                event = "core.cleanup.package_check_started",
                package = %name,
                "Checking if '{}' package is installed",
                name
            );

            // Any failure of `pip show` counts as "not installed".
            if let Err(e) = self.run_python(pip_args(&["show", "-q", name.as_str()]), env) {
                debug!(
                    event = "core.cleanup.package_absent",
                    package = %name,
                    error = %e
                );
                continue;
            }

            debug!(
                event = "core.cleanup.package_uninstall_started",
                package = %name,
                "Uninstalling '{}' package",
                name
            );

            if let Err(e) = self.run_python(pip_args(&["uninstall", "-y", name.as_str()]), env) {
                error!(
                    event = "core.cleanup.package_uninstall_failed",
                    package = %name,
                    error = %e,
                    "{}",
                    PIP_UNINSTALL_HINT
                );
                return Err(CleanupError::UninstallFailed { source: e });
            }

            info!(event = "core.cleanup.package_uninstalled", package = %name);
        }

        Ok(())
    }

    fn remove_broken_executables(
        &self,
        paths: &LayerPaths,
        bin_fs: &dyn BinFs,
        pattern: &str,
        env: &Environment,
    ) -> Result<(), CleanupError> {
        let names =
            glob_bin(bin_fs, pattern).map_err(|source| CleanupError::InvalidPattern { source })?;

        for name in names {
            let path = paths.bin_file(&name);

            let mut stdout = DebugLogWriter::stdout();
            let mut stderr = DebugLogWriter::stderr();
            let probe = self.prober.executable(&path).execute(Execution {
                args: vec![VERSION_FLAG.to_string()],
                env,
                stdout: &mut stdout,
                stderr: &mut stderr,
            });

            let Err(probe_error) = probe else {
                debug!(event = "core.cleanup.executable_ok", path = %path.display());
                continue;
            };

            debug!(
                event = "core.cleanup.executable_delete_started",
                path = %path.display(),
                probe_error = %probe_error,
                "Deleting broken pip executable '{}'",
                name.to_string_lossy()
            );

            self.deleter.delete(&path).map_err(|source| {
                error!(
                    event = "core.cleanup.executable_delete_failed",
                    path = %path.display(),
                    error = %source
                );
                CleanupError::DeleteFailed { source }
            })?;

            info!(event = "core.cleanup.executable_deleted", path = %path.display());
        }

        Ok(())
    }
}

impl PythonPipCleanup for PipCleanup {
    fn cleanup(
        &self,
        packages: &[String],
        layer: &Path,
        bin_fs: &dyn BinFs,
        pattern: &str,
    ) -> Result<(), CleanupError> {
        self.cleanup_with_env(packages, layer, bin_fs, pattern, &Environment::from_ambient())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binfs::MemoryBinFs;
    use crate::testing::{FakeExecutable, FakeExecutableDeleter, process_failure};
    use std::ffi::OsStr;
    use std::path::PathBuf;

    const LAYER: &str = "/layers/cpython";

    struct Harness {
        python: FakeExecutable,
        files: FakeExecutableDeleter,
        cleanup: PipCleanup,
    }

    fn harness(python: FakeExecutable, files: FakeExecutableDeleter) -> Harness {
        let cleanup = PipCleanup::new(
            Box::new(python.clone()),
            Box::new(files.clone()),
            Box::new(files.clone()),
        );
        Harness {
            python,
            files,
            cleanup,
        }
    }

    fn default_harness() -> Harness {
        harness(FakeExecutable::new(), FakeExecutableDeleter::new())
    }

    fn packages(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|n| n.to_string()).collect()
    }

    fn run(h: &Harness, pkgs: &[String], fs: &MemoryBinFs, pattern: &str) -> Result<(), CleanupError> {
        h.cleanup
            .cleanup_with_env(pkgs, Path::new(LAYER), fs, pattern, &Environment::default())
    }

    #[test]
    fn test_uninstalls_installed_package() {
        let h = default_harness();
        let result = run(&h, &packages(&["somepkg"]), &MemoryBinFs::default(), "pip*");

        assert!(result.is_ok(), "got: {:?}", result);
        assert_eq!(
            h.python.invocations(),
            vec![
                args(&["-m", "pip", "--version"]),
                args(&["-m", "pip", "show", "-q", "somepkg"]),
                args(&["-m", "pip", "uninstall", "-y", "somepkg"]),
            ]
        );
    }

    #[test]
    fn test_skips_missing_package() {
        let python = FakeExecutable::with_stub(|args| {
            if args[2] == "show" {
                Err(process_failure("pip package not found"))
            } else {
                Ok(())
            }
        });
        let h = harness(python, FakeExecutableDeleter::new());
        let result = run(&h, &packages(&["missingpkg"]), &MemoryBinFs::default(), "pip*");

        assert!(result.is_ok());
        assert_eq!(
            h.python.invocations(),
            vec![
                args(&["-m", "pip", "--version"]),
                args(&["-m", "pip", "show", "-q", "missingpkg"]),
            ]
        );
    }

    #[test]
    fn test_packages_processed_in_order() {
        let python = FakeExecutable::with_stub(|args| {
            if args[2] == "show" && args[4] == "absent" {
                Err(process_failure("not found"))
            } else {
                Ok(())
            }
        });
        let h = harness(python, FakeExecutableDeleter::new());
        let result = run(
            &h,
            &packages(&["setuptools", "absent", "wheel"]),
            &MemoryBinFs::default(),
            "pip*",
        );

        assert!(result.is_ok());
        assert_eq!(
            h.python.invocations(),
            vec![
                args(&["-m", "pip", "--version"]),
                args(&["-m", "pip", "show", "-q", "setuptools"]),
                args(&["-m", "pip", "uninstall", "-y", "setuptools"]),
                args(&["-m", "pip", "show", "-q", "absent"]),
                args(&["-m", "pip", "show", "-q", "wheel"]),
                args(&["-m", "pip", "uninstall", "-y", "wheel"]),
            ]
        );
    }

    #[test]
    fn test_empty_package_list_skips_pip() {
        let files = FakeExecutableDeleter::failing_probe();
        let h = harness(FakeExecutable::new(), files);
        let result = run(&h, &[], &MemoryBinFs::new(["pip"]), "pip*");

        assert!(result.is_ok());
        assert_eq!(h.python.call_count(), 0);
        assert_eq!(h.files.probe_count(), 1);
        assert_eq!(h.files.deleted(), vec![PathBuf::from(LAYER).join("bin").join("pip")]);
    }

    #[test]
    fn test_working_executables_are_kept() {
        let h = default_harness();
        let result = run(&h, &[], &MemoryBinFs::new(["pip3", "some-dir/pip"]), "pip*");

        assert!(result.is_ok());
        assert_eq!(h.python.call_count(), 0);
        assert_eq!(h.files.probe_invocations(), vec![args(&["--version"])]);
        assert!(h.files.deleted().is_empty());
    }

    #[test]
    fn test_broken_executables_are_deleted() {
        let h = harness(FakeExecutable::new(), FakeExecutableDeleter::failing_probe());
        let result = run(&h, &[], &MemoryBinFs::new(["pip3", "some-dir/pip"]), "pip*");

        assert!(result.is_ok());
        assert_eq!(h.python.call_count(), 0);
        assert_eq!(
            h.files.executable_paths(),
            vec![PathBuf::from("/layers/cpython/bin/pip3")]
        );
        assert_eq!(h.files.probe_invocations(), vec![args(&["--version"])]);
        assert_eq!(
            h.files.deleted(),
            vec![PathBuf::from("/layers/cpython/bin/pip3")]
        );
    }

    #[test]
    fn test_only_failing_probes_trigger_deletion() {
        let files = FakeExecutableDeleter::with_probe_stub(|path| {
            if path.ends_with("pip3") {
                Err(process_failure("bad pip executable"))
            } else {
                Ok(())
            }
        });
        let h = harness(FakeExecutable::new(), files);
        let result = run(&h, &[], &MemoryBinFs::new(["pip", "pip3", "pip3.12"]), "pip*");

        assert!(result.is_ok());
        assert_eq!(h.files.probe_count(), 3);
        assert_eq!(
            h.files.deleted(),
            vec![PathBuf::from("/layers/cpython/bin/pip3")]
        );
    }

    #[test]
    fn test_no_matching_executables() {
        let h = default_harness();
        let result = run(
            &h,
            &[],
            &MemoryBinFs::new(["some-binary", "another-binary"]),
            "pip*",
        );

        assert!(result.is_ok());
        assert_eq!(h.python.call_count(), 0);
        assert_eq!(h.files.probe_count(), 0);
        assert!(h.files.deleted().is_empty());
    }

    #[test]
    fn test_pip_version_failure_aborts() {
        let python = FakeExecutable::with_stub(|_| Err(process_failure("pip is broken")));
        let files = FakeExecutableDeleter::failing_probe();
        let h = harness(python, files);
        let result = run(&h, &packages(&["somepkg"]), &MemoryBinFs::new(["pip"]), "pip*");

        let err = result.unwrap_err();
        assert!(matches!(err, CleanupError::ManagerUnusable { .. }));
        assert!(err.to_string().contains("pip is broken"));
        assert_eq!(h.python.invocations(), vec![args(&["-m", "pip", "--version"])]);
        assert_eq!(h.files.probe_count(), 0);
        assert!(h.files.deleted().is_empty());
    }

    #[test]
    fn test_uninstall_failure_aborts_remaining_packages() {
        let python = FakeExecutable::with_stub(|args| {
            if args[2] == "uninstall" {
                Err(process_failure("failed to uninstall pip package"))
            } else {
                Ok(())
            }
        });
        let h = harness(python, FakeExecutableDeleter::failing_probe());
        let result = run(
            &h,
            &packages(&["somepkg", "otherpkg"]),
            &MemoryBinFs::new(["pip"]),
            "pip*",
        );

        let err = result.unwrap_err();
        assert!(matches!(err, CleanupError::UninstallFailed { .. }));
        assert!(err.to_string().contains("failed to uninstall pip package"));
        assert_eq!(
            h.python.invocations(),
            vec![
                args(&["-m", "pip", "--version"]),
                args(&["-m", "pip", "show", "-q", "somepkg"]),
                args(&["-m", "pip", "uninstall", "-y", "somepkg"]),
            ]
        );
        assert_eq!(h.files.probe_count(), 0);
    }

    #[test]
    fn test_delete_failure_aborts_sweep() {
        let files = FakeExecutableDeleter::failing_probe().with_delete_stub(|_| {
            Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "failed to delete file",
            ))
        });
        let h = harness(FakeExecutable::new(), files);
        let result = run(&h, &[], &MemoryBinFs::new(["pip", "pip3"]), "pip*");

        let err = result.unwrap_err();
        assert!(matches!(err, CleanupError::DeleteFailed { .. }));
        assert_eq!(err.to_string(), "failed to delete file");
        assert_eq!(h.python.call_count(), 0);
        assert_eq!(h.files.probe_count(), 1);
        assert_eq!(
            h.files.delete_attempts(),
            vec![PathBuf::from("/layers/cpython/bin/pip")]
        );
    }

    #[test]
    fn test_invalid_pattern_fails_before_any_execution() {
        let h = default_harness();
        let result = run(&h, &[], &MemoryBinFs::new(["pip"]), "[");

        let err = result.unwrap_err();
        assert!(matches!(err, CleanupError::InvalidPattern { .. }));
        assert_eq!(h.python.call_count(), 0);
        assert_eq!(h.files.probe_count(), 0);
        assert!(h.files.delete_attempts().is_empty());
    }

    #[test]
    fn test_environment_points_at_layer() {
        let h = harness(FakeExecutable::new(), FakeExecutableDeleter::failing_probe());
        let base = Environment::new(vec![("HOME".to_string(), "/home/cnb".to_string())]);
        let result = h.cleanup.cleanup_with_env(
            &packages(&["somepkg"]),
            Path::new(LAYER),
            &MemoryBinFs::new(["pip"]),
            "pip*",
            &base,
        );

        assert!(result.is_ok());
        for env in h.python.environments().iter().chain(h.files.probe_environments().iter()) {
            assert_eq!(env.get("HOME"), Some(OsStr::new("/home/cnb")));
            assert_eq!(env.get("PATH"), Some(OsStr::new("/layers/cpython/bin")));
            assert_eq!(env.get("LD_LIBRARY_PATH"), Some(OsStr::new("/layers/cpython/lib")));
        }
        assert_eq!(h.python.environments().len(), 3);
        assert_eq!(h.files.probe_environments().len(), 1);
    }

    #[test]
    fn test_cleanup_trait_uses_ambient_environment() {
        let h = default_harness();
        let cleanup: &dyn PythonPipCleanup = &h.cleanup;
        let result = cleanup.cleanup(
            &packages(&["somepkg"]),
            Path::new(LAYER),
            &MemoryBinFs::default(),
            "pip*",
        );

        assert!(result.is_ok());
        let envs = h.python.environments();
        let path = envs[0].get("PATH").unwrap().to_string_lossy();
        assert!(path.starts_with("/layers/cpython/bin"));
    }

    #[cfg(unix)]
    #[test]
    fn test_sweep_on_real_layer_deletes_only_broken_top_level_shims() {
        use crate::binfs::DirBinFs;
        use crate::cleanup::SystemExecutableDeleter;
        use std::os::unix::fs::symlink;

        let dir = tempfile::TempDir::new().unwrap();
        let paths = LayerPaths::new(dir.path());
        let bin = paths.bin_dir();
        std::fs::create_dir_all(bin.join("some-dir")).unwrap();
        symlink(dir.path().join("python-gone"), bin.join("pip")).unwrap();
        symlink("/bin/true", bin.join("pip3")).unwrap();
        symlink(dir.path().join("python-gone"), bin.join("some-dir").join("pip")).unwrap();

        let python = FakeExecutable::new();
        let cleanup = PipCleanup::new(
            Box::new(python.clone()),
            Box::new(SystemExecutableDeleter),
            Box::new(SystemExecutableDeleter),
        );
        let result = cleanup.cleanup_with_env(
            &[],
            dir.path(),
            &DirBinFs::new(&bin),
            "pip*",
            &Environment::new([("PATH", "/usr/bin:/bin")]),
        );

        assert!(result.is_ok(), "got: {:?}", result);
        assert!(bin.join("pip").symlink_metadata().is_err());
        assert!(bin.join("pip3").symlink_metadata().is_ok());
        assert!(bin.join("some-dir").join("pip").symlink_metadata().is_ok());
        assert_eq!(python.call_count(), 0);
    }
}
