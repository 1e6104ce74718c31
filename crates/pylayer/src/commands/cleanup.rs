use std::path::PathBuf;

use clap::ArgMatches;
use tracing::{debug, error, info};

use pylayer_config::{CleanupConfig, load_config};
use pylayer_core::PylayerError;
use pylayer_core::binfs::DirBinFs;
use pylayer_core::cleanup::{CleanupError, PipCleanup, PythonPipCleanup, SystemExecutableDeleter};
use pylayer_core::layer::LayerPaths;
use pylayer_core::process::ProcessExecutable;

pub(crate) fn handle_cleanup_command(
    sub_matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let layer = sub_matches
        .get_one::<PathBuf>("layer")
        .ok_or("--layer is required")?;
    let config_path = sub_matches.get_one::<PathBuf>("config");
    let packages: Vec<String> = sub_matches
        .get_many::<String>("package")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    info!(
        event = "cli.cleanup_started",
        layer = %layer.display(),
        config = ?config_path
    );

    let config = match load_config(config_path.map(PathBuf::as_path)) {
        Ok(config) => config.with_overrides(
            &packages,
            sub_matches.get_one::<String>("pattern").map(String::as_str),
            sub_matches.get_one::<String>("python").map(String::as_str),
        ),
        Err(e) => {
            eprintln!("{}", e);
            error!(
                event = "cli.cleanup_config_failed",
                error = %e,
                error_code = e.error_code()
            );
            return Err(e.into());
        }
    };
    config.validate()?;

    let paths = LayerPaths::new(layer);
    let python = resolve_python(&config.python, &paths);
    let cleanup = PipCleanup::new(
        Box::new(ProcessExecutable::new(python)),
        Box::new(SystemExecutableDeleter),
        Box::new(SystemExecutableDeleter),
    );

    run_cleanup(&cleanup, &config, &paths)?;
    Ok(())
}

/// Run one cleanup of `paths` with the given settings and report the outcome.
pub(crate) fn run_cleanup(
    cleanup: &dyn PythonPipCleanup,
    config: &CleanupConfig,
    paths: &LayerPaths,
) -> Result<(), CleanupError> {
    let bin_fs = DirBinFs::new(paths.bin_dir());

    match cleanup.cleanup(&config.packages, paths.root(), &bin_fs, &config.pattern) {
        Ok(()) => {
            println!("Layer cleanup complete: {}", paths.root().display());
            info!(
                event = "cli.cleanup_completed",
                layer = %paths.root().display()
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e);
            error!(
                event = "cli.cleanup_failed",
                error = %e,
                error_code = e.error_code()
            );
            Err(e)
        }
    }
}

/// Prefer the interpreter inside the layer; otherwise leave the bare name to
/// be resolved through the child's `PATH`.
fn resolve_python(name: &str, paths: &LayerPaths) -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| paths.root().to_path_buf());

    match which::which_in(name, Some(paths.bin_dir()), cwd) {
        Ok(path) => {
            debug!(event = "cli.python_resolved", python = %path.display());
            path
        }
        Err(e) => {
            debug!(
                event = "cli.python_not_in_layer",
                python = name,
                error = %e
            );
            PathBuf::from(name)
        }
    }
}
