//! Configuration for pylayer cleanups.
//!
//! A cleanup is described by the packages to uninstall, the glob pattern that
//! selects candidate executables in the layer's `bin` directory, and the name
//! of the Python interpreter used to drive pip. Everything has a default, so
//! a config file is optional.

mod errors;
mod loading;
mod types;

pub use errors::ConfigError;
pub use loading::{BP_LOG_LEVEL, load_config};
pub use types::{CleanupConfig, LogLevel};
