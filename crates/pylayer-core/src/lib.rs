//! Post-install hygiene for Python runtime layers.
//!
//! [`cleanup::PipCleanup`] uninstalls build-time-only packages through pip and
//! sweeps `<layer>/bin` for executables that no longer run. Process spawning,
//! probing and deletion sit behind traits so the pipeline can be driven by
//! recording doubles in tests (see the `testing` feature).

pub mod binfs;
pub mod cleanup;
pub mod env;
pub mod errors;
pub mod layer;
pub mod logging;
pub mod process;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use errors::{PylayerError, PylayerResult};
pub use layer::LayerPaths;
pub use logging::init_logging;
