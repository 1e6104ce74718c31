pub mod errors;
pub mod handler;
mod system;
pub mod traits;

// Public API exports
pub use errors::CleanupError;
pub use handler::PipCleanup;
pub use system::SystemExecutableDeleter;
pub use traits::{ExecutableProber, FileDeleter, PythonPipCleanup};
