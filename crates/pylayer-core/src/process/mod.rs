pub mod errors;
mod executable;
mod output;
pub mod traits;

// Public API exports
pub use errors::ProcessError;
pub use executable::ProcessExecutable;
pub use output::DebugLogWriter;
pub use traits::{Executable, Execution};
