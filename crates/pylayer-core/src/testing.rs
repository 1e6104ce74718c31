//! Recording test doubles for the cleanup collaborators.
//!
//! Every double is cheap to clone and shares its recordings between clones,
//! so a test keeps one handle and boxes another into [`PipCleanup`].
//!
//! [`PipCleanup`]: crate::cleanup::PipCleanup

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::binfs::BinFs;
use crate::cleanup::{CleanupError, ExecutableProber, FileDeleter, PythonPipCleanup};
use crate::env::Environment;
use crate::process::{Executable, Execution, ProcessError};

type ExecuteStub = Arc<dyn Fn(&[String]) -> Result<(), ProcessError> + Send + Sync>;
type ProbeStub = Arc<dyn Fn(&Path) -> Result<(), ProcessError> + Send + Sync>;
type DeleteStub = Arc<dyn Fn(&Path) -> std::io::Result<()> + Send + Sync>;
type CleanupStub = Arc<dyn Fn(&CleanupRequest) -> Result<(), CleanupError> + Send + Sync>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A process failure carrying `message`, for stubs.
pub fn process_failure(message: &str) -> ProcessError {
    ProcessError::SpawnFailed {
        program: "fake".to_string(),
        source: std::io::Error::new(std::io::ErrorKind::Other, message.to_string()),
    }
}

#[derive(Debug, Clone)]
pub struct Invocation {
    pub args: Vec<String>,
    pub env: Environment,
}

#[derive(Default)]
struct ExecutableState {
    invocations: Vec<Invocation>,
    stub: Option<ExecuteStub>,
}

/// [`Executable`] that records every call and succeeds unless stubbed.
#[derive(Clone, Default)]
pub struct FakeExecutable {
    state: Arc<Mutex<ExecutableState>>,
}

impl FakeExecutable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stub<F>(stub: F) -> Self
    where
        F: Fn(&[String]) -> Result<(), ProcessError> + Send + Sync + 'static,
    {
        let fake = Self::new();
        lock(&fake.state).stub = Some(Arc::new(stub));
        fake
    }

    pub fn call_count(&self) -> usize {
        lock(&self.state).invocations.len()
    }

    pub fn invocations(&self) -> Vec<Vec<String>> {
        lock(&self.state)
            .invocations
            .iter()
            .map(|i| i.args.clone())
            .collect()
    }

    pub fn environments(&self) -> Vec<Environment> {
        lock(&self.state)
            .invocations
            .iter()
            .map(|i| i.env.clone())
            .collect()
    }
}

impl Executable for FakeExecutable {
    fn execute(&self, execution: Execution<'_>) -> Result<(), ProcessError> {
        let stub = {
            let mut state = lock(&self.state);
            state.invocations.push(Invocation {
                args: execution.args.clone(),
                env: execution.env.clone(),
            });
            state.stub.clone()
        };
        match stub {
            Some(stub) => stub(execution.args.as_slice()),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
struct DeleterState {
    executable_paths: Vec<PathBuf>,
    probes: Vec<(PathBuf, Invocation)>,
    delete_attempts: Vec<PathBuf>,
    deleted: Vec<PathBuf>,
    probe_stub: Option<ProbeStub>,
    delete_stub: Option<DeleteStub>,
}

/// [`ExecutableProber`] and [`FileDeleter`] in one, recording every path.
///
/// Probes succeed and deletes succeed unless stubbed. Nothing touches the
/// real filesystem.
#[derive(Clone, Default)]
pub struct FakeExecutableDeleter {
    state: Arc<Mutex<DeleterState>>,
}

impl FakeExecutableDeleter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every probe fails, so every match is deleted.
    pub fn failing_probe() -> Self {
        Self::with_probe_stub(|_| Err(process_failure("bad pip executable")))
    }

    pub fn with_probe_stub<F>(stub: F) -> Self
    where
        F: Fn(&Path) -> Result<(), ProcessError> + Send + Sync + 'static,
    {
        let fake = Self::new();
        lock(&fake.state).probe_stub = Some(Arc::new(stub));
        fake
    }

    pub fn with_delete_stub<F>(self, stub: F) -> Self
    where
        F: Fn(&Path) -> std::io::Result<()> + Send + Sync + 'static,
    {
        lock(&self.state).delete_stub = Some(Arc::new(stub));
        self
    }

    pub fn executable_paths(&self) -> Vec<PathBuf> {
        lock(&self.state).executable_paths.clone()
    }

    pub fn probe_count(&self) -> usize {
        lock(&self.state).probes.len()
    }

    pub fn probe_invocations(&self) -> Vec<Vec<String>> {
        lock(&self.state)
            .probes
            .iter()
            .map(|(_, i)| i.args.clone())
            .collect()
    }

    pub fn probe_environments(&self) -> Vec<Environment> {
        lock(&self.state)
            .probes
            .iter()
            .map(|(_, i)| i.env.clone())
            .collect()
    }

    /// Every path passed to `delete`, whether or not it succeeded.
    pub fn delete_attempts(&self) -> Vec<PathBuf> {
        lock(&self.state).delete_attempts.clone()
    }

    pub fn deleted(&self) -> Vec<PathBuf> {
        lock(&self.state).deleted.clone()
    }
}

struct FakeProbe {
    path: PathBuf,
    state: Arc<Mutex<DeleterState>>,
}

impl Executable for FakeProbe {
    fn execute(&self, execution: Execution<'_>) -> Result<(), ProcessError> {
        let stub = {
            let mut state = lock(&self.state);
            state.probes.push((
                self.path.clone(),
                Invocation {
                    args: execution.args.clone(),
                    env: execution.env.clone(),
                },
            ));
            state.probe_stub.clone()
        };
        match stub {
            Some(stub) => stub(&self.path),
            None => Ok(()),
        }
    }
}

impl ExecutableProber for FakeExecutableDeleter {
    fn executable(&self, path: &Path) -> Box<dyn Executable> {
        lock(&self.state).executable_paths.push(path.to_path_buf());
        Box::new(FakeProbe {
            path: path.to_path_buf(),
            state: Arc::clone(&self.state),
        })
    }
}

impl FileDeleter for FakeExecutableDeleter {
    fn delete(&self, path: &Path) -> std::io::Result<()> {
        let stub = {
            let mut state = lock(&self.state);
            state.delete_attempts.push(path.to_path_buf());
            state.delete_stub.clone()
        };
        if let Some(stub) = stub {
            stub(path)?;
        }
        lock(&self.state).deleted.push(path.to_path_buf());
        Ok(())
    }
}

/// Arguments of one [`PythonPipCleanup::cleanup`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupRequest {
    pub packages: Vec<String>,
    pub layer: PathBuf,
    /// Names visible in the bin view at call time (lossy UTF-8), sorted.
    pub bin_entries: Vec<String>,
    pub pattern: String,
}

#[derive(Default)]
struct PipCleanupState {
    requests: Vec<CleanupRequest>,
    stub: Option<CleanupStub>,
}

/// [`PythonPipCleanup`] for callers of the cleanup, such as the CLI.
#[derive(Clone, Default)]
pub struct FakePipCleanup {
    state: Arc<Mutex<PipCleanupState>>,
}

impl FakePipCleanup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stub<F>(stub: F) -> Self
    where
        F: Fn(&CleanupRequest) -> Result<(), CleanupError> + Send + Sync + 'static,
    {
        let fake = Self::new();
        lock(&fake.state).stub = Some(Arc::new(stub));
        fake
    }

    pub fn call_count(&self) -> usize {
        lock(&self.state).requests.len()
    }

    pub fn requests(&self) -> Vec<CleanupRequest> {
        lock(&self.state).requests.clone()
    }
}

impl PythonPipCleanup for FakePipCleanup {
    fn cleanup(
        &self,
        packages: &[String],
        layer: &Path,
        bin_fs: &dyn BinFs,
        pattern: &str,
    ) -> Result<(), CleanupError> {
        let mut bin_entries: Vec<String> = bin_fs
            .entries()
            .map(|entries| {
                entries
                    .into_iter()
                    .map(|e| e.name.to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        bin_entries.sort();

        let request = CleanupRequest {
            packages: packages.to_vec(),
            layer: layer.to_path_buf(),
            bin_entries,
            pattern: pattern.to_string(),
        };

        let stub = {
            let mut state = lock(&self.state);
            state.requests.push(request.clone());
            state.stub.clone()
        };
        match stub {
            Some(stub) => stub(&request),
            None => Ok(()),
        }
    }
}
