use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::process::errors::ProcessError;
use crate::process::traits::{Executable, Execution};

const READ_CHUNK: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

/// A program on disk, run through `std::process::Command`.
///
/// The child gets exactly the environment in the [`Execution`]; nothing is
/// inherited from the current process. Output is forwarded to the sinks as it
/// arrives. There is no timeout: a child that never exits blocks the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessExecutable {
    program: PathBuf,
}

impl ProcessExecutable {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

impl Executable for ProcessExecutable {
    fn execute(&self, execution: Execution<'_>) -> Result<(), ProcessError> {
        debug!(
            event = "core.process.execute_started",
            program = %self.program.display(),
            args = ?execution.args
        );

        let mut child = Command::new(&self.program)
            .args(&execution.args)
            .env_clear()
            .envs(execution.env.iter())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ProcessError::SpawnFailed {
                program: self.program_name(),
                source,
            })?;

        let (tx, rx) = mpsc::channel();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(pump(stdout, Stream::Stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(pump(stderr, Stream::Stderr, tx.clone()));
        }
        drop(tx);

        // Keep draining after a sink error so the child never blocks on a
        // full pipe.
        let mut forward_error = None;
        for (stream, chunk) in rx {
            if forward_error.is_some() {
                continue;
            }
            let sink: &mut dyn Write = match stream {
                Stream::Stdout => &mut *execution.stdout,
                Stream::Stderr => &mut *execution.stderr,
            };
            if let Err(e) = sink.write_all(&chunk) {
                forward_error = Some(e);
            }
        }
        for reader in readers {
            let _ = reader.join();
        }
        if forward_error.is_none() {
            forward_error = execution
                .stdout
                .flush()
                .and_then(|_| execution.stderr.flush())
                .err();
        }

        let status = child.wait().map_err(|source| ProcessError::WaitFailed {
            program: self.program_name(),
            source,
        })?;

        if !status.success() {
            debug!(
                event = "core.process.execute_failed",
                program = %self.program.display(),
                code = ?status.code()
            );
            return Err(ProcessError::ExitFailure {
                program: self.program_name(),
                code: status.code(),
            });
        }

        if let Some(source) = forward_error {
            return Err(ProcessError::OutputFailed {
                program: self.program_name(),
                source,
            });
        }

        debug!(
            event = "core.process.execute_completed",
            program = %self.program.display()
        );
        Ok(())
    }
}

/// Read `reader` to EOF on its own thread, sending each chunk tagged with
/// `stream`.
fn pump<R>(mut reader: R, stream: Stream, tx: Sender<(Stream, Vec<u8>)>) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buf = [0u8; READ_CHUNK];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if tx.send((stream, buf[..n].to_vec())).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
    })
}
