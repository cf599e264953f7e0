//! Process runner: the only place that touches `tokio::process`.
//! Everything above it works against the `ProcessRunner` trait so sessions and
//! chart dispatch can be driven by fakes in tests.

use std::fmt;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncRead;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::error::ProcessError;

/// Program plus its discrete argument vector. Never passed through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInvocation {
    pub program: String,
    pub args: Vec<String>,
}

impl ProcessInvocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for ProcessInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for a in &self.args {
            write!(f, " {a}")?;
        }
        Ok(())
    }
}

/// Handle used to stop a long-running process.
pub trait ProcessHandle: Send {
    /// Ask the process to stop. Best effort; does not wait for exit.
    fn interrupt(&mut self);
}

/// A running live-mode process: its stdout plus a way to stop it.
pub struct LiveProcess {
    pub stdout: Box<dyn AsyncRead + Send + Unpin>,
    pub handle: Box<dyn ProcessHandle>,
}

#[async_trait]
pub trait ProcessRunner: Send + Sync + 'static {
    /// Run to completion and return the whole stdout.
    async fn capture(&self, invocation: &ProcessInvocation) -> Result<Vec<u8>, ProcessError>;

    /// Start a process whose stdout is consumed incrementally.
    fn spawn_live(&self, invocation: &ProcessInvocation) -> Result<LiveProcess, ProcessError>;
}

/// `ProcessRunner` backed by real subprocesses with the inherited environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn capture(&self, invocation: &ProcessInvocation) -> Result<Vec<u8>, ProcessError> {
        debug!(%invocation, "running");
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| ProcessError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProcessError::Exited {
                program: invocation.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(output.stdout)
    }

    fn spawn_live(&self, invocation: &ProcessInvocation) -> Result<LiveProcess, ProcessError> {
        debug!(%invocation, "spawning");
        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        let Some(stdout) = child.stdout.take() else {
            let mut handle = ChildHandle(child);
            handle.interrupt();
            return Err(ProcessError::NoStdout {
                program: invocation.program.clone(),
            });
        };
        Ok(LiveProcess {
            stdout: Box::new(stdout),
            handle: Box::new(ChildHandle(child)),
        })
    }
}

/// Owns the child so tokio can reap it once it exits after the interrupt.
struct ChildHandle(Child);

impl ProcessHandle for ChildHandle {
    #[cfg(unix)]
    fn interrupt(&mut self) {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let Some(pid) = self.0.id() else {
            // already reaped
            return;
        };
        let Ok(raw) = i32::try_from(pid) else {
            return;
        };
        if let Err(e) = kill(Pid::from_raw(raw), Signal::SIGINT) {
            warn!(pid, error = %e, "failed to interrupt child");
        }
    }

    #[cfg(not(unix))]
    fn interrupt(&mut self) {
        if let Err(e) = self.0.start_kill() {
            warn!(error = %e, "failed to kill child");
        }
    }
}
