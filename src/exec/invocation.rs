// src/exec/invocation.rs

use std::fmt;
use std::time::Duration;

use crate::errors::Diagnostics;

/// Default deadline for a single command (one minute, like every step of the
/// end-to-end suite).
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

/// Identity of the sandbox a command runs in (a container id or name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SandboxId(String);

impl SandboxId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SandboxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One command to run inside one sandbox.
///
/// Built per call; the only reuse is the submitter re-issuing the same
/// command while waiting for acceptance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub sandbox: SandboxId,
    pub program: String,
    pub args: Vec<String>,
    pub deadline: Duration,
}

impl CommandInvocation {
    pub fn new(sandbox: SandboxId, program: impl Into<String>) -> Self {
        Self {
            sandbox,
            program: program.into(),
            args: Vec::new(),
            deadline: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Program and arguments joined by spaces, for logs and error messages.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Output of a command that ran to completion.
///
/// A non-zero `exit_code` is not an executor error: callers decide what the
/// exit code means for their operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: Option<i32>,
}

impl ExecOutput {
    pub fn new(stdout: impl Into<Vec<u8>>, stderr: impl Into<Vec<u8>>, exit_code: Option<i32>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics::new(self.stdout.clone(), self.stderr.clone())
    }
}
