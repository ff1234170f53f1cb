// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The submitter and the IBC coordinator talk to a `CommandExecutor` instead
//! of spawning processes themselves. This keeps their contracts independent
//! of how a command reaches its sandbox:
//!
//! - [`DockerExecutor`] runs the command with `docker exec` inside a running
//!   container. This is what the end-to-end suite uses.
//! - [`LocalExecutor`] runs the command directly on the host.
//! - Tests provide a scripted implementation that never spawns anything.

use std::sync::Arc;

use tokio::process::Command;
use tracing::debug;

use crate::errors::{HarnessError, Result};
use crate::types::{BoxFuture, ExecutorKind};

use super::invocation::{CommandInvocation, ExecOutput};
use super::process::run_captured;

/// Trait abstracting how a command reaches its sandbox.
pub trait CommandExecutor: Send + Sync {
    /// Run the invocation to completion or until its deadline.
    ///
    /// Implementations must report:
    /// - `LaunchFailure` when the command could not be started at all,
    /// - `Timeout` (with partial output) when the deadline expired,
    /// - otherwise the captured output, whatever the exit code.
    fn execute(&self, invocation: CommandInvocation) -> BoxFuture<'_, Result<ExecOutput>>;
}

impl<E: CommandExecutor + ?Sized> CommandExecutor for Arc<E> {
    fn execute(&self, invocation: CommandInvocation) -> BoxFuture<'_, Result<ExecOutput>> {
        (**self).execute(invocation)
    }
}

/// Docker CLI exit codes that mean the command never ran
/// (daemon error, cannot invoke, not found).
const DOCKER_LAUNCH_EXIT_CODES: [i32; 3] = [125, 126, 127];

/// Runs commands via `docker exec -u <user> <container> ...`.
#[derive(Debug, Clone)]
pub struct DockerExecutor {
    docker_binary: String,
    user: String,
}

impl DockerExecutor {
    pub fn new() -> Self {
        Self {
            docker_binary: "docker".to_string(),
            user: "root".to_string(),
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.docker_binary = binary.into();
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    fn build_command(&self, invocation: &CommandInvocation) -> Command {
        let mut cmd = Command::new(&self.docker_binary);
        cmd.arg("exec")
            .arg("-u")
            .arg(&self.user)
            .arg(invocation.sandbox.as_str())
            .arg(&invocation.program)
            .args(&invocation.args);
        cmd
    }
}

impl Default for DockerExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExecutor for DockerExecutor {
    fn execute(&self, invocation: CommandInvocation) -> BoxFuture<'_, Result<ExecOutput>> {
        Box::pin(async move {
            let cmd = self.build_command(&invocation);
            let output = run_captured(cmd, &invocation).await?;

            if let Some(reason) = docker_launch_failure(&output) {
                return Err(HarnessError::LaunchFailure {
                    sandbox: invocation.sandbox.to_string(),
                    command: invocation.command_line(),
                    reason,
                });
            }

            Ok(output)
        })
    }
}

/// Distinguish "docker could not run the command" from "the command ran and
/// failed".
fn docker_launch_failure(output: &ExecOutput) -> Option<String> {
    let code = output.exit_code?;
    if code == 0 {
        return None;
    }

    let stderr = output.stderr_lossy();
    // Only the daemon's own errors count; a command may print similar text.
    let daemon_refused = stderr.starts_with("Error response from daemon");

    if DOCKER_LAUNCH_EXIT_CODES.contains(&code) || daemon_refused {
        debug!(exit_code = code, "docker exec did not start the command");
        Some(format!("docker exec exited with {code}: {}", stderr.trim()))
    } else {
        None
    }
}

/// Runs commands directly on the host. The sandbox id is only used for logs.
#[derive(Debug, Clone, Default)]
pub struct LocalExecutor;

impl CommandExecutor for LocalExecutor {
    fn execute(&self, invocation: CommandInvocation) -> BoxFuture<'_, Result<ExecOutput>> {
        Box::pin(async move {
            let mut cmd = Command::new(&invocation.program);
            cmd.args(&invocation.args);
            run_captured(cmd, &invocation).await
        })
    }
}

/// Build the executor selected in config / on the command line.
pub fn executor_for(kind: ExecutorKind) -> Arc<dyn CommandExecutor> {
    match kind {
        ExecutorKind::Docker => Arc::new(DockerExecutor::new()),
        ExecutorKind::Local => Arc::new(LocalExecutor),
    }
}
