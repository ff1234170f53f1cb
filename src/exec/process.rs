// src/exec/process.rs

//! Single command process runner with output capture and a deadline.

use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, warn};

use crate::errors::{Diagnostics, HarnessError, Result};
use crate::exec::invocation::{CommandInvocation, ExecOutput};

type SharedBuf = Arc<Mutex<Vec<u8>>>;

/// Spawn `cmd`, capture stdout/stderr and wait for it within the deadline of
/// `invocation`.
///
/// - Spawn failure is a `LaunchFailure` with no output.
/// - Deadline expiry is a `Timeout` carrying whatever stdout/stderr had been
///   read so far. The local child is killed; for `docker exec` this only stops
///   the client, the command inside the container runs on.
/// - Otherwise the exit code is reported as-is in [`ExecOutput`].
pub async fn run_captured(mut cmd: Command, invocation: &CommandInvocation) -> Result<ExecOutput> {
    let command_line = invocation.command_line();

    if invocation.deadline.is_zero() {
        return Err(HarnessError::LaunchFailure {
            sandbox: invocation.sandbox.to_string(),
            command: command_line,
            reason: "deadline must be a positive duration".to_string(),
        });
    }

    info!(
        sandbox = %invocation.sandbox,
        cmd = %command_line,
        deadline = ?invocation.deadline,
        "executing command"
    );

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let deadline = Instant::now()
        .checked_add(invocation.deadline)
        .ok_or_else(|| HarnessError::LaunchFailure {
            sandbox: invocation.sandbox.to_string(),
            command: command_line.clone(),
            reason: format!("deadline {:?} is out of range", invocation.deadline),
        })?;

    let mut child = cmd.spawn().map_err(|e| HarnessError::LaunchFailure {
        sandbox: invocation.sandbox.to_string(),
        command: command_line.clone(),
        reason: e.to_string(),
    })?;

    let stdout_buf: SharedBuf = Arc::default();
    let stderr_buf: SharedBuf = Arc::default();

    let readers = [
        child.stdout.take().map(|s| spawn_drain(s, Arc::clone(&stdout_buf))),
        child.stderr.take().map(|s| spawn_drain(s, Arc::clone(&stderr_buf))),
    ];

    // Readers must hit EOF before the output is complete, so both the wait
    // and the drain count against the deadline.
    let finished = timeout_at(deadline, async {
        let status = child.wait().await;
        for reader in readers.into_iter().flatten() {
            let _ = reader.await;
        }
        status
    })
    .await;

    match finished {
        Ok(status) => {
            let status = status.map_err(|e| HarnessError::LaunchFailure {
                sandbox: invocation.sandbox.to_string(),
                command: command_line.clone(),
                reason: format!("waiting for process: {e}"),
            })?;

            let output = ExecOutput {
                stdout: take(&stdout_buf),
                stderr: take(&stderr_buf),
                exit_code: status.code(),
            };

            info!(
                sandbox = %invocation.sandbox,
                exit_code = ?output.exit_code,
                "command exited"
            );
            debug!(out = %output.stdout_lossy(), err = %output.stderr_lossy(), "captured output");

            Ok(output)
        }
        Err(_elapsed) => {
            if let Err(e) = child.start_kill() {
                debug!(error = %e, "child already gone when deadline expired");
            }

            let partial = Diagnostics::new(take(&stdout_buf), take(&stderr_buf));
            warn!(
                sandbox = %invocation.sandbox,
                cmd = %command_line,
                deadline = ?invocation.deadline,
                "command deadline expired"
            );

            Err(HarnessError::Timeout {
                command: command_line,
                deadline: invocation.deadline,
                partial,
            })
        }
    }
}

/// Always consume a pipe so the child never blocks on a full buffer.
fn spawn_drain<R>(mut reader: R, sink: SharedBuf) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut chunk = [0u8; 4096];
        loop {
            match reader.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => lock(&sink).extend_from_slice(&chunk[..n]),
                Err(e) => {
                    debug!(error = %e, "stopped reading command output");
                    break;
                }
            }
        }
    })
}

fn lock(buf: &SharedBuf) -> MutexGuard<'_, Vec<u8>> {
    buf.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn take(buf: &SharedBuf) -> Vec<u8> {
    std::mem::take(&mut *lock(buf))
}
