use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chainprobe::errors::{Diagnostics, HarnessError, Result};
use chainprobe::exec::{CommandExecutor, CommandInvocation, ExecOutput};
use chainprobe::types::BoxFuture;

/// One canned reaction of the [`ScriptedExecutor`].
#[derive(Debug, Clone)]
pub enum Scripted {
    /// The command ran and produced this output.
    Output(ExecOutput),
    /// The command could not be started.
    LaunchFailure(String),
    /// The command hit its deadline after printing `partial`.
    Timeout(Diagnostics),
    /// Sleep (tokio time) before reacting.
    Delayed(Duration, Box<Scripted>),
}

impl Scripted {
    /// Exit 0 with the given stdout.
    pub fn stdout(stdout: impl Into<Vec<u8>>) -> Self {
        Scripted::Output(ExecOutput::new(stdout, Vec::new(), Some(0)))
    }

    /// Exit 0 with the given stderr.
    pub fn stderr(stderr: impl Into<Vec<u8>>) -> Self {
        Scripted::Output(ExecOutput::new(Vec::new(), stderr, Some(0)))
    }

    pub fn exit(code: i32, stdout: impl Into<Vec<u8>>, stderr: impl Into<Vec<u8>>) -> Self {
        Scripted::Output(ExecOutput::new(stdout, stderr, Some(code)))
    }

    pub fn delayed(self, delay: Duration) -> Self {
        Scripted::Delayed(delay, Box::new(self))
    }
}

/// A fake [`CommandExecutor`] that:
/// - records every invocation it receives, in order
/// - answers each one with the next scripted reaction
/// - falls back to a fixed reaction (or a launch failure) once the script
///   runs out.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    script: Mutex<VecDeque<Scripted>>,
    fallback: Mutex<Option<Scripted>>,
    invocations: Mutex<Vec<CommandInvocation>>,
}

impl ScriptedExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_script(script: impl IntoIterator<Item = Scripted>) -> Arc<Self> {
        let exec = Self::default();
        exec.script.lock().unwrap().extend(script);
        Arc::new(exec)
    }

    pub fn push(&self, reaction: Scripted) {
        self.script.lock().unwrap().push_back(reaction);
    }

    /// Reaction used for every call once the script is exhausted.
    pub fn set_fallback(&self, reaction: Scripted) {
        *self.fallback.lock().unwrap() = Some(reaction);
    }

    pub fn invocations(&self) -> Vec<CommandInvocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.invocations.lock().unwrap().len()
    }

    fn next_reaction(&self) -> Option<Scripted> {
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return Some(next);
        }
        self.fallback.lock().unwrap().clone()
    }
}

async fn react(invocation: &CommandInvocation, reaction: Scripted) -> Result<ExecOutput> {
    let mut reaction = reaction;
    while let Scripted::Delayed(delay, inner) = reaction {
        tokio::time::sleep(delay).await;
        reaction = *inner;
    }

    match reaction {
        Scripted::Output(output) => Ok(output),
        Scripted::LaunchFailure(reason) => Err(HarnessError::LaunchFailure {
            sandbox: invocation.sandbox.to_string(),
            command: invocation.command_line(),
            reason,
        }),
        Scripted::Timeout(partial) => Err(HarnessError::Timeout {
            command: invocation.command_line(),
            deadline: invocation.deadline,
            partial,
        }),
        Scripted::Delayed(..) => unreachable!("delays are unwrapped above"),
    }
}

impl CommandExecutor for ScriptedExecutor {
    fn execute(&self, invocation: CommandInvocation) -> BoxFuture<'_, Result<ExecOutput>> {
        self.invocations.lock().unwrap().push(invocation.clone());
        let reaction = self
            .next_reaction()
            .unwrap_or_else(|| Scripted::LaunchFailure("no scripted reaction left".to_string()));

        Box::pin(async move { react(&invocation, reaction).await })
    }
}
