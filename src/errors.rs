// src/errors.rs

//! Crate-wide error type and helpers.
//!
//! Every variant that follows a command execution carries the captured
//! process output ([`Diagnostics`]) so a failed scenario can be diagnosed
//! from the error alone.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Captured stdout/stderr of a command, attached to errors for diagnosis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl Diagnostics {
    pub fn new(stdout: impl Into<Vec<u8>>, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty() && self.stderr.is_empty()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stdout: {}, stderr: {}",
            self.stdout_lossy().trim_end(),
            self.stderr_lossy().trim_end()
        )
    }
}

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("failed to launch `{command}` in sandbox {sandbox}: {reason}")]
    LaunchFailure {
        sandbox: String,
        command: String,
        reason: String,
    },

    #[error("`{command}` did not finish within {deadline:?}; {partial}")]
    Timeout {
        command: String,
        deadline: Duration,
        partial: Diagnostics,
    },

    #[error("malformed tx response from `{command}`: {reason}; stdout: {}", String::from_utf8_lossy(.raw))]
    MalformedResponse {
        command: String,
        reason: String,
        raw: Vec<u8>,
    },

    #[error(
        "tx returned a non-zero code after {attempts} attempt(s) of `{command}` \
         (last code: {last_code:?}, raw log: {raw_log}); {output}"
    )]
    RejectedByNode {
        command: String,
        attempts: u32,
        last_code: Option<u32>,
        raw_log: String,
        output: Diagnostics,
    },

    #[error("tx {txhash} was committed with code {code} (codespace '{codespace}'): {raw_log}")]
    TxExecutionFailed {
        txhash: String,
        code: u32,
        codespace: String,
        raw_log: String,
    },

    #[error("failed to connect chains {chain_a} and {chain_b} via IBC; {output}")]
    LinkFailure {
        chain_a: String,
        chain_b: String,
        output: Diagnostics,
    },

    #[error("no open channel between {src} and {dst}; link the chains before transferring")]
    NotLinked { src: String, dst: String },

    #[error("failed to send IBC tokens from {src} to {dst}: {reason}; {output}")]
    TransferDispatchFailure {
        src: String,
        dst: String,
        reason: String,
        output: Diagnostics,
    },

    #[error("timed out waiting for {what} after {attempts} attempt(s) over {waited:?}")]
    PollTimeout {
        what: String,
        attempts: u32,
        waited: Duration,
    },

    #[error("query against {endpoint} failed: {reason}")]
    Query { endpoint: String, reason: String },

    #[error("entropy source unavailable: {0}")]
    EntropyFailure(String),

    #[error("key derivation failed: {0}")]
    DerivationFailure(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("unknown chain: {0}")]
    UnknownChain(String),

    #[error("chain {chain} has no validator at index {index}")]
    NoSuchValidator { chain: String, index: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HarnessError {
    /// True for both the executor's deadline expiry and the poller's.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            HarnessError::Timeout { .. } | HarnessError::PollTimeout { .. }
        )
    }

    /// Captured process output attached to this error, if any.
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            HarnessError::Timeout { partial, .. } => Some(partial),
            HarnessError::RejectedByNode { output, .. }
            | HarnessError::LinkFailure { output, .. }
            | HarnessError::TransferDispatchFailure { output, .. } => Some(output),
            _ => None,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, HarnessError>;
