// src/exec/mod.rs

//! Command execution layer.
//!
//! Everything the harness does against a node or the relayer goes through a
//! [`CommandExecutor`]: a [`CommandInvocation`] goes in, captured output (or a
//! typed failure) comes out.
//!
//! - [`invocation`] defines the invocation value object and its output.
//! - [`process`] spawns a `tokio::process::Command`, drains stdout/stderr and
//!   enforces the invocation deadline.
//! - [`backend`] provides the `CommandExecutor` trait plus the `docker exec`
//!   and host-local implementations. Tests swap in a scripted fake.

pub mod backend;
pub mod invocation;
pub mod process;

pub use backend::{CommandExecutor, DockerExecutor, LocalExecutor, executor_for};
pub use invocation::{CommandInvocation, ExecOutput, SandboxId};
