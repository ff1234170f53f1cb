#![allow(dead_code)]

use std::error::Error;
use std::sync::Arc;

pub use chainprobe_test_utils::builders::*;
pub use chainprobe_test_utils::fake_executor::{Scripted, ScriptedExecutor};
pub use chainprobe_test_utils::fake_query::FakeNodeQuery;
pub use chainprobe_test_utils::{init_tracing, with_timeout};

pub type TestResult = Result<(), Box<dyn Error>>;

/// Clone a concrete fake into the trait object the harness takes.
pub fn dyn_exec(exec: &Arc<ScriptedExecutor>) -> Arc<dyn chainprobe::exec::CommandExecutor> {
    exec.clone()
}

pub fn dyn_query(query: &Arc<FakeNodeQuery>) -> Arc<dyn chainprobe::query::NodeQuery> {
    query.clone()
}
