#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chainprobe::exec::{CommandExecutor, SandboxId};
use chainprobe::ibc::{IbcCoordinator, RelayerSettings};
use chainprobe::network::{Chain, Network, ValidatorNode};
use chainprobe::poll::PollPolicy;
use chainprobe::query::NodeQuery;
use chainprobe::tx::{SubmitSettings, TxSubmitter};

pub const RELAYER_SANDBOX: &str = "hermes-relayer";

/// Chain `id` with `validators` nodes named `<id>-val<n>`.
pub fn chain(id: &str, validators: usize) -> Chain {
    let nodes = (0..validators)
        .map(|n| {
            ValidatorNode::new(
                SandboxId::new(format!("{id}-val{n}")),
                format!("http://{id}-val{n}.test:1317"),
            )
        })
        .collect();
    Chain::new(id, nodes)
}

/// Two single-validator chains (`gaia-a`, `gaia-b`) and a relayer.
pub fn two_chain_network() -> Network {
    Network::new()
        .with_chain(chain("gaia-a", 1))
        .with_chain(chain("gaia-b", 1))
        .with_relayer(SandboxId::new(RELAYER_SANDBOX))
}

/// JSON the node CLI prints for a broadcast tx.
pub fn tx_json(txhash: &str, code: u32, raw_log: &str) -> String {
    serde_json::json!({
        "height": "0",
        "txhash": txhash,
        "codespace": if code == 0 { "" } else { "sdk" },
        "code": code,
        "data": "",
        "raw_log": raw_log,
        "logs": [],
        "gas_wanted": "0",
        "gas_used": "0",
    })
    .to_string()
}

/// Default production timing.
pub fn default_settings() -> SubmitSettings {
    SubmitSettings::default()
}

/// Millisecond-scale timing for tests that run in real time.
pub fn fast_settings() -> SubmitSettings {
    SubmitSettings {
        accept: PollPolicy::new(Duration::from_millis(10), Duration::from_millis(50)),
        commit: PollPolicy::new(Duration::from_millis(10), Duration::from_millis(100)),
        ..SubmitSettings::default()
    }
}

pub fn submitter(
    executor: Arc<dyn CommandExecutor>,
    query: Arc<dyn NodeQuery>,
    settings: SubmitSettings,
) -> TxSubmitter {
    TxSubmitter::new(executor, query, settings)
}

pub fn coordinator(executor: Arc<dyn CommandExecutor>, query: Arc<dyn NodeQuery>) -> IbcCoordinator {
    IbcCoordinator::new(
        executor,
        query,
        SandboxId::new(RELAYER_SANDBOX),
        RelayerSettings::default(),
        Duration::from_secs(60),
    )
}
