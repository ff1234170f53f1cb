// src/harness.rs

//! The explicit per-run context handed to test steps.

use std::sync::Arc;
use std::time::Duration;

use crate::config::ConfigFile;
use crate::errors::{HarnessError, Result};
use crate::exec::CommandExecutor;
use crate::ibc::{IbcCoordinator, RelayerSettings};
use crate::network::Network;
use crate::query::NodeQuery;
use crate::tx::{SubmitSettings, TxSubmitter};

/// Chains, submitter and coordinator for one test run.
///
/// Shared read-only across concurrent steps; the only interior mutability
/// is the coordinator's record of linked chain pairs.
#[derive(Debug)]
pub struct Harness {
    network: Network,
    submitter: TxSubmitter,
    coordinator: Option<IbcCoordinator>,
}

impl Harness {
    pub fn new(
        network: Network,
        executor: Arc<dyn CommandExecutor>,
        query: Arc<dyn NodeQuery>,
        submit: SubmitSettings,
        relayer: RelayerSettings,
    ) -> Self {
        let command_timeout = submit.command_timeout;
        let coordinator = network.relayer().map(|sandbox| {
            IbcCoordinator::new(
                Arc::clone(&executor),
                Arc::clone(&query),
                sandbox.clone(),
                relayer,
                command_timeout,
            )
        });
        let submitter = TxSubmitter::new(executor, query, submit);

        Self {
            network,
            submitter,
            coordinator,
        }
    }

    /// Build the harness for a validated config.
    pub fn from_config(
        cfg: &ConfigFile,
        executor: Arc<dyn CommandExecutor>,
        query: Arc<dyn NodeQuery>,
    ) -> Self {
        let submit = SubmitSettings {
            node_binary: cfg.harness.node_binary.clone(),
            keyring_backend: cfg.harness.keyring_backend.clone(),
            command_timeout: cfg.harness.command_timeout,
            accept: cfg.accept,
            commit: cfg.commit,
        };
        let relayer = cfg
            .relayer
            .as_ref()
            .map(|r| r.settings.clone())
            .unwrap_or_default();

        Self::new(
            Network::from_config(cfg),
            executor,
            query,
            submit,
            relayer,
        )
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn submitter(&self) -> &TxSubmitter {
        &self.submitter
    }

    pub fn coordinator(&self) -> Result<&IbcCoordinator> {
        self.coordinator.as_ref().ok_or_else(|| {
            HarnessError::ConfigError("no [relayer] configured; IBC steps are unavailable".to_string())
        })
    }

    pub fn command_timeout(&self) -> Duration {
        self.submitter.settings().command_timeout
    }
}
