// src/network.rs

//! The chains under test and the sandboxes hosting them.
//!
//! A [`Network`] is the explicit fixture passed to every test step: it owns
//! the immutable [`Chain`] descriptions plus the relayer sandbox. Nothing in
//! the harness reaches for global state.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::ConfigFile;
use crate::errors::{HarnessError, Result};
use crate::exec::SandboxId;

/// One validator node: where to run commands and where to query it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorNode {
    pub sandbox: SandboxId,
    /// Base URL of the node's REST endpoint, e.g. `http://127.0.0.1:1317`.
    pub endpoint: String,
}

impl ValidatorNode {
    pub fn new(sandbox: SandboxId, endpoint: impl Into<String>) -> Self {
        Self {
            sandbox,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }
}

/// A chain and its ordered validator set. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    id: String,
    validators: Vec<ValidatorNode>,
}

impl Chain {
    pub fn new(id: impl Into<String>, validators: Vec<ValidatorNode>) -> Self {
        Self {
            id: id.into(),
            validators,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn validators(&self) -> &[ValidatorNode] {
        &self.validators
    }

    pub fn validator(&self, index: usize) -> Result<&ValidatorNode> {
        self.validators
            .get(index)
            .ok_or_else(|| HarnessError::NoSuchValidator {
                chain: self.id.clone(),
                index,
            })
    }
}

/// All chains of a test run plus the relayer sandbox.
#[derive(Debug, Clone, Default)]
pub struct Network {
    chains: BTreeMap<String, Arc<Chain>>,
    relayer: Option<SandboxId>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chain(mut self, chain: Chain) -> Self {
        self.chains.insert(chain.id().to_string(), Arc::new(chain));
        self
    }

    pub fn with_relayer(mut self, sandbox: SandboxId) -> Self {
        self.relayer = Some(sandbox);
        self
    }

    /// Build the network described by a validated config.
    pub fn from_config(cfg: &ConfigFile) -> Self {
        let mut network = Network::new();
        for (id, chain) in cfg.chains.iter() {
            let validators = chain
                .validators
                .iter()
                .map(|v| ValidatorNode::new(SandboxId::new(&v.sandbox), &v.endpoint))
                .collect();
            network = network.with_chain(Chain::new(id.clone(), validators));
        }
        if let Some(ref relayer) = cfg.relayer {
            network = network.with_relayer(SandboxId::new(&relayer.sandbox));
        }
        network
    }

    pub fn chain(&self, id: &str) -> Result<Arc<Chain>> {
        self.chains
            .get(id)
            .cloned()
            .ok_or_else(|| HarnessError::UnknownChain(id.to_string()))
    }

    pub fn chains(&self) -> impl Iterator<Item = &Arc<Chain>> {
        self.chains.values()
    }

    pub fn relayer(&self) -> Option<&SandboxId> {
        self.relayer.as_ref()
    }
}
