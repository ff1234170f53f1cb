// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::ibc::RelayerSettings;
use crate::poll::PollPolicy;
use crate::types::ExecutorKind;

/// Configuration exactly as read from a TOML file, before validation.
///
/// ```toml
/// [harness]
/// node_binary = "gaiad"
/// command_timeout = "60s"
///
/// [poll]
/// commit_timeout = "60s"
///
/// [relayer]
/// sandbox = "hermes-relayer"
///
/// [chain.gaia-a]
/// validators = [{ sandbox = "gaia-a-val0", endpoint = "http://127.0.0.1:1317" }]
/// ```
///
/// All sections except `[chain.<id>]` are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub harness: HarnessSection,

    #[serde(default)]
    pub poll: PollSection,

    #[serde(default)]
    pub relayer: Option<RelayerSection>,

    /// Keys are chain ids.
    #[serde(default)]
    pub chain: BTreeMap<String, ChainConfig>,
}

/// `[harness]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarnessSection {
    pub node_binary: String,
    pub keyring_backend: String,
    /// Duration string, e.g. `"60s"`.
    pub command_timeout: String,
    pub executor: ExecutorKind,
    pub address_prefix: String,
}

impl Default for HarnessSection {
    fn default() -> Self {
        Self {
            node_binary: "gaiad".to_string(),
            keyring_backend: "test".to_string(),
            command_timeout: "60s".to_string(),
            executor: ExecutorKind::default(),
            address_prefix: crate::keys::DEFAULT_ADDRESS_PREFIX.to_string(),
        }
    }
}

/// `[poll]` section. All values are duration strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollSection {
    pub accept_interval: String,
    pub accept_timeout: String,
    pub commit_interval: String,
    pub commit_timeout: String,
}

impl Default for PollSection {
    fn default() -> Self {
        Self {
            accept_interval: "1s".to_string(),
            accept_timeout: "5s".to_string(),
            commit_interval: "5s".to_string(),
            commit_timeout: "60s".to_string(),
        }
    }
}

/// `[relayer]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayerSection {
    /// Container running the relayer.
    pub sandbox: String,

    #[serde(default = "default_relayer_binary")]
    pub binary: String,

    #[serde(default = "default_port")]
    pub port: String,

    #[serde(default = "default_timeout_height_offset")]
    pub timeout_height_offset: u64,
}

fn default_relayer_binary() -> String {
    "hermes".to_string()
}

fn default_port() -> String {
    crate::ibc::relayer::DEFAULT_PORT.to_string()
}

fn default_timeout_height_offset() -> u64 {
    crate::ibc::relayer::DEFAULT_TIMEOUT_HEIGHT_OFFSET
}

/// `[chain.<id>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    #[serde(default)]
    pub validators: Vec<ValidatorConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidatorConfig {
    /// Container running this validator.
    pub sandbox: String,
    /// REST endpoint reachable from the harness.
    pub endpoint: String,
}

/// Validated configuration with parsed durations.
///
/// Only constructed through `TryFrom<RawConfigFile>` (see `validate.rs`).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub harness: HarnessSettings,
    pub accept: PollPolicy,
    pub commit: PollPolicy,
    pub relayer: Option<RelayerConfig>,
    pub chains: BTreeMap<String, ChainConfig>,
}

#[derive(Debug, Clone)]
pub struct HarnessSettings {
    pub node_binary: String,
    pub keyring_backend: String,
    pub command_timeout: Duration,
    pub executor: ExecutorKind,
    pub address_prefix: String,
}

#[derive(Debug, Clone)]
pub struct RelayerConfig {
    pub sandbox: String,
    pub settings: RelayerSettings,
}
