// src/config/validate.rs

use std::time::Duration;

use crate::config::duration::parse_duration;
use crate::config::model::{
    ConfigFile, HarnessSettings, PollSection, RawConfigFile, RelayerConfig,
};
use crate::errors::{HarnessError, Result};
use crate::ibc::RelayerSettings;
use crate::poll::PollPolicy;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = HarnessError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_chains(&raw)?;
        validate_chains(&raw)?;
        ensure_relayer(&raw)?;

        let command_timeout = duration_field("harness.command_timeout", &raw.harness.command_timeout)?;
        if command_timeout.is_zero() {
            return Err(HarnessError::ConfigError(
                "[harness].command_timeout must be positive".to_string(),
            ));
        }

        let (accept, commit) = poll_policies(&raw.poll)?;

        let harness = HarnessSettings {
            node_binary: raw.harness.node_binary,
            keyring_backend: raw.harness.keyring_backend,
            command_timeout,
            executor: raw.harness.executor,
            address_prefix: raw.harness.address_prefix,
        };

        let relayer = raw.relayer.map(|r| RelayerConfig {
            sandbox: r.sandbox,
            settings: RelayerSettings {
                binary: r.binary,
                port: r.port,
                timeout_height_offset: r.timeout_height_offset,
            },
        });

        Ok(ConfigFile {
            harness,
            accept,
            commit,
            relayer,
            chains: raw.chain,
        })
    }
}

fn ensure_has_chains(cfg: &RawConfigFile) -> Result<()> {
    if cfg.chain.is_empty() {
        return Err(HarnessError::ConfigError(
            "config must contain at least one [chain.<id>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_chains(cfg: &RawConfigFile) -> Result<()> {
    for (id, chain) in cfg.chain.iter() {
        if chain.validators.is_empty() {
            return Err(HarnessError::ConfigError(format!(
                "chain '{}' must list at least one validator",
                id
            )));
        }
        for (idx, val) in chain.validators.iter().enumerate() {
            if val.sandbox.trim().is_empty() {
                return Err(HarnessError::ConfigError(format!(
                    "chain '{}' validator {} has an empty sandbox",
                    id, idx
                )));
            }
            if !(val.endpoint.starts_with("http://") || val.endpoint.starts_with("https://")) {
                return Err(HarnessError::ConfigError(format!(
                    "chain '{}' validator {} endpoint '{}' must start with http:// or https://",
                    id, idx, val.endpoint
                )));
            }
        }
    }
    Ok(())
}

fn ensure_relayer(cfg: &RawConfigFile) -> Result<()> {
    if cfg.chain.len() > 1 && cfg.relayer.is_none() {
        return Err(HarnessError::ConfigError(
            "a [relayer] section is required when more than one chain is configured".to_string(),
        ));
    }
    if let Some(ref relayer) = cfg.relayer {
        if relayer.sandbox.trim().is_empty() {
            return Err(HarnessError::ConfigError(
                "[relayer].sandbox must not be empty".to_string(),
            ));
        }
    }
    Ok(())
}

fn poll_policies(poll: &PollSection) -> Result<(PollPolicy, PollPolicy)> {
    let accept = policy(
        "accept",
        duration_field("poll.accept_interval", &poll.accept_interval)?,
        duration_field("poll.accept_timeout", &poll.accept_timeout)?,
    )?;
    let commit = policy(
        "commit",
        duration_field("poll.commit_interval", &poll.commit_interval)?,
        duration_field("poll.commit_timeout", &poll.commit_timeout)?,
    )?;
    Ok((accept, commit))
}

fn policy(name: &str, interval: Duration, timeout: Duration) -> Result<PollPolicy> {
    if interval.is_zero() {
        return Err(HarnessError::ConfigError(format!(
            "[poll].{name}_interval must be positive"
        )));
    }
    if interval >= timeout {
        return Err(HarnessError::ConfigError(format!(
            "[poll].{name}_interval ({interval:?}) must be shorter than {name}_timeout ({timeout:?})"
        )));
    }
    Ok(PollPolicy::new(interval, timeout))
}

fn duration_field(field: &str, value: &str) -> Result<Duration> {
    parse_duration(value)
        .map_err(|e| HarnessError::ConfigError(format!("[{field}] = \"{value}\": {e}")))
}
