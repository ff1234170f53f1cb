// src/ibc/coordinator.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::errors::{Diagnostics, HarnessError, Result};
use crate::exec::{CommandExecutor, CommandInvocation, ExecOutput, SandboxId};
use crate::network::Chain;
use crate::poll::{PollPolicy, PollReport};
use crate::query::{NodeQuery, amount_of};
use crate::types::Coin;

use super::relayer::{DEFAULT_CHANNEL, RelayerSettings, channel_opened, parse_channel_ends};

/// Proof that a channel between two chains was opened by this coordinator
/// (or registered as pre-existing).
///
/// Each end has its own channel id; a transfer leaves through the id of its
/// source chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelLink {
    pub chain_a: String,
    pub channel_a: String,
    pub chain_b: String,
    pub channel_b: String,
}

impl ChannelLink {
    /// Channel id on `chain`'s end of the link.
    pub fn channel_on(&self, chain: &str) -> Option<&str> {
        if chain == self.chain_a {
            Some(&self.channel_a)
        } else if chain == self.chain_b {
            Some(&self.channel_b)
        } else {
            None
        }
    }
}

/// Unordered chain pair, so a link serves transfers in both directions.
fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Links chains through the relayer and moves tokens between them.
///
/// `link_chains` must succeed for a pair before `transfer` is attempted on
/// it; `transfer` on an unlinked pair returns `NotLinked` without touching
/// the relayer.
pub struct IbcCoordinator {
    executor: Arc<dyn CommandExecutor>,
    query: Arc<dyn NodeQuery>,
    relayer_sandbox: SandboxId,
    settings: RelayerSettings,
    command_timeout: Duration,
    links: Mutex<HashMap<(String, String), ChannelLink>>,
}

impl IbcCoordinator {
    pub fn new(
        executor: Arc<dyn CommandExecutor>,
        query: Arc<dyn NodeQuery>,
        relayer_sandbox: SandboxId,
        settings: RelayerSettings,
        command_timeout: Duration,
    ) -> Self {
        Self {
            executor,
            query,
            relayer_sandbox,
            settings,
            command_timeout,
            links: Mutex::new(HashMap::new()),
        }
    }

    fn links(&self) -> MutexGuard<'_, HashMap<(String, String), ChannelLink>> {
        self.links.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Open a transfer channel between `chain_a` and `chain_b`.
    ///
    /// Execution errors (launch failure, timeout) propagate as-is. A command
    /// that ran but did not print the success marker on stderr is a
    /// `LinkFailure`, even with exit code 0.
    pub async fn link_chains(&self, chain_a: &Chain, chain_b: &Chain) -> Result<ChannelLink> {
        info!(a = %chain_a.id(), b = %chain_b.id(), "connecting chains via IBC");

        let invocation = CommandInvocation::new(self.relayer_sandbox.clone(), &self.settings.binary)
            .args(self.settings.create_channel_args(chain_a.id(), chain_b.id()))
            .deadline(self.command_timeout);

        let output = self.executor.execute(invocation).await?;
        let stderr = output.stderr_lossy();

        if !channel_opened(&stderr) {
            warn!(
                a = %chain_a.id(),
                b = %chain_b.id(),
                exit_code = ?output.exit_code,
                "relayer did not report an opened channel"
            );
            return Err(HarnessError::LinkFailure {
                chain_a: chain_a.id().to_string(),
                chain_b: chain_b.id().to_string(),
                output: output.diagnostics(),
            });
        }

        let mut ends = parse_channel_ends(&stderr);
        if ends.a.is_none() && ends.b.is_none() {
            ends = parse_channel_ends(&output.stdout_lossy());
        }
        let channel_a = ends.a.unwrap_or_else(|| {
            debug!(chain = %chain_a.id(), "no channel id in relayer output; assuming {DEFAULT_CHANNEL}");
            DEFAULT_CHANNEL.to_string()
        });
        let channel_b = ends.b.unwrap_or_else(|| {
            debug!(chain = %chain_b.id(), "no channel id in relayer output; assuming {DEFAULT_CHANNEL}");
            DEFAULT_CHANNEL.to_string()
        });

        let link = self.register_link(chain_a.id(), &channel_a, chain_b.id(), &channel_b);
        info!(
            a = %chain_a.id(),
            b = %chain_b.id(),
            %channel_a,
            %channel_b,
            "connected chains via IBC"
        );
        Ok(link)
    }

    /// Record a channel that already exists (e.g. opened by an earlier run).
    pub fn register_link(
        &self,
        chain_a: &str,
        channel_a: &str,
        chain_b: &str,
        channel_b: &str,
    ) -> ChannelLink {
        let link = ChannelLink {
            chain_a: chain_a.to_string(),
            channel_a: channel_a.to_string(),
            chain_b: chain_b.to_string(),
            channel_b: channel_b.to_string(),
        };
        self.links().insert(pair_key(chain_a, chain_b), link.clone());
        link
    }

    pub fn link_between(&self, chain_a: &str, chain_b: &str) -> Option<ChannelLink> {
        self.links().get(&pair_key(chain_a, chain_b)).cloned()
    }

    /// Dispatch a relayer-mediated token transfer from `src` to `dst`.
    ///
    /// Only dispatch is checked: the command must run and exit cleanly.
    /// Receipt on `dst` is the caller's to confirm, see [`Self::await_balance`].
    pub async fn transfer(
        &self,
        src: &Chain,
        dst: &Chain,
        recipient: &str,
        token: &Coin,
    ) -> Result<ExecOutput> {
        let link = self
            .link_between(src.id(), dst.id())
            .ok_or_else(|| HarnessError::NotLinked {
                src: src.id().to_string(),
                dst: dst.id().to_string(),
            })?;
        let src_channel = link.channel_on(src.id()).unwrap_or(DEFAULT_CHANNEL);

        info!(%token, src = %src.id(), dst = %dst.id(), %recipient, "sending IBC tokens");

        let invocation = CommandInvocation::new(self.relayer_sandbox.clone(), &self.settings.binary)
            .args(self.settings.ft_transfer_args(
                src.id(),
                dst.id(),
                src_channel,
                recipient,
                token,
            ))
            .deadline(self.command_timeout);

        let dispatch_err = |reason: String, output: Diagnostics| HarnessError::TransferDispatchFailure {
            src: src.id().to_string(),
            dst: dst.id().to_string(),
            reason,
            output,
        };

        let output = match self.executor.execute(invocation).await {
            Ok(output) => output,
            Err(err) => {
                let output = err.diagnostics().cloned().unwrap_or_default();
                return Err(dispatch_err(err.to_string(), output));
            }
        };

        if !output.success() {
            return Err(dispatch_err(
                format!("relayer exited with {:?}", output.exit_code),
                output.diagnostics(),
            ));
        }

        info!("successfully sent IBC tokens");
        Ok(output)
    }

    /// Poll `address` on validator `node_index` of `chain` until its `denom`
    /// balance satisfies `condition`.
    pub async fn await_balance<F>(
        &self,
        chain: &Chain,
        node_index: usize,
        address: &str,
        denom: &str,
        policy: PollPolicy,
        condition: F,
    ) -> Result<PollReport>
    where
        F: Fn(u128) -> bool + Sync,
    {
        let endpoint = chain.validator(node_index)?.endpoint.as_str();
        let query = self.query.as_ref();
        let condition = &condition;
        let what = format!("{denom} balance of {address} on {}", chain.id());

        policy
            .await_condition(&what, move || async move {
                match query.query_balances(endpoint, address).await {
                    Ok(balances) => {
                        let amount = amount_of(&balances, denom);
                        debug!(%address, denom, %amount, "balance observed");
                        Ok(condition(amount))
                    }
                    Err(err) => {
                        debug!(error = %err, "balance query failed; retrying");
                        Ok(false)
                    }
                }
            })
            .await
    }
}

impl std::fmt::Debug for IbcCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IbcCoordinator")
            .field("relayer_sandbox", &self.relayer_sandbox)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
