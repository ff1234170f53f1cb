// src/tx/submitter.rs

//! Transaction submission against a validator node.
//!
//! "Accepted" and "committed" are two separately observable states:
//!
//! - [`TxSubmitter::submit`] re-issues the command until the node answers
//!   with result code 0 (accepted into the mempool) or the acceptance window
//!   closes;
//! - [`TxSubmitter::confirm_commitment`] polls the node's query endpoint until
//!   the transaction is found by hash.
//!
//! [`TxSubmitter::submit_and_confirm`] composes both for callers that only
//! care about the end state.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::errors::{HarnessError, Result};
use crate::exec::{CommandExecutor, CommandInvocation, ExecOutput};
use crate::network::Chain;
use crate::poll::{PollPolicy, PollReport};
use crate::query::NodeQuery;
use crate::types::{Coin, VoteOption};

use super::operation::{CommonFlags, TxOperation};
use super::response::{TxResponse, decode_tx_response};

/// Settings for building and retrying node commands.
#[derive(Debug, Clone)]
pub struct SubmitSettings {
    pub node_binary: String,
    pub keyring_backend: String,
    pub command_timeout: Duration,
    pub accept: PollPolicy,
    pub commit: PollPolicy,
}

impl Default for SubmitSettings {
    fn default() -> Self {
        Self {
            node_binary: "gaiad".to_string(),
            keyring_backend: "test".to_string(),
            command_timeout: Duration::from_secs(60),
            accept: PollPolicy::acceptance(),
            commit: PollPolicy::commitment(),
        }
    }
}

/// What the last acceptance attempt produced, kept for diagnostics.
#[derive(Debug, Default)]
struct LastAttempt {
    output: Option<ExecOutput>,
    response: Option<TxResponse>,
    error: Option<String>,
}

pub struct TxSubmitter {
    executor: Arc<dyn CommandExecutor>,
    query: Arc<dyn NodeQuery>,
    settings: SubmitSettings,
}

impl TxSubmitter {
    pub fn new(
        executor: Arc<dyn CommandExecutor>,
        query: Arc<dyn NodeQuery>,
        settings: SubmitSettings,
    ) -> Self {
        Self {
            executor,
            query,
            settings,
        }
    }

    pub fn settings(&self) -> &SubmitSettings {
        &self.settings
    }

    /// Build the node command for `operation` against validator `node_index`.
    pub fn invocation(
        &self,
        chain: &Chain,
        node_index: usize,
        operation: &TxOperation,
        fees: &str,
    ) -> Result<CommandInvocation> {
        let node = chain.validator(node_index)?;
        let flags = CommonFlags {
            chain_id: chain.id(),
            keyring_backend: &self.settings.keyring_backend,
        };

        // Each attempt must fit inside the acceptance window.
        let deadline = self.settings.command_timeout.min(self.settings.accept.timeout);

        Ok(CommandInvocation::new(node.sandbox.clone(), &self.settings.node_binary)
            .args(operation.to_args(flags, fees))
            .deadline(deadline))
    }

    /// Submit `operation` and wait until the node accepts it (code 0).
    ///
    /// - stdout that is not a tx response fails immediately with
    ///   `MalformedResponse`;
    /// - a command that cannot be launched fails immediately;
    /// - non-zero codes and attempt timeouts are retried until the acceptance
    ///   window closes, then reported as `RejectedByNode` with the last output.
    pub async fn submit(
        &self,
        chain: &Chain,
        node_index: usize,
        operation: &TxOperation,
        fees: &str,
    ) -> Result<TxResponse> {
        let invocation = self.invocation(chain, node_index, operation, fees)?;
        let command = invocation.command_line();

        info!(
            chain = %chain.id(),
            validator = node_index,
            op = operation.label(),
            "submitting transaction"
        );

        let last = Mutex::new(LastAttempt::default());
        let last_ref = &last;
        let executor = self.executor.as_ref();
        let command_ref = command.as_str();

        let outcome = self
            .settings
            .accept
            .await_condition(operation.label(), move || {
                let invocation = invocation.clone();
                async move {
                    match executor.execute(invocation).await {
                        Ok(output) => {
                            let response = decode_tx_response(&output.stdout).map_err(|e| {
                                HarnessError::MalformedResponse {
                                    command: command_ref.to_string(),
                                    reason: e.to_string(),
                                    raw: output.stdout.clone(),
                                }
                            })?;

                            let accepted = response.is_accepted();
                            if !accepted {
                                warn!(
                                    code = response.code,
                                    raw_log = %response.raw_log,
                                    "tx returned a non-zero code; retrying"
                                );
                            }

                            let mut guard = last_ref.lock().unwrap_or_else(|p| p.into_inner());
                            guard.output = Some(output);
                            guard.response = Some(response);
                            guard.error = None;
                            Ok(accepted)
                        }
                        Err(err @ HarnessError::LaunchFailure { .. }) => Err(err),
                        Err(err) => {
                            warn!(error = %err, "tx attempt failed; retrying");
                            let mut guard = last_ref.lock().unwrap_or_else(|p| p.into_inner());
                            if let Some(partial) = err.diagnostics() {
                                guard.output = Some(ExecOutput::new(
                                    partial.stdout.clone(),
                                    partial.stderr.clone(),
                                    None,
                                ));
                            }
                            guard.error = Some(err.to_string());
                            Ok(false)
                        }
                    }
                }
            })
            .await;

        let last = last.into_inner().unwrap_or_else(|p| p.into_inner());

        match outcome {
            Ok(report) => {
                let response = last.response.ok_or_else(|| {
                    HarnessError::Other(anyhow::anyhow!("accepted tx left no response"))
                })?;
                info!(
                    txhash = %response.txhash,
                    attempts = report.attempts,
                    "transaction accepted by node"
                );
                Ok(response)
            }
            Err(HarnessError::PollTimeout { attempts, .. }) => {
                let output = last
                    .output
                    .as_ref()
                    .map(ExecOutput::diagnostics)
                    .unwrap_or_default();
                let raw_log = match (&last.response, &last.error) {
                    (Some(resp), _) => resp.raw_log.clone(),
                    (None, Some(err)) => err.clone(),
                    (None, None) => String::new(),
                };
                Err(HarnessError::RejectedByNode {
                    command,
                    attempts,
                    last_code: last.response.as_ref().map(|r| r.code),
                    raw_log,
                    output,
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Poll validator `node_index` until `txhash` is found committed.
    ///
    /// A transaction that is found but carries a non-zero code failed
    /// execution; that is permanent and reported as `TxExecutionFailed`.
    pub async fn confirm_commitment(
        &self,
        chain: &Chain,
        node_index: usize,
        txhash: &str,
    ) -> Result<PollReport> {
        let node = chain.validator(node_index)?;
        let endpoint = node.endpoint.as_str();
        let query = self.query.as_ref();
        let last_error = Mutex::new(None::<String>);
        let last_error_ref = &last_error;

        let what = format!("tx {txhash} to be committed on {}", chain.id());
        let result = self
            .settings
            .commit
            .await_condition(&what, move || async move {
                match query.query_tx(endpoint, txhash).await {
                    Ok(resp) if resp.is_accepted() => Ok(true),
                    Ok(resp) => Err(HarnessError::TxExecutionFailed {
                        txhash: resp.txhash,
                        code: resp.code,
                        codespace: resp.codespace,
                        raw_log: resp.raw_log,
                    }),
                    Err(err) => {
                        debug!(error = %err, "tx not found yet");
                        *last_error_ref.lock().unwrap_or_else(|p| p.into_inner()) =
                            Some(err.to_string());
                        Ok(false)
                    }
                }
            })
            .await;

        match result {
            Ok(report) => {
                info!(%txhash, chain = %chain.id(), attempts = report.attempts, "tx committed");
                Ok(report)
            }
            Err(HarnessError::PollTimeout {
                what,
                attempts,
                waited,
            }) => {
                let last = last_error.into_inner().unwrap_or_else(|p| p.into_inner());
                let what = match last {
                    Some(err) => format!("{what} (last query error: {err})"),
                    None => what,
                };
                Err(HarnessError::PollTimeout {
                    what,
                    attempts,
                    waited,
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Submit, wait for acceptance, then wait for commitment.
    pub async fn submit_and_confirm(
        &self,
        chain: &Chain,
        node_index: usize,
        operation: &TxOperation,
        fees: &str,
    ) -> Result<TxResponse> {
        let response = self.submit(chain, node_index, operation, fees).await?;
        self.confirm_commitment(chain, node_index, &response.txhash)
            .await?;
        Ok(response)
    }

    pub async fn send_funds(
        &self,
        chain: &Chain,
        node_index: usize,
        from: &str,
        to: &str,
        amount: &Coin,
        fees: &str,
    ) -> Result<TxResponse> {
        info!(%amount, %from, %to, chain = %chain.id(), "sending tokens");
        let op = TxOperation::BankSend {
            from: from.to_string(),
            to: to.to_string(),
            amount: amount.clone(),
        };
        self.submit(chain, node_index, &op, fees).await
    }

    pub async fn fund_community_pool(
        &self,
        chain: &Chain,
        node_index: usize,
        from: &str,
        amount: &Coin,
        fees: &str,
    ) -> Result<TxResponse> {
        let op = TxOperation::FundCommunityPool {
            from: from.to_string(),
            amount: amount.clone(),
        };
        self.submit(chain, node_index, &op, fees).await
    }

    pub async fn submit_proposal(
        &self,
        chain: &Chain,
        node_index: usize,
        from: &str,
        proposal_path: &str,
        gas_prices: &str,
    ) -> Result<TxResponse> {
        let op = TxOperation::SubmitProposal {
            from: from.to_string(),
            proposal_path: proposal_path.to_string(),
        };
        self.submit(chain, node_index, &op, gas_prices).await
    }

    pub async fn submit_legacy_proposal(
        &self,
        chain: &Chain,
        node_index: usize,
        from: &str,
        subtype: &str,
        proposal_path: &str,
        gas_prices: &str,
    ) -> Result<TxResponse> {
        let op = TxOperation::SubmitLegacyProposal {
            from: from.to_string(),
            subtype: subtype.to_string(),
            proposal_path: proposal_path.to_string(),
        };
        self.submit(chain, node_index, &op, gas_prices).await
    }

    pub async fn deposit(
        &self,
        chain: &Chain,
        node_index: usize,
        from: &str,
        proposal_id: u64,
        amount: &Coin,
        gas_prices: &str,
    ) -> Result<TxResponse> {
        let op = TxOperation::Deposit {
            from: from.to_string(),
            proposal_id,
            amount: amount.clone(),
        };
        self.submit(chain, node_index, &op, gas_prices).await
    }

    pub async fn vote(
        &self,
        chain: &Chain,
        node_index: usize,
        from: &str,
        proposal_id: u64,
        option: VoteOption,
        gas_prices: &str,
    ) -> Result<TxResponse> {
        let op = TxOperation::Vote {
            from: from.to_string(),
            proposal_id,
            option,
        };
        self.submit(chain, node_index, &op, gas_prices).await
    }
}

impl std::fmt::Debug for TxSubmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxSubmitter")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

