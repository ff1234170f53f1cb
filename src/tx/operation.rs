// src/tx/operation.rs

//! Node CLI argument construction for each supported transaction kind.

use crate::types::{Coin, VoteOption};

/// A domain operation the harness can submit to a validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxOperation {
    /// `tx bank send <from> <to> <amount>`
    BankSend { from: String, to: String, amount: Coin },

    /// `tx distribution fund-community-pool <amount> --from=<from>`
    FundCommunityPool { from: String, amount: Coin },

    /// `tx gov submit-proposal <path> --from=<from>`
    SubmitProposal { from: String, proposal_path: String },

    /// `tx gov submit-legacy-proposal <subtype> <path> --from=<from>`
    SubmitLegacyProposal {
        from: String,
        subtype: String,
        proposal_path: String,
    },

    /// `tx gov deposit <id> <amount> --from=<from>`
    Deposit {
        from: String,
        proposal_id: u64,
        amount: Coin,
    },

    /// `tx gov vote <id> <option> --from=<from>`
    Vote {
        from: String,
        proposal_id: u64,
        option: VoteOption,
    },
}

/// Static settings shared by every node command.
#[derive(Debug, Clone, Copy)]
pub struct CommonFlags<'a> {
    pub chain_id: &'a str,
    pub keyring_backend: &'a str,
}

impl TxOperation {
    /// Short human label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            TxOperation::BankSend { .. } => "bank send",
            TxOperation::FundCommunityPool { .. } => "fund community pool",
            TxOperation::SubmitProposal { .. } => "submit gov proposal",
            TxOperation::SubmitLegacyProposal { .. } => "submit legacy gov proposal",
            TxOperation::Deposit { .. } => "deposit on gov proposal",
            TxOperation::Vote { .. } => "vote on gov proposal",
        }
    }

    /// Fee flag name. Governance messages are priced with gas prices, the
    /// rest with a flat fee.
    fn fee_flag(&self) -> &'static str {
        match self {
            TxOperation::BankSend { .. } | TxOperation::FundCommunityPool { .. } => "fees",
            _ => "gas-prices",
        }
    }

    /// Full argument list after the node binary name.
    pub fn to_args(&self, flags: CommonFlags<'_>, fees: &str) -> Vec<String> {
        let mut args: Vec<String> = vec!["tx".into()];

        match self {
            TxOperation::BankSend { from, to, amount } => {
                args.extend(["bank".into(), "send".into(), from.clone(), to.clone(), amount.to_string()]);
            }
            TxOperation::FundCommunityPool { from, amount } => {
                args.extend([
                    "distribution".into(),
                    "fund-community-pool".into(),
                    amount.to_string(),
                    format!("--from={from}"),
                ]);
            }
            TxOperation::SubmitProposal { from, proposal_path } => {
                args.extend([
                    "gov".into(),
                    "submit-proposal".into(),
                    proposal_path.clone(),
                    format!("--from={from}"),
                ]);
            }
            TxOperation::SubmitLegacyProposal {
                from,
                subtype,
                proposal_path,
            } => {
                args.extend([
                    "gov".into(),
                    "submit-legacy-proposal".into(),
                    subtype.clone(),
                    proposal_path.clone(),
                    format!("--from={from}"),
                ]);
            }
            TxOperation::Deposit {
                from,
                proposal_id,
                amount,
            } => {
                args.extend([
                    "gov".into(),
                    "deposit".into(),
                    proposal_id.to_string(),
                    amount.to_string(),
                    format!("--from={from}"),
                ]);
            }
            TxOperation::Vote {
                from,
                proposal_id,
                option,
            } => {
                args.extend([
                    "gov".into(),
                    "vote".into(),
                    proposal_id.to_string(),
                    option.to_string(),
                    format!("--from={from}"),
                ]);
            }
        }

        args.push(format!("--chain-id={}", flags.chain_id));
        args.push(format!("--{}={fees}", self.fee_flag()));
        args.push(format!("--keyring-backend={}", flags.keyring_backend));
        if matches!(self, TxOperation::BankSend { .. }) {
            args.push("--broadcast-mode=sync".into());
        }
        args.push("--output=json".into());
        args.push("-y".into());

        args
    }
}
