// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

use crate::types::ExecutorKind;

/// Command-line arguments for `chainprobe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "chainprobe",
    version,
    about = "Drive validator nodes and a relayer in sandboxes and wait for the outcome.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    #[arg(long, value_name = "PATH", default_value = "Chainprobe.toml", global = true)]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CHAINPROBE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Override `[harness].executor` from the config.
    #[arg(long, value_enum, value_name = "KIND", global = true)]
    pub executor: Option<ExecutorKind>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Parse + validate the config and print the network; run nothing.
    Check,

    /// In-memory test keys.
    #[command(subcommand)]
    Keys(KeysCommand),

    /// Send tokens on one chain and wait until the tx is committed.
    Send {
        #[arg(long)]
        chain: String,
        /// Index of the validator to submit through.
        #[arg(long, default_value_t = 0)]
        validator: usize,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Amount with denom, e.g. `100photon`.
        #[arg(long)]
        amount: String,
        #[arg(long)]
        fees: String,
    },

    /// Fund the community pool and wait until the tx is committed.
    FundPool {
        #[arg(long)]
        chain: String,
        #[arg(long, default_value_t = 0)]
        validator: usize,
        #[arg(long)]
        from: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        fees: String,
    },

    /// Open a transfer channel between two chains via the relayer.
    Link {
        #[arg(long)]
        chain_a: String,
        #[arg(long)]
        chain_b: String,
    },

    /// Send tokens across chains via the relayer.
    ///
    /// Links the chains first unless `--channel` names an existing channel.
    IbcTransfer {
        #[arg(long)]
        src: String,
        #[arg(long)]
        dst: String,
        #[arg(long)]
        recipient: String,
        #[arg(long)]
        amount: String,
        /// Existing channel on the `src` end.
        #[arg(long, value_name = "CHANNEL")]
        channel: Option<String>,
        /// Its counterparty on the `dst` end.
        #[arg(
            long,
            value_name = "CHANNEL",
            default_value = crate::ibc::relayer::DEFAULT_CHANNEL
        )]
        counterparty_channel: String,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum KeysCommand {
    /// Print a fresh mnemonic and its account address.
    New {
        /// Bech32 address prefix. Defaults to `[harness].address_prefix`
        /// when the config file exists, else `cosmos`.
        #[arg(long)]
        prefix: Option<String>,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
