// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod harness;
pub mod ibc;
pub mod keys;
pub mod logging;
pub mod network;
pub mod poll;
pub mod query;
pub mod tx;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::{CliArgs, Command, KeysCommand};
use crate::config::ConfigFile;
use crate::config::loader::load_and_validate;
use crate::exec::executor_for;
use crate::harness::Harness;
use crate::keys::KeyProvisioner;
use crate::query::RestQueryClient;
use crate::types::Coin;

pub use crate::errors::{HarnessError, Result as HarnessResult};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (skipped for `keys new`)
/// - executor backend selection
/// - the REST query client
/// - the harness context and the requested step
pub async fn run(args: CliArgs) -> Result<()> {
    if let Command::Keys(KeysCommand::New { ref prefix }) = args.command {
        let provisioner = key_provisioner(prefix.as_deref(), &args.config)?;
        return print_new_key(&provisioner);
    }

    let mut cfg = load_and_validate(&args.config)
        .with_context(|| format!("loading config {}", args.config))?;
    if let Some(kind) = args.executor {
        cfg.harness.executor = kind;
    }

    if let Command::Check = args.command {
        print_network(&cfg);
        return Ok(());
    }

    let executor = executor_for(cfg.harness.executor);
    let query = Arc::new(RestQueryClient::new()?);
    let harness = Harness::from_config(&cfg, executor, query);

    run_step(&harness, args.command).await
}

async fn run_step(harness: &Harness, command: Command) -> Result<()> {
    let network = harness.network();

    match command {
        Command::Send {
            chain,
            validator,
            from,
            to,
            amount,
            fees,
        } => {
            let chain = network.chain(&chain)?;
            let amount = parse_coin(&amount)?;
            let submitter = harness.submitter();
            let resp = submitter
                .send_funds(&chain, validator, &from, &to, &amount, &fees)
                .await
                .context("bank send")?;
            submitter
                .confirm_commitment(&chain, validator, &resp.txhash)
                .await
                .context("waiting for bank send to commit")?;
            println!("{}", resp.txhash);
        }
        Command::FundPool {
            chain,
            validator,
            from,
            amount,
            fees,
        } => {
            let chain = network.chain(&chain)?;
            let amount = parse_coin(&amount)?;
            let submitter = harness.submitter();
            let resp = submitter
                .fund_community_pool(&chain, validator, &from, &amount, &fees)
                .await
                .context("funding community pool")?;
            submitter
                .confirm_commitment(&chain, validator, &resp.txhash)
                .await
                .context("waiting for community pool funding to commit")?;
            println!("{}", resp.txhash);
        }
        Command::Link { chain_a, chain_b } => {
            let a = network.chain(&chain_a)?;
            let b = network.chain(&chain_b)?;
            let link = harness
                .coordinator()?
                .link_chains(&a, &b)
                .await
                .context("linking chains")?;
            println!(
                "{}:{} <-> {}:{}",
                link.chain_a, link.channel_a, link.chain_b, link.channel_b
            );
        }
        Command::IbcTransfer {
            src,
            dst,
            recipient,
            amount,
            channel,
            counterparty_channel,
        } => {
            let src = network.chain(&src)?;
            let dst = network.chain(&dst)?;
            let token = parse_coin(&amount)?;
            let coordinator = harness.coordinator()?;

            match channel {
                Some(channel) => {
                    coordinator.register_link(src.id(), &channel, dst.id(), &counterparty_channel);
                }
                None => {
                    coordinator
                        .link_chains(&src, &dst)
                        .await
                        .context("linking chains before transfer")?;
                }
            }

            coordinator
                .transfer(&src, &dst, &recipient, &token)
                .await
                .context("dispatching IBC transfer")?;
        }
        Command::Check | Command::Keys(_) => {
            debug!("command handled before harness construction");
        }
    }

    Ok(())
}

fn parse_coin(s: &str) -> Result<Coin> {
    s.parse::<Coin>().map_err(anyhow::Error::msg)
}

/// Provisioner for `keys new`: an explicit prefix wins, then the config's
/// `[harness].address_prefix` if the file exists, then the default prefix.
pub fn key_provisioner(prefix: Option<&str>, config: impl AsRef<Path>) -> Result<KeyProvisioner> {
    if let Some(prefix) = prefix {
        return Ok(KeyProvisioner::new(prefix));
    }

    let config = config.as_ref();
    if !config.exists() {
        debug!(path = %config.display(), "no config file; using default address prefix");
        return Ok(KeyProvisioner::default());
    }

    let cfg = load_and_validate(config)
        .with_context(|| format!("loading config {}", config.display()))?;
    Ok(KeyProvisioner::from_config(&cfg))
}

fn print_new_key(provisioner: &KeyProvisioner) -> Result<()> {
    let (mnemonic, credential) = provisioner.new_credential()?;
    info!(address = %credential.address(), "generated in-memory test key");
    println!("address:  {}", credential.address());
    println!("pubkey:   {}", credential.public_key_hex());
    println!("mnemonic: {}", mnemonic.phrase());
    Ok(())
}

/// Simple check output: print the validated network and timing policy.
fn print_network(cfg: &ConfigFile) {
    println!("chainprobe check");
    println!("  harness.executor = {:?}", cfg.harness.executor);
    println!("  harness.node_binary = {}", cfg.harness.node_binary);
    println!("  harness.command_timeout = {:?}", cfg.harness.command_timeout);
    println!(
        "  poll.accept = every {:?} for {:?}",
        cfg.accept.interval, cfg.accept.timeout
    );
    println!(
        "  poll.commit = every {:?} for {:?}",
        cfg.commit.interval, cfg.commit.timeout
    );
    println!();

    println!("chains ({}):", cfg.chains.len());
    for (id, chain) in cfg.chains.iter() {
        println!("  - {id}");
        for (idx, val) in chain.validators.iter().enumerate() {
            println!("      [{idx}] sandbox: {}  endpoint: {}", val.sandbox, val.endpoint);
        }
    }

    if let Some(ref relayer) = cfg.relayer {
        println!();
        println!("relayer:");
        println!("  sandbox: {}", relayer.sandbox);
        println!("  binary: {}", relayer.settings.binary);
        println!("  port: {}", relayer.settings.port);
        println!(
            "  timeout_height_offset: {}",
            relayer.settings.timeout_height_offset
        );
    }

    debug!("check complete (no execution)");
}
