// src/ibc/relayer.rs

//! Relayer CLI surface: argument building and output interpretation.

use std::sync::OnceLock;

use regex::Regex;

use crate::types::Coin;

/// Literal the relayer prints on stderr once the channel handshake started.
///
/// This text marker, not the exit code, is the authoritative success signal
/// for `create channel`.
pub const CHANNEL_OPEN_MARKER: &str = "successfully opened init channel";

/// Channel assumed when the relayer output names none (the first channel
/// opened on a fresh pair of chains).
pub const DEFAULT_CHANNEL: &str = "channel-0";

pub const DEFAULT_PORT: &str = "transfer";
pub const DEFAULT_TIMEOUT_HEIGHT_OFFSET: u64 = 1000;

/// Static relayer settings, from the `[relayer]` config section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayerSettings {
    pub binary: String,
    pub port: String,
    pub timeout_height_offset: u64,
}

impl Default for RelayerSettings {
    fn default() -> Self {
        Self {
            binary: "hermes".to_string(),
            port: DEFAULT_PORT.to_string(),
            timeout_height_offset: DEFAULT_TIMEOUT_HEIGHT_OFFSET,
        }
    }
}

impl RelayerSettings {
    /// `create channel <a> <b> --port-a=<port> --port-b=<port>`
    pub fn create_channel_args(&self, chain_a: &str, chain_b: &str) -> Vec<String> {
        vec![
            "create".into(),
            "channel".into(),
            chain_a.into(),
            chain_b.into(),
            format!("--port-a={}", self.port),
            format!("--port-b={}", self.port),
        ]
    }

    /// `tx raw ft-transfer <dst> <src> <port> <channel> <amount> ...`
    pub fn ft_transfer_args(
        &self,
        src_chain: &str,
        dst_chain: &str,
        channel: &str,
        recipient: &str,
        token: &Coin,
    ) -> Vec<String> {
        vec![
            "tx".into(),
            "raw".into(),
            "ft-transfer".into(),
            dst_chain.into(),
            src_chain.into(),
            self.port.clone(),
            channel.into(),
            token.amount.to_string(),
            format!("--denom={}", token.denom),
            format!("--receiver={recipient}"),
            format!("--timeout-height-offset={}", self.timeout_height_offset),
        ]
    }
}

/// True when the relayer reported the channel as opened.
pub fn channel_opened(stderr: &str) -> bool {
    stderr.contains(CHANNEL_OPEN_MARKER)
}

fn channel_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"channel-[0-9]+").expect("channel regex is valid"))
}

fn counterparty_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:counterparty|b_side)[^\n]*?(channel-[0-9]+)").expect("counterparty regex is valid")
    })
}

/// Channel ids reported for the two ends of `create channel <a> <b>`.
///
/// The relayer names the init end (chain `a`) first and the counterparty end
/// (chain `b`) after a `counterparty` / `b_side` label. Either may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelEnds {
    pub a: Option<String>,
    pub b: Option<String>,
}

pub fn parse_channel_ends(output: &str) -> ChannelEnds {
    let counterparty = counterparty_re()
        .captures(output)
        .and_then(|caps| caps.get(1));

    let a = channel_re()
        .find_iter(output)
        .find(|m| counterparty.is_none_or(|cp| cp.start() != m.start()))
        .map(|m| m.as_str().to_string());

    ChannelEnds {
        a,
        b: counterparty.map(|m| m.as_str().to_string()),
    }
}
