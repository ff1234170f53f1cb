// src/types.rs

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

/// Boxed, sendable future used by the pluggable backend traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Which backend runs commands inside sandboxes.
///
/// - `Docker`: `docker exec` into a running container (default).
/// - `Local`: run the program directly on the host; the sandbox handle is
///   only used for log context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorKind {
    Docker,
    Local,
}

impl Default for ExecutorKind {
    fn default() -> Self {
        ExecutorKind::Docker
    }
}

impl FromStr for ExecutorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "docker" => Ok(ExecutorKind::Docker),
            "local" => Ok(ExecutorKind::Local),
            other => Err(format!(
                "invalid executor: {other} (expected \"docker\" or \"local\")"
            )),
        }
    }
}

/// A token amount such as `300000000photon`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coin {
    pub amount: u128,
    pub denom: String,
}

impl Coin {
    pub fn new(amount: u128, denom: impl Into<String>) -> Self {
        Self {
            amount,
            denom: denom.into(),
        }
    }
}

fn coin_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([0-9]+)([a-zA-Z][a-zA-Z0-9/:._-]{2,127})$").expect("coin regex is valid")
    })
}

impl FromStr for Coin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let caps = coin_regex()
            .captures(s)
            .ok_or_else(|| format!("invalid coin '{s}' (expected e.g. \"100photon\")"))?;
        let amount = caps[1]
            .parse::<u128>()
            .map_err(|e| format!("invalid coin amount in '{s}': {e}"))?;
        Ok(Coin::new(amount, &caps[2]))
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Governance vote option, rendered the way the node CLI expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOption {
    Yes,
    No,
    Abstain,
    NoWithVeto,
}

impl FromStr for VoteOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yes" => Ok(VoteOption::Yes),
            "no" => Ok(VoteOption::No),
            "abstain" => Ok(VoteOption::Abstain),
            "no_with_veto" | "nowithveto" => Ok(VoteOption::NoWithVeto),
            other => Err(format!(
                "invalid vote option: {other} (expected yes, no, abstain or no_with_veto)"
            )),
        }
    }
}

impl fmt::Display for VoteOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VoteOption::Yes => "yes",
            VoteOption::No => "no",
            VoteOption::Abstain => "abstain",
            VoteOption::NoWithVeto => "no_with_veto",
        };
        f.write_str(s)
    }
}
