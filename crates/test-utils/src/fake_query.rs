use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chainprobe::errors::{HarnessError, Result};
use chainprobe::query::NodeQuery;
use chainprobe::tx::TxResponse;
use chainprobe::types::{BoxFuture, Coin};

#[derive(Debug, Clone)]
struct TxEntry {
    misses_left: u32,
    code: u32,
    raw_log: String,
}

/// In-memory stand-in for a validator's REST surface.
///
/// - a tx becomes visible after a configurable number of "not found" answers
/// - balances are served from a per-address sequence; the last entry repeats
#[derive(Debug, Default)]
pub struct FakeNodeQuery {
    txs: Mutex<HashMap<String, TxEntry>>,
    balances: Mutex<HashMap<String, VecDeque<Vec<Coin>>>>,
    tx_queries: AtomicUsize,
    balance_queries: AtomicUsize,
}

impl FakeNodeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// `txhash` is reported not found `misses` times, then committed with `code`.
    pub fn tx_committed_after(self, txhash: &str, misses: u32, code: u32) -> Self {
        self.txs.lock().unwrap().insert(
            txhash.to_string(),
            TxEntry {
                misses_left: misses,
                code,
                raw_log: if code == 0 {
                    String::new()
                } else {
                    "out of gas".to_string()
                },
            },
        );
        self
    }

    /// Successive balance answers for `address`.
    pub fn balances_sequence(self, address: &str, answers: Vec<Vec<Coin>>) -> Self {
        self.balances
            .lock()
            .unwrap()
            .insert(address.to_string(), answers.into());
        self
    }

    pub fn tx_query_count(&self) -> usize {
        self.tx_queries.load(Ordering::SeqCst)
    }

    pub fn balance_query_count(&self) -> usize {
        self.balance_queries.load(Ordering::SeqCst)
    }
}

impl NodeQuery for FakeNodeQuery {
    fn query_tx<'a>(&'a self, endpoint: &'a str, txhash: &'a str) -> BoxFuture<'a, Result<TxResponse>> {
        Box::pin(async move {
            self.tx_queries.fetch_add(1, Ordering::SeqCst);
            let not_found = || HarnessError::Query {
                endpoint: endpoint.to_string(),
                reason: format!("tx {txhash} not found"),
            };

            let mut txs = self.txs.lock().unwrap();
            let entry = txs.get_mut(txhash).ok_or_else(not_found)?;
            if entry.misses_left > 0 {
                entry.misses_left -= 1;
                return Err(not_found());
            }

            Ok(TxResponse {
                txhash: txhash.to_string(),
                code: entry.code,
                raw_log: entry.raw_log.clone(),
                codespace: if entry.code == 0 {
                    String::new()
                } else {
                    "sdk".to_string()
                },
                height: Some("42".to_string()),
            })
        })
    }

    fn query_balances<'a>(&'a self, _endpoint: &'a str, address: &'a str) -> BoxFuture<'a, Result<Vec<Coin>>> {
        Box::pin(async move {
            self.balance_queries.fetch_add(1, Ordering::SeqCst);
            let mut balances = self.balances.lock().unwrap();
            let Some(answers) = balances.get_mut(address) else {
                return Ok(Vec::new());
            };
            let current = if answers.len() > 1 {
                answers.pop_front().unwrap_or_default()
            } else {
                answers.front().cloned().unwrap_or_default()
            };
            Ok(current)
        })
    }
}
