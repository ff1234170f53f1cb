// src/query.rs

//! Read-only queries against a validator's REST endpoint.
//!
//! The poller only ever needs two reads: "fetch transaction by hash" to
//! confirm commitment, and "bank balances" to confirm that a cross-chain
//! transfer arrived. Both sit behind [`NodeQuery`] so tests can answer them
//! without a node, and so a push-based client could replace polling where
//! one is available.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::errors::{HarnessError, Result};
use crate::tx::TxResponse;
use crate::types::{BoxFuture, Coin};

pub trait NodeQuery: Send + Sync {
    /// Fetch a transaction by hash. An error means "not found (yet)" or an
    /// unreachable endpoint; callers treat it as transient.
    fn query_tx<'a>(&'a self, endpoint: &'a str, txhash: &'a str) -> BoxFuture<'a, Result<TxResponse>>;

    /// All balances held by `address`.
    fn query_balances<'a>(&'a self, endpoint: &'a str, address: &'a str) -> BoxFuture<'a, Result<Vec<Coin>>>;
}

#[derive(Debug, Deserialize)]
struct GetTxResponse {
    tx_response: TxResponse,
}

#[derive(Debug, Deserialize)]
struct BalancesResponse {
    #[serde(default)]
    balances: Vec<RawCoin>,
}

#[derive(Debug, Deserialize)]
struct RawCoin {
    denom: String,
    amount: String,
}

/// HTTP client for the node's REST (gRPC-gateway) surface.
#[derive(Debug, Clone)]
pub struct RestQueryClient {
    client: Client,
}

impl RestQueryClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| HarnessError::Query {
                endpoint: String::new(),
                reason: format!("building HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, url: String) -> Result<T> {
        let query_err = |reason: String| HarnessError::Query {
            endpoint: endpoint.to_string(),
            reason,
        };

        trace!(%url, "querying node");
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| query_err(e.to_string()))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(query_err(format!("GET {url} returned {status}")));
        }

        resp.json::<T>()
            .await
            .map_err(|e| query_err(format!("decoding body of {url}: {e}")))
    }
}

impl NodeQuery for RestQueryClient {
    fn query_tx<'a>(&'a self, endpoint: &'a str, txhash: &'a str) -> BoxFuture<'a, Result<TxResponse>> {
        Box::pin(async move {
            let url = format!("{endpoint}/cosmos/tx/v1beta1/txs/{txhash}");
            let body: GetTxResponse = self.get(endpoint, url).await?;
            Ok(body.tx_response)
        })
    }

    fn query_balances<'a>(&'a self, endpoint: &'a str, address: &'a str) -> BoxFuture<'a, Result<Vec<Coin>>> {
        Box::pin(async move {
            let url = format!("{endpoint}/cosmos/bank/v1beta1/balances/{address}");
            let body: BalancesResponse = self.get(endpoint, url).await?;
            body.balances
                .into_iter()
                .map(|c| {
                    let amount = c.amount.parse::<u128>().map_err(|e| HarnessError::Query {
                        endpoint: endpoint.to_string(),
                        reason: format!("invalid amount '{}' for {}: {e}", c.amount, c.denom),
                    })?;
                    Ok(Coin::new(amount, c.denom))
                })
                .collect()
        })
    }
}

/// Amount of `denom` in a balance list (zero when absent).
pub fn amount_of(balances: &[Coin], denom: &str) -> u128 {
    balances
        .iter()
        .filter(|c| c.denom == denom)
        .map(|c| c.amount)
        .sum()
}
