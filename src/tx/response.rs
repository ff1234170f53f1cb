// src/tx/response.rs

use serde::Deserialize;

/// The success sentinel for a transaction result code.
pub const CODE_OK: u32 = 0;

/// Machine-readable result of a broadcast or a query by hash.
///
/// Mirrors the JSON the node CLI prints with `--output=json` (and the
/// `tx_response` object of the REST query). Only `txhash` is mandatory; a
/// missing `code` means success, as in the node's own encoding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TxResponse {
    pub txhash: String,

    #[serde(default)]
    pub code: u32,

    #[serde(default)]
    pub raw_log: String,

    #[serde(default)]
    pub codespace: String,

    /// Block height; `"0"` until the transaction is included.
    #[serde(default)]
    pub height: Option<String>,
}

impl TxResponse {
    /// Accepted by the node (not yet committed).
    pub fn is_accepted(&self) -> bool {
        self.code == CODE_OK
    }
}

/// Decode captured stdout as a [`TxResponse`].
pub fn decode_tx_response(stdout: &[u8]) -> Result<TxResponse, serde_json::Error> {
    serde_json::from_slice(stdout.trim_ascii())
}
