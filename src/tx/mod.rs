// src/tx/mod.rs

//! Transaction submission: argument building, response decoding, and the
//! accept/commit lifecycle.

pub mod operation;
pub mod response;
pub mod submitter;

pub use operation::{CommonFlags, TxOperation};
pub use response::{CODE_OK, TxResponse, decode_tx_response};
pub use submitter::{SubmitSettings, TxSubmitter};
