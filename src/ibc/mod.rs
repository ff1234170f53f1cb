// src/ibc/mod.rs

//! Cross-chain coordination through the relayer process.
//!
//! - [`relayer`] knows the relayer's command surface and how to read its
//!   output.
//! - [`coordinator`] sequences "open channel, then transfer" and keeps track
//!   of which chain pairs are linked.

pub mod coordinator;
pub mod relayer;

pub use coordinator::{ChannelLink, IbcCoordinator};
pub use relayer::{CHANNEL_OPEN_MARKER, RelayerSettings};
