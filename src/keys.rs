// src/keys.rs

//! In-memory test key material.
//!
//! ```text
//! OS RNG -> 256-bit entropy -> BIP39 (English) -> 24 words
//! 24 words -> seed (empty passphrase) -> m/44'/118'/0'/0/0 -> secp256k1 key
//! compressed pubkey -> sha256 -> ripemd160 -> bech32 account address
//! ```
//!
//! The mnemonic never leaves process memory: it is not written anywhere and
//! its `Debug` output is redacted. Credentials live for one test run.

use std::fmt;

use bech32::{Bech32, Hrp};
use bip32::{DerivationPath, XPrv};
use rand::RngCore;
use rand::rngs::OsRng;
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::ConfigFile;
use crate::errors::{HarnessError, Result};

pub const ENTROPY_BITS: usize = 256;

/// Full fundraiser path for the ledger's coin type.
pub const HD_PATH: &str = "m/44'/118'/0'/0/0";

pub const DEFAULT_ADDRESS_PREFIX: &str = "cosmos";

/// The only signature algorithm family used for harness keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningAlgorithm {
    Secp256k1,
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigningAlgorithm::Secp256k1 => f.write_str("secp256k1"),
        }
    }
}

/// A BIP39 mnemonic phrase. Sensitive: memory-only, redacted in `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Mnemonic(String);

impl Mnemonic {
    /// Fresh 24-word mnemonic from 256 bits of OS entropy.
    pub fn generate() -> Result<Self> {
        let mut entropy = [0u8; ENTROPY_BITS / 8];
        OsRng
            .try_fill_bytes(&mut entropy)
            .map_err(|e| HarnessError::EntropyFailure(e.to_string()))?;

        let mnemonic = bip39::Mnemonic::from_entropy_in(bip39::Language::English, &entropy)
            .map_err(|e| HarnessError::EntropyFailure(format!("encoding entropy: {e}")))?;

        Ok(Mnemonic(mnemonic.to_string()))
    }

    /// Wrap an existing phrase. Validation happens at derivation time.
    pub fn from_phrase(phrase: impl Into<String>) -> Self {
        Mnemonic(phrase.into())
    }

    pub fn phrase(&self) -> &str {
        &self.0
    }

    pub fn word_count(&self) -> usize {
        self.0.split_whitespace().count()
    }
}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mnemonic(<{} words redacted>)", self.word_count())
    }
}

/// Derived signing record for one mnemonic.
#[derive(Clone)]
pub struct Credential {
    algorithm: SigningAlgorithm,
    signing_key: XPrv,
    public_key: [u8; 33],
    address: String,
}

impl Credential {
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    /// Compressed secp256k1 public key.
    pub fn public_key(&self) -> &[u8; 33] {
        &self.public_key
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key)
    }

    /// Bech32 account address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Raw private key bytes, for signing in-process.
    pub fn private_key_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.algorithm == other.algorithm
            && self.public_key == other.public_key
            && self.address == other.address
            && self.private_key_bytes() == other.private_key_bytes()
    }
}

impl Eq for Credential {}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("algorithm", &self.algorithm)
            .field("public_key", &self.public_key_hex())
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Produces credentials for the harness's own transactions.
#[derive(Debug, Clone)]
pub struct KeyProvisioner {
    address_prefix: String,
}

impl Default for KeyProvisioner {
    fn default() -> Self {
        Self::new(DEFAULT_ADDRESS_PREFIX)
    }
}

impl KeyProvisioner {
    pub fn new(address_prefix: impl Into<String>) -> Self {
        Self {
            address_prefix: address_prefix.into(),
        }
    }

    /// Provisioner using `[harness].address_prefix`.
    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self::new(&cfg.harness.address_prefix)
    }

    pub fn address_prefix(&self) -> &str {
        &self.address_prefix
    }

    /// Generate a mnemonic and derive its credential.
    pub fn new_credential(&self) -> Result<(Mnemonic, Credential)> {
        let mnemonic = Mnemonic::generate()?;
        let credential = self.credential_from_mnemonic(&mnemonic)?;
        Ok((mnemonic, credential))
    }

    /// Deterministically derive the single signing record of `mnemonic`.
    pub fn credential_from_mnemonic(&self, mnemonic: &Mnemonic) -> Result<Credential> {
        let parsed = bip39::Mnemonic::parse_in(bip39::Language::English, mnemonic.phrase())
            .map_err(|e| HarnessError::DerivationFailure(format!("mnemonic rejected: {e}")))?;
        let seed = parsed.to_seed("");

        let path: DerivationPath = HD_PATH
            .parse()
            .map_err(|e| HarnessError::DerivationFailure(format!("invalid path {HD_PATH}: {e}")))?;

        let signing_key = XPrv::derive_from_path(seed, &path)
            .map_err(|e| HarnessError::DerivationFailure(format!("deriving {HD_PATH}: {e}")))?;

        let public_key = signing_key.public_key().to_bytes();
        let address = account_address(&self.address_prefix, &public_key)?;
        debug!(%address, "derived in-memory credential");

        Ok(Credential {
            algorithm: SigningAlgorithm::Secp256k1,
            signing_key,
            public_key,
            address,
        })
    }
}

/// Bech32 account address of a compressed secp256k1 public key.
pub fn account_address(prefix: &str, public_key: &[u8]) -> Result<String> {
    let hash = Ripemd160::digest(Sha256::digest(public_key));
    let hrp = Hrp::parse(prefix)
        .map_err(|e| HarnessError::DerivationFailure(format!("invalid address prefix '{prefix}': {e}")))?;
    bech32::encode::<Bech32>(hrp, &hash)
        .map_err(|e| HarnessError::DerivationFailure(format!("encoding address: {e}")))
}
