//! Ordinal-style Bitcoin inscription construction: taproot commit/reveal
//! script building, UTXO selection, and fee estimation.
//!
//! This crate constructs transactions; it never broadcasts. Broadcasting and
//! confirmation are delegated to an integrator-supplied [`BitcoinInscriber`],
//! matching the Non-goal that the core ships no production wallet/RPC
//! client.

mod envelope;
mod fee;
mod inscriber;

pub use bitcoin::Network;
pub use envelope::{commit_address, inscription_script, CommitPlan};
pub use fee::{estimate_fee, estimate_transaction_size, DUST_LIMIT_SATS};
pub use inscriber::{BitcoinInscriber, InscriptionRequest, InscriptionResult, Utxo};

use thiserror::Error;

/// Errors raised while constructing an inscription.
#[derive(Debug, Error)]
pub enum BitcoinError {
    /// Selected UTXOs did not cover the commit amount plus fees.
    #[error("insufficient funds: need {needed} sats, have {available} sats")]
    InsufficientFunds {
        /// Total required, in satoshis.
        needed: u64,
        /// Total available across supplied UTXOs, in satoshis.
        available: u64,
    },

    /// The inscription content plus envelope overhead would exceed
    /// consensus witness limits.
    #[error("content too large: {size} bytes exceeds the {limit} byte limit")]
    ContentTooLarge {
        /// Size of the content, in bytes.
        size: usize,
        /// The enforced limit, in bytes.
        limit: usize,
    },

    /// A non-positive fee rate was supplied.
    #[error("invalid fee rate: {0} sat/vB")]
    InvalidFeeRate(u64),

    /// A `bitcoin` crate operation failed (address/script construction).
    #[error("bitcoin transaction construction failed: {0}")]
    Construction(String),
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, BitcoinError>;

/// Maximum inscription content size this crate will attempt to embed in a
/// single reveal witness (conservative relative to the ~400KB standardness
/// limit most relay policies enforce).
pub const MAX_INSCRIPTION_CONTENT_BYTES: usize = 390_000;
