//! Canonical encoding primitives shared by the event log, proof, and
//! credential layers.
//!
//! `originals-codec` owns three concerns: canonical JSON serialization
//! (sorted object keys at every depth, the stable input to every digest and
//! signature in this workspace), a deterministic CBOR wire form, and the
//! multibase/multicodec representation used for keys and digests.

mod cbor;
mod digest;
mod multikey;

pub use cbor::{decode_cbor, encode_cbor};
pub use digest::{digest, digest_bytes, DigestMultibase};
pub use multikey::{KeyType, Multikey};

use serde::Serialize;
use thiserror::Error;

/// Errors raised while encoding or decoding canonical forms.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The value could not be serialized to canonical JSON.
    #[error("canonical json encoding failed: {0}")]
    CanonicalJson(String),

    /// The value could not be parsed as JSON.
    #[error("json decoding failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The value could not be encoded to CBOR.
    #[error("cbor encoding failed: {0}")]
    CborEncode(String),

    /// The value could not be decoded from CBOR.
    #[error("cbor decoding failed: {0}")]
    CborDecode(String),

    /// A multibase string was malformed.
    #[error("multibase decoding failed: {0}")]
    Multibase(#[from] multibase::Error),

    /// A decoded key or digest had an unexpected length.
    #[error("expected {expected} bytes, found {found}")]
    WrongLength {
        /// Expected byte length.
        expected: usize,
        /// Actual byte length observed.
        found: usize,
    },

    /// A multicodec header did not match the expected key type.
    #[error("unexpected multicodec header {0:?}")]
    UnexpectedCodec([u8; 2]),
}

/// Result alias for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

/// Serialize `value` to canonical JSON: object keys sorted lexicographically
/// at every depth, used as the stable input to every digest and signature in
/// this workspace.
pub fn encode_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json_canonicalizer::to_string(value).map_err(|e| CodecError::CanonicalJson(e.to_string()))
}

/// Parse canonical (or any well-formed) JSON into `T`.
pub fn decode_json<T: serde::de::DeserializeOwned>(json: &str) -> Result<T> {
    Ok(serde_json::from_str(json)?)
}
