use multibase::Base;
use serde::Serialize;
use sha2::Digest as _;

use crate::{encode_json, CodecError, Result};

/// A SHA-256 digest encoded as multibase, e.g. `uX7z...` (base64url) or
/// `zQm...` (base58btc).
///
/// `DigestMultibase` is the value type for `previousEvent` links, resource
/// content addresses, and credential chain hashes. Equality is by decoded
/// bytes, not by encoding, so a base64url and a base58btc encoding of the
/// same hash compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct DigestMultibase(String);

impl DigestMultibase {
    /// Wrap an already-encoded multibase string, validating that it decodes
    /// to exactly 32 bytes.
    pub fn parse(encoded: impl Into<String>) -> Result<Self> {
        let encoded = encoded.into();
        let (_, bytes) = multibase::decode(&encoded)?;
        if bytes.len() != 32 {
            return Err(CodecError::WrongLength { expected: 32, found: bytes.len() });
        }
        Ok(Self(encoded))
    }

    /// Encode 32 raw digest bytes as base64url multibase (`u...`).
    #[must_use]
    pub fn from_bytes_base64url(bytes: &[u8; 32]) -> Self {
        Self(multibase::encode(Base::Base64Url, bytes))
    }

    /// Encode 32 raw digest bytes as base58btc multibase (`z...`).
    #[must_use]
    pub fn from_bytes_base58btc(bytes: &[u8; 32]) -> Self {
        Self(multibase::encode(Base::Base58Btc, bytes))
    }

    /// The multibase-encoded string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode to the raw 32-byte digest.
    pub fn to_bytes(&self) -> Result<[u8; 32]> {
        let (_, bytes) = multibase::decode(&self.0)?;
        bytes
            .try_into()
            .map_err(|v: Vec<u8>| CodecError::WrongLength { expected: 32, found: v.len() })
    }
}

impl std::fmt::Display for DigestMultibase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// `digest(value) := multibase_base64url(SHA-256(canonical_json(value)))`.
///
/// This is the universal content-addressing function used for
/// `previousEvent` links, peer DID derivation, and credential chain hashes.
pub fn digest<T: Serialize>(value: &T) -> Result<DigestMultibase> {
    let canonical = encode_json(value)?;
    let hash = sha2::Sha256::digest(canonical.as_bytes());
    let bytes: [u8; 32] = hash.into();
    Ok(DigestMultibase::from_bytes_base64url(&bytes))
}

/// `digest_bytes(raw) := multibase_base64url(SHA-256(raw))`, for content
/// that is addressed directly rather than via its canonical JSON form (an
/// `ExternalReference`'s resource bytes, for instance).
#[must_use]
pub fn digest_bytes(raw: &[u8]) -> DigestMultibase {
    let hash = sha2::Sha256::digest(raw);
    let bytes: [u8; 32] = hash.into();
    DigestMultibase::from_bytes_base64url(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic() {
        let a = digest(&serde_json::json!({"b": 1, "a": 2})).unwrap();
        let b = digest(&serde_json::json!({"a": 2, "b": 1})).unwrap();
        assert_eq!(a, b, "key order must not affect the digest");
    }

    #[test]
    fn digest_bytes_is_deterministic_and_differs_from_the_json_string_digest() {
        let a = digest_bytes(b"hello");
        let b = digest_bytes(b"hello");
        assert_eq!(a, b);
        // digest(&"hello") hashes the canonical JSON string `"hello"` (with
        // quotes), not the raw bytes `digest_bytes` hashes.
        assert_ne!(a, digest(&"hello").unwrap());
    }

    #[test]
    fn round_trips_through_bytes() {
        let d = digest(&"hello").unwrap();
        let bytes = d.to_bytes().unwrap();
        let reencoded = DigestMultibase::from_bytes_base64url(&bytes);
        assert_eq!(d, reencoded);
    }

    #[test]
    fn rejects_wrong_length() {
        let short = multibase::encode(Base::Base64Url, [0u8; 4]);
        assert!(DigestMultibase::parse(short).is_err());
    }
}
