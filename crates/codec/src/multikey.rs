use multibase::Base;
use serde::{Deserialize, Serialize};

use crate::{CodecError, Result};

/// Key algorithms distinguished by their 2-byte multicodec header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    /// Ed25519 public key (multicodec `0xed01`).
    Ed25519,
    /// secp256k1 public key (multicodec `0xe701`).
    Secp256k1,
    /// Ed25519 private key (multicodec `0x8026`).
    Ed25519Private,
}

impl KeyType {
    const fn codec(self) -> [u8; 2] {
        match self {
            Self::Ed25519 => [0xed, 0x01],
            Self::Secp256k1 => [0xe7, 0x01],
            Self::Ed25519Private => [0x80, 0x26],
        }
    }

    fn from_codec(codec: [u8; 2]) -> Option<Self> {
        match codec {
            [0xed, 0x01] => Some(Self::Ed25519),
            [0xe7, 0x01] => Some(Self::Secp256k1),
            [0x80, 0x26] => Some(Self::Ed25519Private),
            _ => None,
        }
    }
}

/// A multibase-encoded key with a multicodec type header: `z` + base58btc of
/// `[codec_byte_0, codec_byte_1, ...raw_key_bytes]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Multikey(String);

impl Multikey {
    /// Encode raw key bytes under the given key type.
    #[must_use]
    pub fn encode(key_type: KeyType, raw: &[u8]) -> Self {
        let mut buf = Vec::with_capacity(2 + raw.len());
        buf.extend_from_slice(&key_type.codec());
        buf.extend_from_slice(raw);
        Self(multibase::encode(Base::Base58Btc, buf))
    }

    /// Decode, verifying the multicodec header matches `expected`.
    pub fn decode(&self, expected: KeyType) -> Result<Vec<u8>> {
        let (_, bytes) = multibase::decode(&self.0)?;
        if bytes.len() < 2 {
            return Err(CodecError::WrongLength { expected: 2, found: bytes.len() });
        }
        let header = [bytes[0], bytes[1]];
        let found = KeyType::from_codec(header).ok_or(CodecError::UnexpectedCodec(header))?;
        if found != expected {
            return Err(CodecError::UnexpectedCodec(header));
        }
        Ok(bytes[2..].to_vec())
    }

    /// Decode without checking the key type, returning the type alongside the
    /// raw bytes.
    pub fn decode_any(&self) -> Result<(KeyType, Vec<u8>)> {
        let (_, bytes) = multibase::decode(&self.0)?;
        if bytes.len() < 2 {
            return Err(CodecError::WrongLength { expected: 2, found: bytes.len() });
        }
        let header = [bytes[0], bytes[1]];
        let key_type = KeyType::from_codec(header).ok_or(CodecError::UnexpectedCodec(header))?;
        Ok((key_type, bytes[2..].to_vec()))
    }

    /// The multibase string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Multikey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Multikey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ed25519_round_trips() {
        let raw = [7u8; 32];
        let mk = Multikey::encode(KeyType::Ed25519, &raw);
        assert!(mk.as_str().starts_with('z'));
        let decoded = mk.decode(KeyType::Ed25519).unwrap();
        assert_eq!(decoded, raw);
    }

    #[test]
    fn rejects_mismatched_type() {
        let mk = Multikey::encode(KeyType::Ed25519, &[1u8; 32]);
        assert!(mk.decode(KeyType::Secp256k1).is_err());
    }

    #[test]
    fn decode_any_recovers_type() {
        let mk = Multikey::encode(KeyType::Secp256k1, &[2u8; 33]);
        let (kind, bytes) = mk.decode_any().unwrap();
        assert_eq!(kind, KeyType::Secp256k1);
        assert_eq!(bytes.len(), 33);
    }
}
