use serde::{de::DeserializeOwned, Serialize};

use crate::{CodecError, Result};

/// Encode `value` to deterministic CBOR.
///
/// `ciborium` emits definite-length containers and preserves struct field
/// order as declared (which, for the event log and credential types in this
/// workspace, already matches their canonical JSON key order), giving a
/// byte-stable wire form suitable for hashing and inscription.
pub fn encode_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| CodecError::CborEncode(e.to_string()))?;
    Ok(buf)
}

/// Decode CBOR bytes into `T`.
pub fn decode_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    ciborium::from_reader(bytes).map_err(|e| CodecError::CborDecode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Sample {
        a: u32,
        b: String,
    }

    #[test]
    fn round_trips() {
        let sample = Sample { a: 42, b: "hi".into() };
        let bytes = encode_cbor(&sample).unwrap();
        let back: Sample = decode_cbor(&bytes).unwrap();
        assert_eq!(sample, back);
    }

    #[test]
    fn smaller_than_json_for_repetitive_data() {
        let sample = Sample { a: 1, b: "x".repeat(64) };
        let cbor = encode_cbor(&sample).unwrap();
        let json = serde_json::to_vec(&sample).unwrap();
        assert!(cbor.len() <= json.len());
    }
}
