use bitcoin::key::UntweakedPublicKey;
use bitcoin::opcodes::all::{OP_CHECKSIG, OP_ENDIF, OP_IF};
use bitcoin::opcodes::OP_FALSE;
use bitcoin::script::{Builder as ScriptBuilder, PushBytesBuf};
use bitcoin::secp256k1::{Secp256k1, Signing, Verification};
use bitcoin::taproot::{TaprootBuilder, TaprootSpendInfo};
use bitcoin::{Address, Network, ScriptBuf};

use crate::{BitcoinError, Result, MAX_INSCRIPTION_CONTENT_BYTES};

const ORD_TAG: &[u8] = b"ord";

/// A committed inscription script plus the taproot spend info needed to
/// reveal it later, along with the destination commit address.
pub struct CommitPlan {
    /// The `ord`-tagged envelope script, revealed at spend time.
    pub inscription_script: ScriptBuf,
    /// Spend info for the single script-path leaf, used to build the
    /// reveal transaction's control block.
    pub taproot_spend_info: TaprootSpendInfo,
    /// The P2TR address funds must be sent to in the commit transaction.
    pub commit_address: Address,
}

fn push(builder: ScriptBuilder, bytes: &[u8]) -> Result<ScriptBuilder> {
    let mut buf = PushBytesBuf::with_capacity(bytes.len());
    buf.extend_from_slice(bytes)
        .map_err(|e| BitcoinError::Construction(e.to_string()))?;
    Ok(builder.push_slice(buf))
}

/// Build the ordinal-compatible inscription envelope:
/// `<pubkey> OP_CHECKSIG OP_FALSE OP_IF "ord" 1 <contentType> [<metadata>] 0 <content...> OP_ENDIF`.
///
/// `content` is not chunked further here; callers must keep it under
/// [`MAX_INSCRIPTION_CONTENT_BYTES`], which this function enforces.
pub fn inscription_script(
    internal_key: UntweakedPublicKey,
    content_type: &str,
    content: &[u8],
    metadata: Option<&[u8]>,
) -> Result<ScriptBuf> {
    if content.len() > MAX_INSCRIPTION_CONTENT_BYTES {
        return Err(BitcoinError::ContentTooLarge {
            size: content.len(),
            limit: MAX_INSCRIPTION_CONTENT_BYTES,
        });
    }

    let serialized_pubkey = internal_key.serialize();
    let mut builder = push(ScriptBuilder::new(), &serialized_pubkey)?;
    builder = builder.push_opcode(OP_CHECKSIG).push_opcode(OP_FALSE).push_opcode(OP_IF);
    builder = push(builder, ORD_TAG)?;
    builder = builder.push_opcode(bitcoin::opcodes::all::OP_PUSHNUM_1);
    builder = push(builder, content_type.as_bytes())?;
    if let Some(metadata) = metadata {
        builder = builder.push_opcode(bitcoin::opcodes::all::OP_PUSHNUM_2);
        builder = push(builder, metadata)?;
    }
    builder = builder.push_opcode(bitcoin::opcodes::OP_0);
    for chunk in content.chunks(520) {
        builder = push(builder, chunk)?;
    }
    builder = builder.push_opcode(OP_ENDIF);

    Ok(builder.into_script())
}

/// Commit `script` under a single-leaf taproot tree with `internal_key`,
/// returning the P2TR address funds must be sent to and the spend info
/// needed to build the reveal transaction.
pub fn commit_address<C: Signing + Verification>(
    secp: &Secp256k1<C>,
    script: ScriptBuf,
    internal_key: UntweakedPublicKey,
    network: Network,
) -> Result<CommitPlan> {
    let spend_info = TaprootBuilder::new()
        .add_leaf(0, script.clone())
        .map_err(|e| BitcoinError::Construction(format!("adding taproot leaf: {e:?}")))?
        .finalize(secp, internal_key)
        .map_err(|e| BitcoinError::Construction(format!("finalizing taproot spend info: {e:?}")))?;

    let commit_address = Address::p2tr_tweaked(spend_info.output_key(), network);

    Ok(CommitPlan {
        inscription_script: script,
        taproot_spend_info: spend_info,
        commit_address,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::secp256k1::{Secp256k1, SecretKey};

    fn test_key(secp: &Secp256k1<bitcoin::secp256k1::All>) -> UntweakedPublicKey {
        let sk = SecretKey::from_slice(&[3u8; 32]).unwrap();
        UntweakedPublicKey::from_keypair(&bitcoin::secp256k1::Keypair::from_secret_key(secp, &sk)).0
    }

    #[test]
    fn builds_envelope_and_commit_address() {
        let secp = Secp256k1::new();
        let key = test_key(&secp);
        let script = inscription_script(key, "application/cel+cbor", b"hello", None).unwrap();
        let plan = commit_address(&secp, script, key, Network::Signet).unwrap();
        assert!(plan.commit_address.to_string().starts_with("tb1p"));
    }

    #[test]
    fn mainnet_address_has_bc1p_prefix() {
        let secp = Secp256k1::new();
        let key = test_key(&secp);
        let script = inscription_script(key, "text/plain", b"hi", None).unwrap();
        let plan = commit_address(&secp, script, key, Network::Bitcoin).unwrap();
        assert!(plan.commit_address.to_string().starts_with("bc1p"));
    }

    #[test]
    fn rejects_oversized_content() {
        let secp = Secp256k1::new();
        let key = test_key(&secp);
        let huge = vec![0u8; crate::MAX_INSCRIPTION_CONTENT_BYTES + 1];
        assert!(inscription_script(key, "application/octet-stream", &huge, None).is_err());
    }
}
