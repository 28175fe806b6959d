use std::future::Future;

use bitcoin::key::UntweakedPublicKey;
use bitcoin::secp256k1::{Keypair, Secp256k1, SecretKey};
use bitcoin::{Amount, Network};
use serde::{Deserialize, Serialize};

use crate::fee::{estimate_fee, DUST_LIMIT_SATS};
use crate::{commit_address, inscription_script, BitcoinError, CommitPlan, Result};

/// A spendable transaction output available to fund a commit transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Utxo {
    /// Transaction ID holding this output.
    pub txid: String,
    /// Output index.
    pub vout: u32,
    /// Value in satoshis.
    pub value_sats: u64,
}

/// Request to inscribe `content` on-chain.
#[derive(Debug, Clone)]
pub struct InscriptionRequest {
    /// The payload to inscribe (e.g. CEL-CBOR bytes for a migration).
    pub content: Vec<u8>,
    /// MIME type tag embedded in the envelope.
    pub content_type: String,
    /// Optional metadata tag embedded in the envelope.
    pub metadata: Option<Vec<u8>>,
    /// Candidate funding UTXOs, selected greedily by descending value.
    pub utxos: Vec<Utxo>,
    /// Address commit-transaction change is returned to.
    pub change_address: String,
    /// Fee rate in sat/vB applied to both commit and reveal transactions.
    pub fee_rate: u64,
    /// Network the transactions target.
    pub network: Network,
}

/// Outcome of a successful inscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InscriptionResult {
    /// Commit transaction ID.
    pub commit_txid: String,
    /// Reveal transaction ID.
    pub reveal_txid: String,
    /// The inscription identifier, `"<reveal_txid>i0"`.
    pub inscription_id: String,
    /// Satoshi count carried by the reveal output.
    pub satoshi: u64,
}

/// Capability contract for broadcasting a prepared commit/reveal pair and
/// waiting for confirmation.
///
/// This crate constructs transactions; it never signs inputs spending a
/// caller's UTXOs or talks to a node. Integrators supply an implementation
/// backed by their own wallet and RPC client — the core ships none (see
/// `SPEC_FULL.md` Non-goals).
pub trait BitcoinInscriber: Send + Sync {
    /// Construct, sign, broadcast, and await confirmation of the commit and
    /// reveal transactions for `request`.
    fn inscribe(
        &self, request: InscriptionRequest,
    ) -> impl Future<Output = anyhow::Result<InscriptionResult>> + Send;
}

/// Greedily select UTXOs (largest first) until their sum covers `target`
/// satoshis.
///
/// # Errors
/// Returns [`BitcoinError::InsufficientFunds`] if the full set does not
/// cover `target`.
pub fn select_utxos(utxos: &[Utxo], target_sats: u64) -> Result<Vec<Utxo>> {
    let mut sorted = utxos.to_vec();
    sorted.sort_by(|a, b| b.value_sats.cmp(&a.value_sats));

    let mut selected = Vec::new();
    let mut total = 0u64;
    for utxo in sorted {
        if total >= target_sats {
            break;
        }
        total += utxo.value_sats;
        selected.push(utxo);
    }

    if total < target_sats {
        return Err(BitcoinError::InsufficientFunds { needed: target_sats, available: total });
    }
    Ok(selected)
}

/// Everything needed to build a commit transaction, prior to signing.
pub struct PreparedCommit {
    /// The taproot commit plan (script, spend info, destination address).
    pub plan: CommitPlan,
    /// Amount the commit output must carry to cover the reveal fee plus
    /// dust.
    pub commit_amount: Amount,
    /// Estimated commit transaction fee.
    pub commit_fee: Amount,
    /// UTXOs selected to fund the commit transaction.
    pub selected_utxos: Vec<Utxo>,
    /// Ephemeral keypair controlling the reveal script-path spend.
    pub reveal_keypair: Keypair,
}

/// Prepare (but do not sign or broadcast) a commit transaction for
/// `request`, generating a fresh ephemeral reveal key.
///
/// # Errors
/// [`BitcoinError::ContentTooLarge`], [`BitcoinError::InvalidFeeRate`], or
/// [`BitcoinError::InsufficientFunds`] as appropriate.
pub fn prepare_commit(request: &InscriptionRequest) -> Result<PreparedCommit> {
    if request.fee_rate == 0 {
        return Err(BitcoinError::InvalidFeeRate(0));
    }

    let secp = Secp256k1::new();
    let reveal_secret = SecretKey::new(&mut bitcoin::secp256k1::rand::thread_rng());
    let reveal_keypair = Keypair::from_secret_key(&secp, &reveal_secret);
    let internal_key = UntweakedPublicKey::from(reveal_keypair.x_only_public_key().0);

    let script = inscription_script(
        internal_key,
        &request.content_type,
        &request.content,
        request.metadata.as_deref(),
    )?;
    let plan = commit_address(&secp, script.clone(), internal_key, request.network)?;

    let witness_size = script.len() + 64; // script + approximate control block
    let reveal_fee = estimate_fee(0, &[witness_size], 1, 0, request.fee_rate)?;
    let commit_amount = Amount::from_sat(DUST_LIMIT_SATS) + reveal_fee;

    let commit_fee = estimate_fee(0, &[], 1, 1, request.fee_rate)?;
    let target = commit_amount.to_sat() + commit_fee.to_sat();
    let selected_utxos = select_utxos(&request.utxos, target)?;

    Ok(PreparedCommit { plan, commit_amount, commit_fee, selected_utxos, reveal_keypair })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request(utxos: Vec<Utxo>, fee_rate: u64) -> InscriptionRequest {
        InscriptionRequest {
            content: b"hello world".to_vec(),
            content_type: "application/cel+cbor".to_string(),
            metadata: None,
            utxos,
            change_address: "tb1qexamplechange".to_string(),
            fee_rate,
            network: Network::Signet,
        }
    }

    #[test]
    fn selects_utxos_covering_target() {
        let utxos = vec![
            Utxo { txid: "a".into(), vout: 0, value_sats: 1_000 },
            Utxo { txid: "b".into(), vout: 0, value_sats: 5_000 },
        ];
        let selected = select_utxos(&utxos, 3_000).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].txid, "b");
    }

    #[test]
    fn insufficient_funds_is_reported() {
        let utxos = vec![Utxo { txid: "a".into(), vout: 0, value_sats: 100 }];
        assert!(select_utxos(&utxos, 1_000).is_err());
    }

    #[test]
    fn prepare_commit_never_below_dust() {
        let utxos = vec![Utxo { txid: "a".into(), vout: 0, value_sats: 100_000 }];
        let prepared = prepare_commit(&sample_request(utxos, 5)).unwrap();
        assert!(prepared.commit_amount.to_sat() >= DUST_LIMIT_SATS);
    }

    #[test]
    fn prepare_commit_fee_scales_with_rate() {
        let utxos = vec![Utxo { txid: "a".into(), vout: 0, value_sats: 1_000_000 }];
        let low = prepare_commit(&sample_request(utxos.clone(), 10)).unwrap();
        let high = prepare_commit(&sample_request(utxos, 20)).unwrap();
        assert!(high.commit_amount.to_sat() > low.commit_amount.to_sat());
    }
}
