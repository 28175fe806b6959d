//! A local, file-based signing wallet for `migrate --to btco`.
//!
//! This is reference/demo signing code for exercising the inscription path
//! against regtest or signet, not production wallet management — it never
//! talks to a node. `LocalInscriber::inscribe` builds and fully signs the
//! commit and reveal transactions and returns their real computed txids;
//! relaying the raw hex to the network is left to the caller's own node,
//! the same "construction, not consensus" boundary `originals-bitcoin`
//! itself observes.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use bitcoin::absolute::LockTime;
use bitcoin::key::CompressedPublicKey;
use bitcoin::secp256k1::{Message, Secp256k1};
use bitcoin::sighash::{EcdsaSighashType, Prevouts, SighashCache, TapSighashType};
use bitcoin::taproot::{LeafVersion, TapLeafHash};
use bitcoin::transaction::Version;
use bitcoin::{
    Address, Amount, Network, OutPoint, PrivateKey, ScriptBuf, Sequence, Transaction, TxIn, TxOut,
    Txid, Witness,
};
use originals_bitcoin::{
    fee::DUST_LIMIT_SATS, prepare_commit, BitcoinInscriber, InscriptionRequest, InscriptionResult,
    PreparedCommit,
};
use serde::Deserialize;

/// One funding input, with the WIF private key needed to spend it. Assumed
/// P2WPKH; no other input script type is supported.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WalletUtxo {
    txid: String,
    vout: u32,
    value_sats: u64,
    private_key_wif: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WalletFile {
    utxos: Vec<WalletUtxo>,
    change_address: String,
    fee_rate: u64,
    network: String,
}

/// A `BitcoinInscriber` backed by the keys and UTXOs in a `--wallet` file.
pub struct LocalInscriber {
    utxos: Vec<WalletUtxo>,
    change_address: Address,
    fee_rate: u64,
    network: Network,
}

impl LocalInscriber {
    /// Load a wallet file and validate its change address matches its
    /// declared network.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("reading wallet file {}", path.display()))?;
        let wallet: WalletFile =
            serde_json::from_str(&content).context("wallet file is not valid JSON")?;
        let network = Network::from_str(&wallet.network)
            .with_context(|| format!("unrecognized network {:?}", wallet.network))?;
        let change_address = Address::from_str(&wallet.change_address)
            .context("invalid change address")?
            .require_network(network)
            .context("change address does not match the wallet's network")?;
        Ok(Self { utxos: wallet.utxos, change_address, fee_rate: wallet.fee_rate, network })
    }

    /// Build the `InscriptionRequest` fields this wallet supplies;
    /// `content`/`content_type` are filled in by the layer manager.
    #[must_use]
    pub fn request_template(&self) -> InscriptionRequest {
        InscriptionRequest {
            content: Vec::new(),
            content_type: String::new(),
            metadata: None,
            utxos: self
                .utxos
                .iter()
                .map(|u| originals_bitcoin::Utxo { txid: u.txid.clone(), vout: u.vout, value_sats: u.value_sats })
                .collect(),
            change_address: self.change_address.to_string(),
            fee_rate: self.fee_rate,
            network: self.network,
        }
    }

    fn find(&self, txid: &str, vout: u32) -> Result<&WalletUtxo> {
        self.utxos
            .iter()
            .find(|u| u.txid == txid && u.vout == vout)
            .with_context(|| format!("wallet has no key for utxo {txid}:{vout}"))
    }

    fn build_commit(&self, prepared: &PreparedCommit) -> Result<Transaction> {
        let secp = Secp256k1::new();

        let mut tx = Transaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input: prepared
                .selected_utxos
                .iter()
                .map(|u| -> Result<TxIn> {
                    Ok(TxIn {
                        previous_output: OutPoint { txid: Txid::from_str(&u.txid)?, vout: u.vout },
                        script_sig: ScriptBuf::new(),
                        sequence: Sequence::ENABLE_RBF_NO_LOCKTIME,
                        witness: Witness::new(),
                    })
                })
                .collect::<Result<_>>()?,
            output: Vec::new(),
        };

        // `CommitPlan::commit_address` comes from `Address::p2tr_tweaked`, already
        // a network-checked address, so no `require_network` round-trip is
        // needed here (unlike the wallet-file `change_address`, parsed from a
        // user-supplied string).
        tx.output.push(TxOut {
            value: prepared.commit_amount,
            script_pubkey: prepared.plan.commit_address.script_pubkey(),
        });

        let input_total: u64 = prepared.selected_utxos.iter().map(|u| u.value_sats).sum();
        let spent = prepared.commit_amount.to_sat() + prepared.commit_fee.to_sat();
        let change = input_total.saturating_sub(spent);
        if change > DUST_LIMIT_SATS {
            tx.output.push(TxOut {
                value: Amount::from_sat(change),
                script_pubkey: self.change_address.script_pubkey(),
            });
        }

        let prevout_scripts: Vec<ScriptBuf> = prepared
            .selected_utxos
            .iter()
            .map(|u| {
                let wallet_utxo = self.find(&u.txid, u.vout)?;
                let privkey = PrivateKey::from_wif(&wallet_utxo.private_key_wif)
                    .context("invalid WIF private key in wallet file")?;
                let pubkey = CompressedPublicKey::from_private_key(&secp, &privkey)
                    .context("wallet private key does not correspond to a compressed pubkey")?;
                Ok(ScriptBuf::new_p2wpkh(&pubkey.wpubkey_hash()))
            })
            .collect::<Result<_>>()?;

        let sighashes: Vec<_> = {
            let mut cache = SighashCache::new(&tx);
            (0..prepared.selected_utxos.len())
                .map(|i| {
                    let value = Amount::from_sat(prepared.selected_utxos[i].value_sats);
                    cache
                        .p2wpkh_signature_hash(i, &prevout_scripts[i], value, EcdsaSighashType::All)
                        .context("computing p2wpkh sighash")
                })
                .collect::<Result<_>>()?
        };

        for (i, u) in prepared.selected_utxos.iter().enumerate() {
            let wallet_utxo = self.find(&u.txid, u.vout)?;
            let privkey = PrivateKey::from_wif(&wallet_utxo.private_key_wif)?;
            let pubkey = CompressedPublicKey::from_private_key(&secp, &privkey)?;
            let msg = Message::from_digest(sighashes[i].to_byte_array());
            let sig = secp.sign_ecdsa(&msg, &privkey.inner);
            let mut sig_bytes = sig.serialize_der().to_vec();
            sig_bytes.push(EcdsaSighashType::All as u8);

            let mut witness = Witness::new();
            witness.push(sig_bytes);
            witness.push(pubkey.to_bytes());
            tx.input[i].witness = witness;
        }

        Ok(tx)
    }

    fn build_reveal(&self, prepared: &PreparedCommit, commit_txid: Txid) -> Result<Transaction> {
        let secp = Secp256k1::new();

        let mut tx = Transaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input: vec![TxIn {
                previous_output: OutPoint { txid: commit_txid, vout: 0 },
                script_sig: ScriptBuf::new(),
                sequence: Sequence::ENABLE_RBF_NO_LOCKTIME,
                witness: Witness::new(),
            }],
            output: vec![TxOut {
                value: Amount::from_sat(DUST_LIMIT_SATS),
                script_pubkey: self.change_address.script_pubkey(),
            }],
        };

        let prevouts =
            [TxOut { value: prepared.commit_amount, script_pubkey: prepared.plan.commit_address.script_pubkey() }];
        let leaf_hash = TapLeafHash::from_script(&prepared.plan.inscription_script, LeafVersion::TapScript);
        let sighash = {
            let mut cache = SighashCache::new(&tx);
            cache
                .taproot_script_spend_signature_hash(0, &Prevouts::All(&prevouts), leaf_hash, TapSighashType::Default)
                .context("computing taproot script-spend sighash")?
        };

        let msg = Message::from_digest(sighash.to_byte_array());
        let sig = secp.sign_schnorr_no_aux_rand(&msg, &prepared.reveal_keypair);
        let tap_sig = bitcoin::taproot::Signature { signature: sig, sighash_type: TapSighashType::Default };
        let control_block = prepared
            .plan
            .taproot_spend_info
            .control_block(&(prepared.plan.inscription_script.clone(), LeafVersion::TapScript))
            .context("taproot spend info has no control block for the inscription leaf")?;

        let mut witness = Witness::new();
        witness.push(tap_sig.serialize());
        witness.push(prepared.plan.inscription_script.as_bytes());
        witness.push(control_block.serialize());
        tx.input[0].witness = witness;

        Ok(tx)
    }
}

impl BitcoinInscriber for LocalInscriber {
    async fn inscribe(&self, request: InscriptionRequest) -> anyhow::Result<InscriptionResult> {
        let prepared = prepare_commit(&request)?;
        let commit_tx = self.build_commit(&prepared)?;
        let commit_txid = commit_tx.compute_txid();
        let reveal_tx = self.build_reveal(&prepared, commit_txid)?;
        let reveal_txid = reveal_tx.compute_txid();

        Ok(InscriptionResult {
            commit_txid: commit_txid.to_string(),
            reveal_txid: reveal_txid.to_string(),
            inscription_id: format!("{reveal_txid}i0"),
            satoshi: DUST_LIMIT_SATS,
        })
    }
}
