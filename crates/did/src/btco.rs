//! The `did:btco` layer: Bitcoin-anchored via an ordinal inscription.
//! Terminal — no further layer migration is possible once reached.

use chrono::Utc;
use originals_bitcoin::{BitcoinInscriber, InscriptionRequest};
use originals_cel::{current_state, update as cel_update, CelOptions, EventLog, Layer};
use originals_codec::encode_cbor;
use originals_infosec::Signer;

use crate::{require_layer, Result};

/// Migrate a webvh-layer log to Bitcoin by inscribing its CBOR serialization
/// via `inscriber`.
///
/// # Errors
/// [`crate::LayerError::InvalidMigrationPath`] if `log`'s current layer is
/// not `webvh`. Direct peer → btco migration is always rejected this way.
pub async fn migrate(
    log: &EventLog,
    inscriber: &impl BitcoinInscriber,
    mut request: InscriptionRequest,
    signer: &impl Signer,
) -> Result<EventLog> {
    let state = current_state(log);
    require_layer(state.layer, Layer::WebVh)?;

    request.content = encode_cbor(log)?;
    request.content_type = "application/cel+cbor".to_string();

    let result = inscriber.inscribe(request).await?;
    let target_did = format!("did:btco:{}", result.inscription_id);

    let data = serde_json::json!({
        "sourceDid": state.did,
        "targetDid": target_did,
        "layer": "btco",
        "txid": result.reveal_txid,
        "inscriptionId": result.inscription_id,
        "satoshi": result.satoshi,
        "migratedAt": Utc::now().to_rfc3339(),
    });

    Ok(cel_update(log, data, signer, &CelOptions::default()).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use originals_bitcoin::{InscriptionResult, Utxo};
    use originals_infosec::EphemeralSigner;
    use originals_storage::MemoryStorage;

    struct FakeInscriber;

    impl BitcoinInscriber for FakeInscriber {
        async fn inscribe(&self, _request: InscriptionRequest) -> anyhow::Result<InscriptionResult> {
            Ok(InscriptionResult {
                commit_txid: "c".repeat(64),
                reveal_txid: "r".repeat(64),
                inscription_id: format!("{}i0", "r".repeat(64)),
                satoshi: 546,
            })
        }
    }

    fn sample_request() -> InscriptionRequest {
        InscriptionRequest {
            content: vec![],
            content_type: String::new(),
            metadata: None,
            utxos: vec![Utxo { txid: "a".into(), vout: 0, value_sats: 100_000 }],
            change_address: "tb1qchange".into(),
            fee_rate: 10,
            network: originals_bitcoin::Network::Signet,
        }
    }

    #[tokio::test]
    async fn migrate_from_webvh_succeeds() {
        let signer = EphemeralSigner::generate();
        let storage = MemoryStorage::new();
        let log = crate::peer::create("asset", vec![], "did:key:zC", &signer).await.unwrap();
        let log = crate::webvh::migrate(&log, "example.com", &storage, &signer).await.unwrap();

        let log = migrate(&log, &FakeInscriber, sample_request(), &signer).await.unwrap();
        let data = &log.events[2].data;
        assert_eq!(data["layer"], "btco");
        assert!(data["targetDid"].as_str().unwrap().starts_with("did:btco:"));
    }

    #[tokio::test]
    async fn direct_peer_to_btco_is_rejected() {
        let signer = EphemeralSigner::generate();
        let log = crate::peer::create("asset", vec![], "did:key:zC", &signer).await.unwrap();
        let err = migrate(&log, &FakeInscriber, sample_request(), &signer).await.unwrap_err();
        assert!(matches!(err, crate::LayerError::InvalidMigrationPath(_)));
    }
}
