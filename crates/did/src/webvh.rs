//! The `did:webvh` layer: web-published, with a deterministic storage
//! layout and a versioned `did.jsonl` log.

use chrono::Utc;
use originals_cel::{current_state, update as cel_update, CelOptions, EventLog, Layer};
use originals_infosec::Signer;
use originals_storage::Storage;
use rand::Rng;
use serde_json::Value;

use crate::{require_layer, Result};

/// Generate a 64-bit random, base36, URL-safe slug for a new webvh
/// publication.
#[must_use]
pub fn generate_slug() -> String {
    let bits: u64 = rand::thread_rng().gen();
    radix_36(bits)
}

fn radix_36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while value > 0 {
        buf.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).expect("radix-36 alphabet is ASCII")
}

/// Migrate a peer-layer log to `domain`.
///
/// Publishes a DID document and the serialized log under the deterministic
/// webvh URL layout, uploads each resource, and appends a migration `update`
/// event linking the source and target DIDs.
///
/// # Errors
/// [`crate::LayerError::InvalidMigrationPath`] if `log`'s current layer is
/// not `peer`.
pub async fn migrate(
    log: &EventLog,
    domain: &str,
    storage: &impl Storage,
    signer: &impl Signer,
) -> Result<EventLog> {
    let state = current_state(log);
    require_layer(state.layer, Layer::Peer)?;

    let slug = generate_slug();
    let target_did = format!("did:webvh:{domain}:{slug}");

    let mut published_resources = Vec::with_capacity(state.resources.len());
    for resource in &state.resources {
        let digest = resource.get("digest").and_then(|d| d.as_str()).unwrap_or_default();
        let path = format!("assets/{slug}/{digest}");
        if let Some(bytes) = resource.get("content").and_then(|c| c.as_str()) {
            storage.put(domain, &path, bytes.as_bytes().to_vec()).await?;
        }
        let mut published = resource.clone();
        if let Value::Object(obj) = &mut published {
            obj.insert(
                "url".to_string(),
                Value::String(format!("https://{domain}/{path}")),
            );
        }
        published_resources.push(published);
    }

    let did_document = serde_json::json!({
        "@context": ["https://www.w3.org/ns/did/v1"],
        "id": target_did,
    });
    storage
        .put(
            domain,
            &format!(".well-known/did/{slug}/did.json"),
            serde_json::to_vec(&did_document).map_err(|e| anyhow::anyhow!(e))?,
        )
        .await?;
    storage
        .put(
            domain,
            &format!(".well-known/did/{slug}/did.jsonl"),
            serde_json::to_vec(log).map_err(|e| anyhow::anyhow!(e))?,
        )
        .await?;

    let data = serde_json::json!({
        "sourceDid": state.did,
        "targetDid": target_did,
        "layer": "webvh",
        "domain": domain,
        "resources": published_resources,
        "migratedAt": Utc::now().to_rfc3339(),
    });

    Ok(cel_update(log, data, signer, &CelOptions::default()).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use originals_infosec::EphemeralSigner;

    #[tokio::test]
    async fn migrate_appends_webvh_event_with_url_layout() {
        let signer = EphemeralSigner::generate();
        let storage = originals_storage::MemoryStorage::new();
        let resources = vec![serde_json::json!({"digest": "uAAAA", "mediaType": "text/plain", "content": "hi"})];
        let log = crate::peer::create("asset", resources, "did:key:zC", &signer).await.unwrap();

        let migrated = migrate(&log, "example.com", &storage, &signer).await.unwrap();
        assert_eq!(migrated.events.len(), 2);

        let data = &migrated.events[1].data;
        assert_eq!(data["layer"], "webvh");
        let target_did = data["targetDid"].as_str().unwrap();
        assert!(target_did.starts_with("did:webvh:example.com:"));
        let slug = target_did.rsplit(':').next().unwrap();

        let exists = storage
            .exists("example.com", &format!("assets/{slug}/uAAAA"))
            .await
            .unwrap();
        assert!(exists);
    }

    #[tokio::test]
    async fn migrate_from_non_peer_layer_fails() {
        let signer = EphemeralSigner::generate();
        let storage = originals_storage::MemoryStorage::new();
        let log = crate::peer::create("asset", vec![], "did:key:zC", &signer).await.unwrap();
        let migrated = migrate(&log, "example.com", &storage, &signer).await.unwrap();
        let err = migrate(&migrated, "other.com", &storage, &signer).await.unwrap_err();
        assert!(matches!(err, crate::LayerError::InvalidMigrationPath(_)));
    }
}
