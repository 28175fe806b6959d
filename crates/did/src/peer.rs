//! The `did:peer` layer: a content-derived, ephemeral identifier requiring
//! no network publication.

use chrono::Utc;
use multibase::Base;
use originals_cel::{create as cel_create, update as cel_update, CelOptions, EventLog};
use originals_codec::digest;
use originals_infosec::Signer;
use serde_json::Value;
use sha2::Digest as _;

use crate::Result;

/// Derive a `did:peer:4<base58btc(SHA-256(sorted resource digests)))>`
/// identifier. Pure function of the resource *set*: reordering the input
/// resources does not change the result.
#[must_use]
pub fn derive_did(resources: &[Value]) -> String {
    let mut digests: Vec<String> = resources
        .iter()
        .map(|r| {
            r.get("digest")
                .and_then(|d| d.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| digest(r).map(|d| d.to_string()).unwrap_or_default())
        })
        .collect();
    digests.sort();

    let joined = digests.join("");
    let hash = sha2::Sha256::digest(joined.as_bytes());
    let encoded = multibase::encode(Base::Base58Btc, hash);
    format!("did:peer:4{encoded}")
}

/// Create a new peer-layer asset log.
///
/// `data` must carry at least `name` and `resources` (as an array with a
/// `digest`/`mediaType` shape per `SPEC_FULL.md` §3's `ExternalReference`);
/// this function fills in `did`, `layer`, `creator`, and `createdAt`.
pub async fn create(
    name: &str,
    resources: Vec<Value>,
    creator: &str,
    signer: &impl Signer,
) -> Result<EventLog> {
    let did = derive_did(&resources);
    let data = serde_json::json!({
        "did": did,
        "name": name,
        "layer": "peer",
        "resources": resources,
        "creator": creator,
        "createdAt": Utc::now().to_rfc3339(),
    });
    Ok(cel_create(data, signer, &CelOptions::default()).await?)
}

/// Append an update to a peer-layer log. No side effects beyond the event
/// itself.
pub async fn update(log: &EventLog, data: Value, signer: &impl Signer) -> Result<EventLog> {
    Ok(cel_update(log, data, signer, &CelOptions::default()).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use originals_infosec::EphemeralSigner;

    #[test]
    fn did_is_order_independent() {
        let a = serde_json::json!({"digest": "uAAAA", "mediaType": "image/png"});
        let b = serde_json::json!({"digest": "uBBBB", "mediaType": "image/png"});
        assert_eq!(derive_did(&[a.clone(), b.clone()]), derive_did(&[b, a]));
    }

    #[tokio::test]
    async fn create_populates_required_fields() {
        let signer = EphemeralSigner::generate();
        let resources = vec![serde_json::json!({"digest": "uCCCC", "mediaType": "text/plain"})];
        let log = create("my-asset", resources, "did:key:zCreator", &signer).await.unwrap();
        let data = &log.events[0].data;
        assert_eq!(data["layer"], "peer");
        assert!(data["did"].as_str().unwrap().starts_with("did:peer:4"));
    }
}
