use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{EventLog, EventType};

/// The three durability layers an asset's identifier can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Content-derived, ephemeral, locally held.
    Peer,
    /// Published to a web domain with a versioned log.
    WebVh,
    /// Anchored to Bitcoin via an ordinal inscription. Terminal.
    Btco,
}

/// The asset state derived by replaying an [`EventLog`]. Never stored
/// directly; always recomputed from the log, which is the source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetState {
    /// The asset's current DID.
    pub did: String,
    /// Display name, if set by `create` or a later `update`.
    pub name: Option<String>,
    /// Current durability layer.
    pub layer: Layer,
    /// External resources bound to the asset.
    pub resources: Vec<Value>,
    /// DID of the original creator.
    pub creator: Option<String>,
    /// Creation timestamp, from the `create` event.
    pub created_at: Option<DateTime<Utc>>,
    /// Timestamp of the most recent `update`.
    pub updated_at: Option<DateTime<Utc>>,
    /// `true` once a `deactivate` event has been applied.
    pub deactivated: bool,
    /// Reason given at deactivation, if any.
    pub deactivation_reason: Option<String>,
    /// Accumulated metadata from `update` events whose fields are not
    /// recognized top-level state fields.
    pub metadata: serde_json::Map<String, Value>,
}

impl Default for AssetState {
    fn default() -> Self {
        Self {
            did: String::new(),
            name: None,
            layer: Layer::Peer,
            resources: Vec::new(),
            creator: None,
            created_at: None,
            updated_at: None,
            deactivated: false,
            deactivation_reason: None,
            metadata: serde_json::Map::new(),
        }
    }
}

/// Fold `log`'s events, in order, into the [`AssetState`] they describe.
///
/// `create` seeds identity and layer fields. `update` either records a
/// migration (when its data carries `sourceDid`/`targetDid`/`layer`) or
/// merges its remaining fields into `metadata`, except for the recognized
/// `name`/`resources`/`updatedAt` fields, which replace top-level state.
/// `deactivate` is terminal: later events (which `verify` would itself flag)
/// do not change `deactivated` back to `false`.
#[must_use]
pub fn current_state(log: &EventLog) -> AssetState {
    let mut state = AssetState::default();

    for entry in &log.events {
        match entry.event_type {
            EventType::Create => {
                state.did = str_field(&entry.data, "did").unwrap_or_default();
                state.name = str_field(&entry.data, "name");
                state.creator = str_field(&entry.data, "creator");
                state.created_at = datetime_field(&entry.data, "createdAt");
                if let Some(layer) = entry.data.get("layer").and_then(|v| v.as_str()) {
                    state.layer = parse_layer(layer).unwrap_or(Layer::Peer);
                }
                if let Some(resources) = entry.data.get("resources").and_then(|v| v.as_array()) {
                    state.resources = resources.clone();
                }
            }
            EventType::Update => {
                let is_migration = entry.data.get("sourceDid").is_some()
                    && entry.data.get("targetDid").is_some()
                    && entry.data.get("layer").is_some();
                if is_migration {
                    if let Some(target) = str_field(&entry.data, "targetDid") {
                        state.did = target;
                    }
                    if let Some(layer) = entry.data.get("layer").and_then(|v| v.as_str()) {
                        if let Some(parsed) = parse_layer(layer) {
                            state.layer = parsed;
                        }
                    }
                    state.updated_at = datetime_field(&entry.data, "migratedAt").or(state.updated_at);
                    continue;
                }

                if let Some(name) = str_field(&entry.data, "name") {
                    state.name = Some(name);
                }
                if let Some(resources) = entry.data.get("resources").and_then(|v| v.as_array()) {
                    state.resources = resources.clone();
                }
                state.updated_at = datetime_field(&entry.data, "updatedAt").or(state.updated_at);

                if let Value::Object(obj) = &entry.data {
                    for (k, v) in obj {
                        if matches!(k.as_str(), "name" | "resources" | "updatedAt") {
                            continue;
                        }
                        state.metadata.insert(k.clone(), v.clone());
                    }
                }
            }
            EventType::Deactivate => {
                state.deactivated = true;
                state.deactivation_reason = str_field(&entry.data, "reason");
            }
        }
    }

    state
}

fn str_field(data: &Value, key: &str) -> Option<String> {
    data.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

fn datetime_field(data: &Value, key: &str) -> Option<DateTime<Utc>> {
    data.get(key)
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_layer(s: &str) -> Option<Layer> {
    match s {
        "peer" => Some(Layer::Peer),
        "webvh" => Some(Layer::WebVh),
        "btco" => Some(Layer::Btco),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create, update, CelOptions};
    use originals_infosec::EphemeralSigner;

    #[tokio::test]
    async fn migration_event_updates_did_and_layer() {
        let signer = EphemeralSigner::generate();
        let log = create(
            serde_json::json!({"did": "did:peer:4abc", "layer": "peer", "name": "A"}),
            &signer,
            &CelOptions::default(),
        )
        .await
        .unwrap();

        let log = update(
            &log,
            serde_json::json!({
                "sourceDid": "did:peer:4abc",
                "targetDid": "did:webvh:example.com:xyz",
                "layer": "webvh",
                "domain": "example.com",
                "migratedAt": Utc::now().to_rfc3339(),
            }),
            &signer,
            &CelOptions::default(),
        )
        .await
        .unwrap();

        let state = current_state(&log);
        assert_eq!(state.did, "did:webvh:example.com:xyz");
        assert_eq!(state.layer, Layer::WebVh);
        assert_eq!(state.name.as_deref(), Some("A"));
    }
}
