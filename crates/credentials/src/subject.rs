use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reference to the credential a chained credential continues from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousCredential {
    /// The prior credential's `id`.
    pub id: String,
    /// SHA-256 (multibase) of the prior credential's canonical form.
    pub hash: originals_codec::DigestMultibase,
}

/// The four typed credential subjects this workspace issues.
///
/// Represented as an untagged enum so a deserialized credential's shape
/// determines its kind, matching how the rest of this workspace treats
/// event `data` as dynamically-shaped JSON with typed overlays.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Subject {
    /// A new resource (and its owning asset) was created.
    ResourceCreated(ResourceCreated),
    /// An existing resource was updated.
    ResourceUpdated(ResourceUpdated),
    /// An asset migrated between layers.
    MigrationCompleted(MigrationCompleted),
    /// An asset's ownership changed hands.
    OwnershipTransferred(OwnershipTransferred),
}

impl Subject {
    /// The credential `type` entry this subject corresponds to.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::ResourceCreated(_) => "ResourceCreated",
            Self::ResourceUpdated(_) => "ResourceUpdated",
            Self::MigrationCompleted(_) => "MigrationCompleted",
            Self::OwnershipTransferred(_) => "OwnershipTransferred",
        }
    }

    /// Inject (or replace) the chaining reference, if this subject variant
    /// supports it. All four variants do.
    pub fn set_previous_credential(&mut self, previous: PreviousCredential) {
        let slot = match self {
            Self::ResourceCreated(s) => &mut s.previous_credential,
            Self::ResourceUpdated(s) => &mut s.previous_credential,
            Self::MigrationCompleted(s) => &mut s.previous_credential,
            Self::OwnershipTransferred(s) => &mut s.previous_credential,
        };
        *slot = Some(previous);
    }

    /// The chaining reference, if present.
    #[must_use]
    pub fn previous_credential(&self) -> Option<&PreviousCredential> {
        match self {
            Self::ResourceCreated(s) => s.previous_credential.as_ref(),
            Self::ResourceUpdated(s) => s.previous_credential.as_ref(),
            Self::MigrationCompleted(s) => s.previous_credential.as_ref(),
            Self::OwnershipTransferred(s) => s.previous_credential.as_ref(),
        }
    }
}

/// Subject of a `ResourceCreated` credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCreated {
    /// The asset DID the resource belongs to.
    pub id: String,
    /// Resource identifier (typically its digest).
    pub resource_id: String,
    /// Resource kind, e.g. `"image"`.
    pub resource_type: String,
    /// Content digest.
    pub content_hash: originals_codec::DigestMultibase,
    /// MIME type.
    pub content_type: String,
    /// Creator's DID.
    pub creator: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Chaining reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_credential: Option<PreviousCredential>,
}

/// Subject of a `ResourceUpdated` credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceUpdated {
    /// Resource identifier.
    pub resource_id: String,
    /// Digest before the update.
    pub previous_hash: originals_codec::DigestMultibase,
    /// Digest after the update.
    pub new_hash: originals_codec::DigestMultibase,
    /// Version number before the update.
    pub from_version: u64,
    /// Version number after the update.
    pub to_version: u64,
    /// When the update occurred.
    pub updated_at: DateTime<Utc>,
    /// Why the update was made.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_reason: Option<String>,
    /// Chaining reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_credential: Option<PreviousCredential>,
}

/// Subject of a `MigrationCompleted` credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationCompleted {
    /// DID before migration.
    pub source_did: String,
    /// DID after migration, once assigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_did: Option<String>,
    /// Layer migrated from.
    pub from_layer: String,
    /// Layer migrated to.
    pub to_layer: String,
    /// When the migration completed.
    pub migrated_at: DateTime<Utc>,
    /// Bitcoin transaction id, for btco migrations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
    /// Inscription id, for btco migrations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inscription_id: Option<String>,
    /// Satoshi count carried by the inscription, for btco migrations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub satoshi: Option<u64>,
    /// Why the migration was made.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migration_reason: Option<String>,
    /// Chaining reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_credential: Option<PreviousCredential>,
}

/// Subject of an `OwnershipTransferred` credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipTransferred {
    /// Previous owner (address or DID).
    pub previous_owner: String,
    /// New owner (address or DID).
    pub new_owner: String,
    /// Bitcoin transaction id carrying the transfer.
    pub transaction_id: String,
    /// When the transfer occurred.
    pub transferred_at: DateTime<Utc>,
    /// Satoshi count of the transferred output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub satoshi: Option<u64>,
    /// Why the transfer was made.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_reason: Option<String>,
    /// Chaining reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_credential: Option<PreviousCredential>,
}
