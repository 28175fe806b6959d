use originals_codec::DigestMultibase;
use originals_infosec::Proof;
use serde::{Deserialize, Serialize};

/// The kind of lifecycle transition a [`LogEntry`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// The asset's first event. Exactly one per log, always at index 0.
    Create,
    /// A mutation, migration, or other non-terminal change.
    Update,
    /// A terminal event; no further events may follow.
    Deactivate,
}

/// One entry in a [`EventLog`].
///
/// `data` is an opaque JSON payload whose shape depends on `event_type` and
/// the layer manager that produced it (see `originals-did`'s
/// `PeerAssetData`/`MigrationEventData` overlays).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// The kind of event.
    #[serde(rename = "type")]
    pub event_type: EventType,

    /// Event-specific payload.
    pub data: serde_json::Value,

    /// Digest of the canonical form of the previous entry. Absent only on
    /// the first entry of a log.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_event: Option<DigestMultibase>,

    /// Signatures over this entry's `data`. The first is the controller's
    /// proof; any additional entries are witness attestations.
    pub proof: Vec<Proof>,
}

/// An ordered, hash-chained sequence of signed [`LogEntry`] values describing
/// an asset's entire lifecycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    /// The entries, in append order. `events[0].event_type == Create`.
    pub events: Vec<LogEntry>,

    /// Digest of a prior log segment. Defined for forward-compatible log
    /// segmentation; never consulted by `verify`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_log: Option<DigestMultibase>,
}

impl EventLog {
    /// `true` if the most recent event is a `deactivate`.
    #[must_use]
    pub fn is_deactivated(&self) -> bool {
        matches!(self.events.last(), Some(e) if e.event_type == EventType::Deactivate)
    }
}
