//! Domain event abstractions and wire records.

use std::any::Any;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trait that all versioned domain events implement.
///
/// Object-safe so that replayed histories can carry events of mixed concrete
/// types; aggregates recover the concrete type through [`as_any`].
///
/// [`as_any`]: VersionedEvent::as_any
pub trait VersionedEvent: Send + Sync + std::fmt::Debug + 'static {
    /// Returns the stable type identifier used on the wire.
    fn event_type(&self) -> &'static str;

    /// Projects the event's fields into a JSON document.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if a field cannot be represented as JSON.
    fn to_payload(&self) -> serde_json::Result<serde_json::Value>;

    /// Upcasts to `Any` for downcasting during replay.
    fn as_any(&self) -> &dyn Any;
}

/// Registration-side contract for event types.
///
/// Every type registered with the
/// [`EventTypeRegistry`](crate::registry::EventTypeRegistry) implements this:
/// the serde bounds let the registry derive a decoder, and `EVENT_TYPE` is the
/// stable identifier stored on every record. The identifier must never change
/// once events of the type have been persisted — doing so orphans historical
/// records. Convention: `{module}.{aggregate}.{action}`.
pub trait EventPayload: VersionedEvent + Serialize + DeserializeOwned + Sized {
    /// Stable type identifier for this event type.
    const EVENT_TYPE: &'static str;
}

/// Metadata attached to every persisted event record.
///
/// Serialized as one JSON document alongside the payload; camelCase on the
/// wire (`{"correlationId": ..., "occurredAt": ...}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    /// Links the record to the request that produced it.
    pub correlation_id: Uuid,
    /// Timestamp of event encoding.
    pub occurred_at: DateTime<Utc>,
}

/// An encoded event handed to the store for append.
#[derive(Debug, Clone)]
pub struct EventData {
    /// Unique record identifier.
    pub event_id: Uuid,
    /// Stable type identifier for decode routing.
    pub event_type: String,
    /// Encoded payload document.
    pub payload: Vec<u8>,
    /// Encoded metadata document.
    pub metadata: Vec<u8>,
}

/// The persisted form of one event, as read back from a stream.
#[derive(Debug, Clone)]
pub struct RecordedEvent {
    /// Stream the record belongs to.
    pub stream: String,
    /// Zero-based position within the stream.
    pub sequence_number: i64,
    /// Unique record identifier.
    pub event_id: Uuid,
    /// Stable type identifier for decode routing.
    pub event_type: String,
    /// Encoded payload document.
    pub payload: Vec<u8>,
    /// Encoded metadata document.
    pub metadata: Vec<u8>,
}
