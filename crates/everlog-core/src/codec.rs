//! Event codec — wire encoding and registry-routed decoding.

use std::sync::Arc;

use uuid::Uuid;

use crate::clock::Clock;
use crate::error::RepositoryError;
use crate::event::{EventData, EventMetadata, RecordedEvent, VersionedEvent};
use crate::registry::EventTypeRegistry;

/// Outcome of decoding one stored record.
///
/// An unresolved type identifier is an explicit outcome rather than an error
/// or a silent skip; the caller decides how to surface it. A malformed
/// payload for a resolved type is an error, never conflated with this.
#[derive(Debug)]
pub enum DecodeOutcome {
    /// The record decoded into a concrete event.
    Event(Box<dyn VersionedEvent>),
    /// The record's type identifier has no registered decoder.
    UnknownType,
}

/// Encodes domain events into store records and decodes them back through the
/// event type registry.
pub struct EventCodec {
    registry: Arc<EventTypeRegistry>,
    clock: Arc<dyn Clock>,
}

impl EventCodec {
    /// Creates a codec over an immutable registry.
    #[must_use]
    pub fn new(registry: Arc<EventTypeRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    /// Returns the registry this codec routes decodes through.
    #[must_use]
    pub fn registry(&self) -> &EventTypeRegistry {
        &self.registry
    }

    /// Encodes `event` into an appendable record carrying a fresh record id,
    /// the event's payload document, and a metadata document with the
    /// correlation identifier and encode timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Serialization`] if the event's fields
    /// cannot be encoded.
    pub fn encode(
        &self,
        event: &dyn VersionedEvent,
        correlation_id: Uuid,
    ) -> Result<EventData, RepositoryError> {
        let serialization_error = |source| RepositoryError::Serialization {
            event_type: event.event_type().to_owned(),
            source,
        };

        let payload = event.to_payload().map_err(serialization_error)?;
        let payload = serde_json::to_vec(&payload).map_err(serialization_error)?;

        let metadata = EventMetadata {
            correlation_id,
            occurred_at: self.clock.now(),
        };
        let metadata = serde_json::to_vec(&metadata).map_err(serialization_error)?;

        Ok(EventData {
            event_id: Uuid::new_v4(),
            event_type: event.event_type().to_owned(),
            payload,
            metadata,
        })
    }

    /// Decodes a stored record into a concrete event via the registry.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Serialization`] if the payload bytes are
    /// malformed for the resolved type.
    pub fn decode(&self, record: &RecordedEvent) -> Result<DecodeOutcome, RepositoryError> {
        let Some(decoder) = self.registry.decoder(&record.event_type) else {
            return Ok(DecodeOutcome::UnknownType);
        };

        let event = decoder(&record.payload).map_err(|source| RepositoryError::Serialization {
            event_type: record.event_type.clone(),
            source,
        })?;

        Ok(DecodeOutcome::Event(event))
    }
}
