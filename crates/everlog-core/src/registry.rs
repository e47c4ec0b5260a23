//! Event type registry — build-once decode routing.

use std::collections::HashMap;

use crate::event::{EventPayload, VersionedEvent};

/// Decodes payload bytes into a concrete event.
pub type Decoder = fn(&[u8]) -> Result<Box<dyn VersionedEvent>, serde_json::Error>;

fn decode_payload<E: EventPayload>(bytes: &[u8]) -> Result<Box<dyn VersionedEvent>, serde_json::Error> {
    Ok(Box::new(serde_json::from_slice::<E>(bytes)?))
}

/// Builder for [`EventTypeRegistry`].
///
/// Register every event-capable type during process initialization, then
/// `build`. Registering the same identifier twice keeps the latest decoder.
#[derive(Debug, Default)]
pub struct EventTypeRegistryBuilder {
    decoders: HashMap<&'static str, Decoder>,
}

impl EventTypeRegistryBuilder {
    /// Registers `E` under its stable type identifier.
    #[must_use]
    pub fn register<E: EventPayload>(mut self) -> Self {
        self.decoders.insert(E::EVENT_TYPE, decode_payload::<E>);
        self
    }

    /// Freezes the registrations into an immutable registry.
    #[must_use]
    pub fn build(self) -> EventTypeRegistry {
        EventTypeRegistry {
            decoders: self.decoders,
        }
    }
}

/// Immutable mapping from stable event type identifier to decoder.
///
/// Built once before any repository is used; lookup is pure. An unresolved
/// identifier yields `None` — the caller decides how to surface it.
#[derive(Debug)]
pub struct EventTypeRegistry {
    decoders: HashMap<&'static str, Decoder>,
}

impl EventTypeRegistry {
    /// Starts an empty builder.
    #[must_use]
    pub fn builder() -> EventTypeRegistryBuilder {
        EventTypeRegistryBuilder::default()
    }

    /// Looks up the decoder for `event_type`.
    #[must_use]
    pub fn decoder(&self, event_type: &str) -> Option<Decoder> {
        self.decoders.get(event_type).copied()
    }

    /// Returns whether `event_type` has a registered decoder.
    #[must_use]
    pub fn contains(&self, event_type: &str) -> bool {
        self.decoders.contains_key(event_type)
    }

    /// Number of registered event types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    /// Returns whether no event types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::event::{EventPayload, VersionedEvent};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct NoteAdded {
        text: String,
    }

    impl VersionedEvent for NoteAdded {
        fn event_type(&self) -> &'static str {
            Self::EVENT_TYPE
        }

        fn to_payload(&self) -> serde_json::Result<serde_json::Value> {
            serde_json::to_value(self)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    impl EventPayload for NoteAdded {
        const EVENT_TYPE: &'static str = "notes.note.added";
    }

    #[test]
    fn lookup_hit_returns_working_decoder() {
        let registry = EventTypeRegistry::builder().register::<NoteAdded>().build();

        assert!(registry.contains(NoteAdded::EVENT_TYPE));
        assert_eq!(registry.len(), 1);

        let decoder = registry.decoder(NoteAdded::EVENT_TYPE).unwrap();
        let event = decoder(br#"{"text":"hello"}"#).unwrap();
        let note = event.as_any().downcast_ref::<NoteAdded>().unwrap();
        assert_eq!(note.text, "hello");
    }

    #[test]
    fn lookup_miss_returns_none() {
        let registry = EventTypeRegistry::builder().register::<NoteAdded>().build();

        assert!(registry.decoder("notes.note.removed").is_none());
        assert!(!registry.contains("notes.note.removed"));
    }

    #[test]
    fn empty_registry_resolves_nothing() {
        let registry = EventTypeRegistry::builder().build();

        assert!(registry.is_empty());
        assert!(registry.decoder(NoteAdded::EVENT_TYPE).is_none());
    }
}
