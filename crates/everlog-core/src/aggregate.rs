//! Aggregate root abstraction.

use uuid::Uuid;

use crate::event::VersionedEvent;

/// Trait for aggregate roots whose state derives from an event stream.
///
/// `version` counts every event applied to the in-memory instance, including
/// uncommitted ones; the stream revision counts persisted records only. The
/// repository relies on `version - uncommitted_events().len()` equaling the
/// stream revision the instance was loaded at.
pub trait AggregateRoot: Send + Sync {
    /// Type name used as the stream name prefix.
    const AGGREGATE_TYPE: &'static str;

    /// Stable identifiers of every event type this aggregate produces or
    /// replays. Checked against the registry at repository construction.
    const EVENT_TYPES: &'static [&'static str];

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Returns the current version (number of events applied).
    fn version(&self) -> i64;

    /// Returns events produced since the last load or save, in order.
    fn uncommitted_events(&self) -> &[Box<dyn VersionedEvent>];

    /// Clears the uncommitted buffer after a successful save.
    fn clear_uncommitted_events(&mut self);
}

/// Reconstruction capability: builds an aggregate from its identifier and the
/// ordered events replayed from its stream.
///
/// This is the explicit contract the repository binds to at construction; an
/// aggregate type without it cannot have a repository at all.
pub trait Rehydrate: AggregateRoot + Sized {
    /// Rebuilds the aggregate by applying `history` in order to a fresh
    /// instance. The result carries `version() == history.len()` and an empty
    /// uncommitted buffer.
    fn rehydrate(id: Uuid, history: Vec<Box<dyn VersionedEvent>>) -> Self;
}
