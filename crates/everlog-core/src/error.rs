//! Repository error types.

use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

/// Top-level repository error type.
///
/// `NotFound` and `Conflict` are expected, recoverable outcomes in normal
/// operation; `Construction` and `Serialization` indicate a programming or
/// data-integrity defect. Nothing is retried or translated beyond what is
/// stated per variant.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// `get` was called for an identifier with no corresponding stream.
    /// `find` returns an empty result instead.
    #[error("aggregate not found: {0}")]
    NotFound(Uuid),

    /// Repository construction failed because the registry cannot decode one
    /// of the aggregate's declared event types. Fatal to the instance; fix
    /// the wiring, do not retry.
    #[error("cannot construct repository for {aggregate_type}: no decoder registered for event type {event_type}")]
    Construction {
        /// The aggregate type the repository was built for.
        aggregate_type: &'static str,
        /// The declared event type with no registered decoder.
        event_type: &'static str,
    },

    /// Payload bytes are structurally malformed for a resolved event type.
    /// Distinct from an unresolved type identifier, which is not an error.
    #[error("serialization failure for event type {event_type}: {source}")]
    Serialization {
        /// The event type whose payload could not be (de)serialized.
        event_type: String,
        /// The underlying serde failure.
        #[source]
        source: serde_json::Error,
    },

    /// The store rejected a save because the expected revision did not match
    /// the stream's current revision. The caller must re-load, reapply, and
    /// re-save.
    #[error("concurrency conflict on stream {stream}: expected revision {expected}, actual {actual}")]
    Conflict {
        /// Stream the save targeted.
        stream: String,
        /// Revision the save expected.
        expected: i64,
        /// Revision the store holds.
        actual: i64,
    },

    /// Any other store failure, propagated unmodified.
    #[error(transparent)]
    Store(#[from] StoreError),
}
