//! External event-store interface.
//!
//! The store itself is an external collaborator; this module only defines the
//! seam a backend must implement: paged forward reads and scoped append
//! transactions with an expected-revision check.

use async_trait::async_trait;
use thiserror::Error;

use crate::event::{EventData, RecordedEvent};

/// One page of a forward stream read.
#[derive(Debug, Clone)]
pub struct StreamSlice {
    /// Records in stream order.
    pub events: Vec<RecordedEvent>,
    /// Position to pass as `start` for the next page.
    pub next_position: u64,
    /// Whether the stream has no records past this slice.
    pub is_end_of_stream: bool,
}

/// Errors surfaced by an event-store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The expected revision did not match the stream's persisted record
    /// count. The transaction appended nothing.
    #[error("wrong expected revision on stream {stream}: expected {expected}, actual {actual}")]
    WrongExpectedRevision {
        /// Stream the append targeted.
        stream: String,
        /// Revision the writer expected.
        expected: i64,
        /// Revision the store holds.
        actual: i64,
    },

    /// The backend could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Append-only event store keyed by stream name.
///
/// A stream's revision is the count of its persisted records; a stream that
/// was never written to has revision 0 and reads as empty rather than as an
/// error.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Reads up to `max_count` records from `stream`, forward from `start`.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the backend cannot serve the read.
    async fn read_stream_forward(
        &self,
        stream: &str,
        start: u64,
        max_count: usize,
    ) -> Result<StreamSlice, StoreError>;

    /// Opens a scoped append transaction against `stream`.
    ///
    /// `expected_revision` is the record count the writer believes the stream
    /// holds; the store validates it no later than commit.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the backend cannot open the transaction.
    async fn begin_transaction(
        &self,
        stream: &str,
        expected_revision: i64,
    ) -> Result<Box<dyn AppendTransaction>, StoreError>;
}

/// A scoped append transaction.
///
/// Commit is atomic: either every written record lands with contiguous,
/// increasing sequence numbers, or none does. Dropping an uncommitted
/// transaction aborts it; no handle outlives its scope.
#[async_trait]
pub trait AppendTransaction: Send {
    /// Buffers records for the commit.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the backend rejects the write.
    async fn write(&mut self, events: Vec<EventData>) -> Result<(), StoreError>;

    /// Validates the expected revision and appends all buffered records,
    /// returning the stream's new revision.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::WrongExpectedRevision`] on a revision mismatch,
    /// or another `StoreError` if the commit fails; in both cases nothing was
    /// appended.
    async fn commit(self: Box<Self>) -> Result<i64, StoreError>;
}
