//! Test stores — `EventStore` doubles for failure paths.

use async_trait::async_trait;
use everlog_core::store::{AppendTransaction, EventStore, StoreError, StreamSlice};

/// An event store whose every operation fails with an infrastructure error.
/// Useful for testing error-propagation paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingEventStore;

#[async_trait]
impl EventStore for FailingEventStore {
    async fn read_stream_forward(
        &self,
        _stream: &str,
        _start: u64,
        _max_count: usize,
    ) -> Result<StreamSlice, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn begin_transaction(
        &self,
        _stream: &str,
        _expected_revision: i64,
    ) -> Result<Box<dyn AppendTransaction>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}
