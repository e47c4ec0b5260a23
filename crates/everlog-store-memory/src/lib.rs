//! In-memory `EventStore` backend.
//!
//! Keeps every stream in a mutexed map with the same observable semantics the
//! repository expects from a real store: paged forward reads, commit-time
//! expected-revision validation, contiguous sequence numbers, and transactions
//! that leave no trace when dropped uncommitted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use everlog_core::event::{EventData, RecordedEvent};
use everlog_core::store::{AppendTransaction, EventStore, StoreError, StreamSlice};

type Streams = Arc<Mutex<HashMap<String, Vec<RecordedEvent>>>>;

/// An event store holding all streams in process memory.
///
/// Cloning shares the underlying streams.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventStore {
    streams: Streams,
}

impl InMemoryEventStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the persisted record count of `stream`; zero for a stream
    /// that was never written to.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn stream_revision(&self, stream: &str) -> i64 {
        self.streams
            .lock()
            .unwrap()
            .get(stream)
            .map_or(0, Vec::len) as i64
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn read_stream_forward(
        &self,
        stream: &str,
        start: u64,
        max_count: usize,
    ) -> Result<StreamSlice, StoreError> {
        let streams = self.streams.lock().unwrap();
        let records = streams.get(stream).map(Vec::as_slice).unwrap_or_default();

        let start = usize::try_from(start).unwrap_or(records.len());
        let end = start.saturating_add(max_count).min(records.len());
        let events = records.get(start..end).unwrap_or_default().to_vec();

        Ok(StreamSlice {
            events,
            next_position: end as u64,
            is_end_of_stream: end >= records.len(),
        })
    }

    async fn begin_transaction(
        &self,
        stream: &str,
        expected_revision: i64,
    ) -> Result<Box<dyn AppendTransaction>, StoreError> {
        Ok(Box::new(InMemoryTransaction {
            streams: Arc::clone(&self.streams),
            stream: stream.to_owned(),
            expected_revision,
            pending: Vec::new(),
        }))
    }
}

/// A buffered append; nothing touches the shared map until `commit`, so a
/// dropped transaction aborts by construction.
struct InMemoryTransaction {
    streams: Streams,
    stream: String,
    expected_revision: i64,
    pending: Vec<EventData>,
}

#[async_trait]
impl AppendTransaction for InMemoryTransaction {
    async fn write(&mut self, events: Vec<EventData>) -> Result<(), StoreError> {
        self.pending.extend(events);
        Ok(())
    }

    #[allow(clippy::cast_possible_wrap)]
    async fn commit(self: Box<Self>) -> Result<i64, StoreError> {
        let this = *self;
        let mut streams = this.streams.lock().unwrap();

        // Revision is validated and the append applied under one lock hold.
        let actual = streams.get(&this.stream).map_or(0, Vec::len) as i64;
        if actual != this.expected_revision {
            return Err(StoreError::WrongExpectedRevision {
                stream: this.stream,
                expected: this.expected_revision,
                actual,
            });
        }

        let records = streams.entry(this.stream.clone()).or_default();
        for (offset, event) in this.pending.into_iter().enumerate() {
            records.push(RecordedEvent {
                stream: this.stream.clone(),
                sequence_number: actual + offset as i64,
                event_id: event.event_id,
                event_type: event.event_type,
                payload: event.payload,
                metadata: event.metadata,
            });
        }

        Ok(records.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn event_data(event_type: &str) -> EventData {
        EventData {
            event_id: Uuid::new_v4(),
            event_type: event_type.to_owned(),
            payload: b"{}".to_vec(),
            metadata: b"{}".to_vec(),
        }
    }

    async fn append(
        store: &InMemoryEventStore,
        stream: &str,
        expected_revision: i64,
        count: usize,
    ) -> Result<i64, StoreError> {
        let mut tx = store.begin_transaction(stream, expected_revision).await?;
        let events = (0..count).map(|_| event_data("orders.order.placed")).collect();
        tx.write(events).await?;
        tx.commit().await
    }

    #[tokio::test]
    async fn append_assigns_contiguous_sequence_numbers() {
        let store = InMemoryEventStore::new();

        append(&store, "Order-a", 0, 2).await.unwrap();
        append(&store, "Order-a", 2, 3).await.unwrap();

        let slice = store.read_stream_forward("Order-a", 0, 100).await.unwrap();
        let sequence: Vec<i64> = slice.events.iter().map(|e| e.sequence_number).collect();
        assert_eq!(sequence, vec![0, 1, 2, 3, 4]);
        assert!(slice.is_end_of_stream);
        assert_eq!(store.stream_revision("Order-a"), 5);
    }

    #[tokio::test]
    async fn absent_stream_reads_as_empty_end_of_stream() {
        let store = InMemoryEventStore::new();

        let slice = store.read_stream_forward("Order-missing", 0, 10).await.unwrap();

        assert!(slice.events.is_empty());
        assert!(slice.is_end_of_stream);
        assert_eq!(slice.next_position, 0);
    }

    #[tokio::test]
    async fn reads_paginate_with_next_position() {
        let store = InMemoryEventStore::new();
        append(&store, "Order-a", 0, 5).await.unwrap();

        let first = store.read_stream_forward("Order-a", 0, 2).await.unwrap();
        assert_eq!(first.events.len(), 2);
        assert_eq!(first.next_position, 2);
        assert!(!first.is_end_of_stream);

        let second = store
            .read_stream_forward("Order-a", first.next_position, 2)
            .await
            .unwrap();
        assert_eq!(second.events.len(), 2);
        assert!(!second.is_end_of_stream);

        let last = store
            .read_stream_forward("Order-a", second.next_position, 2)
            .await
            .unwrap();
        assert_eq!(last.events.len(), 1);
        assert!(last.is_end_of_stream);
    }

    #[tokio::test]
    async fn commit_with_wrong_expected_revision_appends_nothing() {
        let store = InMemoryEventStore::new();
        append(&store, "Order-a", 0, 2).await.unwrap();

        let err = append(&store, "Order-a", 0, 1).await.unwrap_err();

        match err {
            StoreError::WrongExpectedRevision {
                expected, actual, ..
            } => {
                assert_eq!(expected, 0);
                assert_eq!(actual, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.stream_revision("Order-a"), 2);
    }

    #[tokio::test]
    async fn conflicting_commit_does_not_create_the_stream() {
        let store = InMemoryEventStore::new();

        let err = append(&store, "Order-a", 1, 1).await.unwrap_err();

        assert!(matches!(err, StoreError::WrongExpectedRevision { .. }));
        assert_eq!(store.stream_revision("Order-a"), 0);
    }

    #[tokio::test]
    async fn dropped_transaction_leaves_no_trace() {
        let store = InMemoryEventStore::new();

        {
            let mut tx = store.begin_transaction("Order-a", 0).await.unwrap();
            tx.write(vec![event_data("orders.order.placed")])
                .await
                .unwrap();
            // Dropped without commit.
        }

        assert_eq!(store.stream_revision("Order-a"), 0);
        append(&store, "Order-a", 0, 1).await.unwrap();
        assert_eq!(store.stream_revision("Order-a"), 1);
    }

    #[tokio::test]
    async fn commit_preserves_record_identity_and_bytes() {
        let store = InMemoryEventStore::new();
        let data = event_data("orders.order.placed");
        let event_id = data.event_id;

        let mut tx = store.begin_transaction("Order-a", 0).await.unwrap();
        tx.write(vec![data]).await.unwrap();
        let revision = tx.commit().await.unwrap();
        assert_eq!(revision, 1);

        let slice = store.read_stream_forward("Order-a", 0, 10).await.unwrap();
        let record = &slice.events[0];
        assert_eq!(record.event_id, event_id);
        assert_eq!(record.stream, "Order-a");
        assert_eq!(record.payload, b"{}");
    }
}
