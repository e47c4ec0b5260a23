//! Event-sourced aggregate repository.
//!
//! Orchestrates load and save: resolves stream names, reads event pages,
//! decodes them through the codec, rehydrates aggregates, and appends new
//! events under the store's optimistic-concurrency check. Holds no locks and
//! no cross-call state; every call is independent.

use std::marker::PhantomData;
use std::sync::Arc;

use uuid::Uuid;

use crate::aggregate::{AggregateRoot, Rehydrate};
use crate::clock::Clock;
use crate::codec::{DecodeOutcome, EventCodec};
use crate::error::RepositoryError;
use crate::event::VersionedEvent;
use crate::registry::EventTypeRegistry;
use crate::store::{EventStore, StoreError};
use crate::stream::stream_name;

/// Records requested per forward read.
const PAGE_SIZE: usize = 4096;

/// Repository for one aggregate type over an external event store.
///
/// Public surface: [`find`], [`get`], [`save`].
///
/// [`find`]: EventSourcedRepository::find
/// [`get`]: EventSourcedRepository::get
/// [`save`]: EventSourcedRepository::save
pub struct EventSourcedRepository<A> {
    store: Arc<dyn EventStore>,
    codec: EventCodec,
    _aggregate: PhantomData<fn() -> A>,
}

impl<A> EventSourcedRepository<A>
where
    A: AggregateRoot + Rehydrate,
{
    /// Creates a repository, validating at wiring time that the registry can
    /// decode every event type `A` declares. A repository that cannot decode
    /// its own aggregate's events would fail on first load; failing here is
    /// cheaper to diagnose.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Construction`] naming the first declared
    /// event type with no registered decoder. No store interaction occurs.
    pub fn new(
        store: Arc<dyn EventStore>,
        registry: Arc<EventTypeRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RepositoryError> {
        for event_type in A::EVENT_TYPES.iter().copied() {
            if !registry.contains(event_type) {
                return Err(RepositoryError::Construction {
                    aggregate_type: A::AGGREGATE_TYPE,
                    event_type,
                });
            }
        }

        Ok(Self {
            store,
            codec: EventCodec::new(registry, clock),
            _aggregate: PhantomData,
        })
    }

    /// Loads the aggregate with `id`, or `None` if its stream has no records.
    ///
    /// Reads the stream forward in pages until the store reports the end,
    /// decodes each record, and rehydrates from the decoded events in order.
    /// Records with an unregistered type identifier are skipped from replay
    /// but counted and logged; the returned version then undercounts the
    /// stream revision.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Serialization`] for a malformed payload of
    /// a known type, or propagates any store failure unmodified.
    pub async fn find(&self, id: Uuid) -> Result<Option<A>, RepositoryError> {
        let stream = stream_name(A::AGGREGATE_TYPE, id);

        let mut history: Vec<Box<dyn VersionedEvent>> = Vec::new();
        let mut unknown = 0usize;
        let mut read_any = false;
        let mut position = 0u64;

        loop {
            let slice = self
                .store
                .read_stream_forward(&stream, position, PAGE_SIZE)
                .await?;

            read_any = read_any || !slice.events.is_empty();
            for record in &slice.events {
                match self.codec.decode(record)? {
                    DecodeOutcome::Event(event) => history.push(event),
                    DecodeOutcome::UnknownType => {
                        unknown += 1;
                        tracing::warn!(
                            stream = %stream,
                            sequence_number = record.sequence_number,
                            event_type = %record.event_type,
                            "skipping record with no registered decoder"
                        );
                    }
                }
            }

            if slice.is_end_of_stream {
                break;
            }
            position = slice.next_position;
        }

        if !read_any {
            return Ok(None);
        }

        if unknown > 0 {
            tracing::warn!(
                stream = %stream,
                skipped = unknown,
                replayed = history.len(),
                "replay skipped undecodable records; aggregate version undercounts the stream revision"
            );
        }

        Ok(Some(A::rehydrate(id, history)))
    }

    /// Loads the aggregate with `id`, treating an absent stream as an error.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if the stream has no records;
    /// otherwise as [`find`](EventSourcedRepository::find).
    pub async fn get(&self, id: Uuid) -> Result<A, RepositoryError> {
        self.find(id).await?.ok_or(RepositoryError::NotFound(id))
    }

    /// Appends the aggregate's uncommitted events to its stream, expecting
    /// the stream revision the instance was loaded at
    /// (`version - uncommitted count`). All-or-nothing: on success every
    /// event is durably appended and the uncommitted buffer is cleared; on
    /// failure nothing is appended and the buffer is left intact. An empty
    /// buffer is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Conflict`] if the store holds a different
    /// revision, [`RepositoryError::Serialization`] if an event cannot be
    /// encoded, or propagates any other store failure unmodified.
    pub async fn save(
        &self,
        aggregate: &mut A,
        correlation_id: Uuid,
    ) -> Result<(), RepositoryError> {
        let uncommitted = aggregate.uncommitted_events();
        if uncommitted.is_empty() {
            return Ok(());
        }

        let stream = stream_name(A::AGGREGATE_TYPE, aggregate.aggregate_id());
        #[allow(clippy::cast_possible_wrap)]
        let expected_revision = aggregate.version() - uncommitted.len() as i64;

        let mut encoded = Vec::with_capacity(uncommitted.len());
        for event in uncommitted {
            encoded.push(self.codec.encode(event.as_ref(), correlation_id)?);
        }
        let appended = encoded.len();

        // The transaction aborts on drop, so every early return below
        // releases it.
        let mut transaction = self
            .store
            .begin_transaction(&stream, expected_revision)
            .await
            .map_err(into_repository_error)?;
        transaction
            .write(encoded)
            .await
            .map_err(into_repository_error)?;
        let revision = transaction.commit().await.map_err(into_repository_error)?;

        tracing::debug!(
            stream = %stream,
            appended,
            revision,
            %correlation_id,
            "events appended"
        );

        aggregate.clear_uncommitted_events();
        Ok(())
    }
}

fn into_repository_error(err: StoreError) -> RepositoryError {
    match err {
        StoreError::WrongExpectedRevision {
            stream,
            expected,
            actual,
        } => RepositoryError::Conflict {
            stream,
            expected,
            actual,
        },
        other => RepositoryError::Store(other),
    }
}
