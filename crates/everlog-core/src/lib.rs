//! Everlog Core — event-sourced aggregate persistence.
//!
//! This crate reconstructs domain aggregates from append-only per-aggregate
//! event streams held by an external event store, and appends new events under
//! an optimistic-concurrency check. It contains no storage backend; stores
//! implement the traits in [`store`].

pub mod aggregate;
pub mod clock;
pub mod codec;
pub mod error;
pub mod event;
pub mod registry;
pub mod repository;
pub mod store;
pub mod stream;
