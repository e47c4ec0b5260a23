//! Shared test doubles and fixtures for everlog.

mod clock;
mod fixtures;
mod store;

pub use clock::FixedClock;
pub use fixtures::{
    Order, OrderCancelled, OrderPlaced, Shipment, ShipmentDispatched, order_registry,
};
pub use store::FailingEventStore;
