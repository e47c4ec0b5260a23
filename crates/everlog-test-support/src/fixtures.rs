//! Fixture order-taking domain shared by integration tests.

use std::any::Any;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use everlog_core::aggregate::{AggregateRoot, Rehydrate};
use everlog_core::event::{EventPayload, VersionedEvent};
use everlog_core::registry::EventTypeRegistry;

/// Emitted when an order is placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlaced {
    /// The placed order.
    pub order_id: Uuid,
    /// Name of the ordering customer.
    pub customer_name: String,
}

impl VersionedEvent for OrderPlaced {
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

impl EventPayload for OrderPlaced {
    const EVENT_TYPE: &'static str = "orders.order.placed";
}

/// Emitted when an order is cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelled {
    /// The cancelled order.
    pub order_id: Uuid,
}

impl VersionedEvent for OrderCancelled {
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

impl EventPayload for OrderCancelled {
    const EVENT_TYPE: &'static str = "orders.order.cancelled";
}

/// Registry covering the order fixture events (and nothing else).
#[must_use]
pub fn order_registry() -> EventTypeRegistry {
    EventTypeRegistry::builder()
        .register::<OrderPlaced>()
        .register::<OrderCancelled>()
        .build()
}

/// Fixture aggregate: tracks the most recently placed order.
#[derive(Debug)]
pub struct Order {
    id: Uuid,
    version: i64,
    order_id: Option<Uuid>,
    customer_name: Option<String>,
    cancelled: bool,
    uncommitted: Vec<Box<dyn VersionedEvent>>,
}

impl Order {
    /// Creates a fresh order aggregate with no history.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            order_id: None,
            customer_name: None,
            cancelled: false,
            uncommitted: Vec::new(),
        }
    }

    /// Places an order; each placement overwrites the previous one.
    pub fn place(&mut self, order_id: Uuid, customer_name: impl Into<String>) {
        self.record(Box::new(OrderPlaced {
            order_id,
            customer_name: customer_name.into(),
        }));
    }

    /// Cancels an order.
    pub fn cancel(&mut self, order_id: Uuid) {
        self.record(Box::new(OrderCancelled { order_id }));
    }

    /// The most recently placed order, if any.
    #[must_use]
    pub fn order_id(&self) -> Option<Uuid> {
        self.order_id
    }

    /// The customer of the most recently placed order, if any.
    #[must_use]
    pub fn customer_name(&self) -> Option<&str> {
        self.customer_name.as_deref()
    }

    /// Whether a cancellation was applied.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    fn record(&mut self, event: Box<dyn VersionedEvent>) {
        self.apply(event.as_ref());
        self.uncommitted.push(event);
    }

    fn apply(&mut self, event: &dyn VersionedEvent) {
        if let Some(placed) = event.as_any().downcast_ref::<OrderPlaced>() {
            self.order_id = Some(placed.order_id);
            self.customer_name = Some(placed.customer_name.clone());
        } else if event.as_any().downcast_ref::<OrderCancelled>().is_some() {
            self.cancelled = true;
        }
        self.version += 1;
    }
}

impl AggregateRoot for Order {
    const AGGREGATE_TYPE: &'static str = "Order";
    const EVENT_TYPES: &'static [&'static str] =
        &[OrderPlaced::EVENT_TYPE, OrderCancelled::EVENT_TYPE];

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn uncommitted_events(&self) -> &[Box<dyn VersionedEvent>] {
        &self.uncommitted
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted.clear();
    }
}

impl Rehydrate for Order {
    fn rehydrate(id: Uuid, history: Vec<Box<dyn VersionedEvent>>) -> Self {
        let mut order = Self::new(id);
        for event in &history {
            order.apply(event.as_ref());
        }
        order
    }
}

/// Emitted when a shipment is dispatched. Deliberately absent from
/// [`order_registry`] so construction-failure paths have a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentDispatched {
    /// The dispatched shipment.
    pub shipment_id: Uuid,
}

impl VersionedEvent for ShipmentDispatched {
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

impl EventPayload for ShipmentDispatched {
    const EVENT_TYPE: &'static str = "shipments.shipment.dispatched";
}

/// Fixture aggregate whose event type is never registered.
#[derive(Debug)]
pub struct Shipment {
    id: Uuid,
    version: i64,
    uncommitted: Vec<Box<dyn VersionedEvent>>,
}

impl AggregateRoot for Shipment {
    const AGGREGATE_TYPE: &'static str = "Shipment";
    const EVENT_TYPES: &'static [&'static str] = &[ShipmentDispatched::EVENT_TYPE];

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn uncommitted_events(&self) -> &[Box<dyn VersionedEvent>] {
        &self.uncommitted
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted.clear();
    }
}

impl Rehydrate for Shipment {
    #[allow(clippy::cast_possible_wrap)]
    fn rehydrate(id: Uuid, history: Vec<Box<dyn VersionedEvent>>) -> Self {
        Self {
            id,
            version: history.len() as i64,
            uncommitted: Vec::new(),
        }
    }
}
