//! Port for publishing row-change events.
//!
//! Services publish one event per successful mutation. Publishing is
//! fire-and-forget: a publisher must never fail the mutation that produced
//! the event.

use crate::domain::ChangeEvent;

/// Publisher side of the realtime change feed.
pub trait ChangePublisher: Send + Sync {
    /// Forward one event to current subscribers. Events from a single
    /// publisher call site are delivered in publish order.
    fn publish(&self, event: ChangeEvent);
}

/// Publisher that drops every event, for wiring without realtime consumers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopChangePublisher;

impl ChangePublisher for NoopChangePublisher {
    fn publish(&self, _event: ChangeEvent) {}
}
