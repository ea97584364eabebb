//! Domain events and their distribution.
//!
//! Inventory mutations are recorded as events; after a mutation is committed
//! the events are wrapped in envelopes and published for audit consumers.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
