//! Event bus (component H): in-process publish/subscribe for domain events,
//! fanned out to WebSocket subscribers and the webhook trigger.

mod bus;

pub use bus::{DEFAULT_CAPACITY, Event, EventBus};
