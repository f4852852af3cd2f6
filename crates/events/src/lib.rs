//! Session events and the pub/sub mechanics that carry them.

pub mod bus;
pub mod identity;
pub mod in_memory_bus;

pub use bus::{EventBus, RecvTimeoutError, Subscription};
pub use identity::{IdentityTransition, TransitionKind};
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
