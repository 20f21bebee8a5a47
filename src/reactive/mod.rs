//! Reactive layer: a typed synchronous event emitter plus the domain events
//! exposed to subscribers (cache changes and per-record mutation status).

mod emitter;
mod event;

pub use emitter::{EventEmitter, SubscriberFn, SubscriptionId};
pub use event::{CacheEvent, OnlineEvent, StatusEvent};
