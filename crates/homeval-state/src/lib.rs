//! # Homeval State
//!
//! Observable lifecycle of prediction requests, sequenced by request token.

pub mod snapshot;
pub mod store;
pub mod subscription;

pub use snapshot::{LifecycleSnapshot, RequestToken};
pub use store::{InMemoryLifecycleStore, LifecycleStore};
pub use subscription::{LifecycleSubscription, TransitionEvent, TransitionFilter, TransitionStream};
