//! # Homeval SDK
//!
//! Client side of a valuation: submit a [`PropertyForm`](homeval_core::PropertyForm)
//! to the prediction service and observe the request lifecycle.

pub mod config;
pub mod controller;
pub mod transport;

pub use config::ClientConfig;
pub use controller::{PredictionRequestController, Settlement, FAILURE_MESSAGE};
pub use transport::{HttpTransport, Transport};

/// Prelude module for common imports.
pub mod prelude {
    pub use crate::config::ClientConfig;
    pub use crate::controller::{PredictionRequestController, Settlement, FAILURE_MESSAGE};
    pub use crate::transport::{HttpTransport, Transport};
    pub use homeval_core::prelude::*;
    pub use homeval_state::{LifecycleSubscription, TransitionFilter};
}
