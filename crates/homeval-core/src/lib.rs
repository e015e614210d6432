//! # Homeval Core
//!
//! Core types for collecting property attributes and requesting a valuation.
//!
//! This crate provides:
//! - [`PropertyForm`] - Constrained editing of [`PropertyAttributes`]
//! - [`PredictionPayload`] - Wire projection sent to the prediction service
//! - [`RequestLifecycleState`] - Phase of the latest prediction request
//! - [`HomevalError`] - Error taxonomy

pub mod error;
pub mod payload;
pub mod property;
pub mod types;

// Re-exports for convenience
pub use error::{HomevalError, Result};
pub use payload::{extract_prediction_price, PredictionPayload, PredictionResponse, PRICE_FIELD};
pub use property::{PropertyAttributes, PropertyForm};
pub use types::*;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{HomevalError, Result};
    pub use crate::payload::{PredictionPayload, PredictionResponse};
    pub use crate::property::{PropertyAttributes, PropertyForm};
    pub use crate::types::{BooleanField, CounterField, NumericField, RequestLifecycleState};
}
