//! Application state.

use std::sync::Arc;

use crate::model::ValuationModel;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The model answering `/predict`.
    pub model: Arc<dyn ValuationModel>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(model: Arc<dyn ValuationModel>) -> Self {
        Self { model }
    }
}
