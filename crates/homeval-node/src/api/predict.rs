//! Prediction endpoint.

use axum::{extract::State, http::StatusCode, Json};
use homeval_core::{PredictionPayload, PredictionResponse};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::state::AppState;

/// Price the submitted property.
pub async fn predict_price(
    State(state): State<AppState>,
    Json(payload): Json<PredictionPayload>,
) -> Result<Json<PredictionResponse>, (StatusCode, Json<Value>)> {
    match state.model.predict(&payload) {
        Ok(price) => {
            info!(price, model = state.model.name(), "Prediction served");
            Ok(Json(PredictionResponse::new(price)))
        }
        Err(e) => {
            error!(error = %e, "Prediction failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": e.to_string() })),
            ))
        }
    }
}
