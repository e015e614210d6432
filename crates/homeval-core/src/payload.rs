//! Request and response bodies exchanged with the prediction service.

use serde::{Deserialize, Serialize};

use crate::error::{HomevalError, Result};
use crate::property::PropertyAttributes;

/// Name of the response field carrying the predicted price.
pub const PRICE_FIELD: &str = "prediction_price";

/// JSON body of a prediction request.
///
/// Booleans are encoded as `1`/`0`; numeric fields pass through unchanged.
/// Build it with [`PropertyForm::to_payload`](crate::PropertyForm::to_payload),
/// which only ever holds a finite, non-negative `area`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionPayload {
    pub area: f64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub stories: u32,
    pub parking: u32,
    pub mainroad: u8,
    pub basement: u8,
    pub hotwaterheating: u8,
    pub airconditioning: u8,
    pub prefarea: u8,
}

impl PredictionPayload {
    /// Look up a feature by its wire name. Unknown names yield `None`.
    pub fn feature(&self, name: &str) -> Option<f64> {
        let value = match name {
            "area" => self.area,
            "bedrooms" => f64::from(self.bedrooms),
            "bathrooms" => f64::from(self.bathrooms),
            "stories" => f64::from(self.stories),
            "parking" => f64::from(self.parking),
            "mainroad" => f64::from(self.mainroad),
            "basement" => f64::from(self.basement),
            "hotwaterheating" => f64::from(self.hotwaterheating),
            "airconditioning" => f64::from(self.airconditioning),
            "prefarea" => f64::from(self.prefarea),
            _ => return None,
        };
        Some(value)
    }

    /// Encode as the JSON request body.
    ///
    /// A non-finite `area` has no JSON number form and is rejected.
    pub fn to_value(&self) -> Result<serde_json::Value> {
        if !self.area.is_finite() {
            return Err(HomevalError::SerializationError(format!(
                "area must be a finite number, got {}",
                self.area
            )));
        }
        Ok(serde_json::to_value(self)?)
    }
}

impl From<&PropertyAttributes> for PredictionPayload {
    fn from(attrs: &PropertyAttributes) -> Self {
        Self {
            area: attrs.area,
            bedrooms: attrs.bedrooms,
            bathrooms: attrs.bathrooms,
            stories: attrs.stories,
            parking: attrs.parking,
            mainroad: flag(attrs.mainroad),
            basement: flag(attrs.basement),
            hotwaterheating: flag(attrs.hotwaterheating),
            airconditioning: flag(attrs.airconditioning),
            prefarea: flag(attrs.prefarea),
        }
    }
}

fn flag(value: bool) -> u8 {
    u8::from(value)
}

/// Successful response from the prediction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction_price: f64,
    pub details: String,
}

impl PredictionResponse {
    pub fn new(prediction_price: f64) -> Self {
        Self {
            prediction_price,
            details: "Prediction successful".to_string(),
        }
    }
}

/// Read the predicted price out of a response body.
///
/// Anything other than a finite JSON number under [`PRICE_FIELD`] is malformed.
pub fn extract_prediction_price(body: &serde_json::Value) -> Result<f64> {
    let field = body
        .get(PRICE_FIELD)
        .ok_or_else(|| HomevalError::MalformedResponse(format!("missing `{PRICE_FIELD}`")))?;

    let price = field.as_f64().ok_or_else(|| {
        HomevalError::MalformedResponse(format!("`{PRICE_FIELD}` is not a number: {field}"))
    })?;

    if !price.is_finite() {
        return Err(HomevalError::MalformedResponse(format!(
            "`{PRICE_FIELD}` is not finite"
        )));
    }

    Ok(price)
}
