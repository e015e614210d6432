//! Valuation models.
//!
//! The service ships a linear model exported as JSON. Features are laid out in
//! `columns` order, the count-like features are standardised with the
//! exported scaler, then the coefficients are applied.

use std::fs;
use std::path::{Path, PathBuf};

use homeval_core::PredictionPayload;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or evaluating a model.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid model artifact: {0}")]
    Invalid(String),

    #[error("model produced a non-finite prediction")]
    NonFinite,
}

/// A model that prices a property from its payload.
pub trait ValuationModel: Send + Sync {
    /// Predict the price for `payload`.
    fn predict(&self, payload: &PredictionPayload) -> Result<f64, ModelError>;

    /// Get model name/type
    fn name(&self) -> &str;
}

/// Features standardised before the model is applied.
pub const SCALED_FEATURES: [&str; 5] = ["area", "bedrooms", "bathrooms", "stories", "parking"];

fn default_scaled_columns() -> Vec<String> {
    SCALED_FEATURES.iter().map(|c| c.to_string()).collect()
}

fn default_name() -> String {
    "linear".to_string()
}

/// Per-column standardisation `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    #[serde(default = "default_scaled_columns")]
    pub columns: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Linear regression over an ordered feature vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    #[serde(default = "default_name")]
    pub name: String,

    /// Feature order expected by `coefficients`.
    pub columns: Vec<String>,

    pub scaler: StandardScaler,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    /// Load and validate a model artifact.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Parse and validate a model artifact.
    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        let model: LinearModel = serde_json::from_str(raw)?;
        model.validate()?;
        Ok(model)
    }

    /// Check that the artifact is internally consistent.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.columns.is_empty() {
            return Err(ModelError::Invalid("no feature columns".to_string()));
        }
        if self.coefficients.len() != self.columns.len() {
            return Err(ModelError::Invalid(format!(
                "{} coefficients for {} columns",
                self.coefficients.len(),
                self.columns.len()
            )));
        }

        let scaler = &self.scaler;
        if scaler.mean.len() != scaler.columns.len() || scaler.scale.len() != scaler.columns.len() {
            return Err(ModelError::Invalid(format!(
                "scaler has {} columns, {} means and {} scales",
                scaler.columns.len(),
                scaler.mean.len(),
                scaler.scale.len()
            )));
        }
        for column in &scaler.columns {
            if !self.columns.contains(column) {
                return Err(ModelError::Invalid(format!(
                    "scaled column '{column}' is not a model column"
                )));
            }
        }
        if scaler.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
            return Err(ModelError::Invalid(
                "scaler scale must be finite and non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Build the model input for `payload`. Columns the payload lacks are 0.
    pub fn features(&self, payload: &PredictionPayload) -> Vec<f64> {
        let mut features: Vec<f64> = self
            .columns
            .iter()
            .map(|column| payload.feature(column).unwrap_or(0.0))
            .collect();

        for (i, column) in self.scaler.columns.iter().enumerate() {
            if let Some(idx) = self.columns.iter().position(|c| c == column) {
                features[idx] = (features[idx] - self.scaler.mean[i]) / self.scaler.scale[i];
            }
        }

        features
    }
}

impl ValuationModel for LinearModel {
    fn predict(&self, payload: &PredictionPayload) -> Result<f64, ModelError> {
        let prediction = self
            .features(payload)
            .iter()
            .zip(&self.coefficients)
            .fold(self.intercept, |acc, (x, w)| acc + x * w);

        if !prediction.is_finite() {
            return Err(ModelError::NonFinite);
        }
        Ok(prediction)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
