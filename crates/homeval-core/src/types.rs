//! Field identifiers and the request lifecycle shared across Homeval.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HomevalError;

/// A field that accepts a direct numeric assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    /// Square footage.
    Area,
    Bedrooms,
    Bathrooms,
    Stories,
    Parking,
}

impl NumericField {
    pub const ALL: [NumericField; 5] = [
        NumericField::Area,
        NumericField::Bedrooms,
        NumericField::Bathrooms,
        NumericField::Stories,
        NumericField::Parking,
    ];

    /// Wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            NumericField::Area => "area",
            NumericField::Bedrooms => "bedrooms",
            NumericField::Bathrooms => "bathrooms",
            NumericField::Stories => "stories",
            NumericField::Parking => "parking",
        }
    }

    /// Returns true if the field only holds whole numbers.
    pub fn is_integer(&self) -> bool {
        !matches!(self, NumericField::Area)
    }
}

impl FromStr for NumericField {
    type Err = HomevalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NumericField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| HomevalError::invalid_field("numeric", s))
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field driven by increment/decrement steppers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterField {
    Bedrooms,
    Bathrooms,
    Parking,
    /// Bounded to [`STORIES_MIN`, `STORIES_MAX`] under stepping.
    Stories,
}

impl CounterField {
    pub const ALL: [CounterField; 4] = [
        CounterField::Bedrooms,
        CounterField::Bathrooms,
        CounterField::Parking,
        CounterField::Stories,
    ];

    /// Wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterField::Bedrooms => "bedrooms",
            CounterField::Bathrooms => "bathrooms",
            CounterField::Parking => "parking",
            CounterField::Stories => "stories",
        }
    }

    /// Inclusive bounds enforced by stepping, if any.
    pub fn bounds(&self) -> Option<(u32, u32)> {
        match self {
            CounterField::Stories => Some((STORIES_MIN, STORIES_MAX)),
            _ => None,
        }
    }
}

impl FromStr for CounterField {
    type Err = HomevalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CounterField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| HomevalError::invalid_field("counter", s))
    }
}

impl fmt::Display for CounterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A yes/no amenity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BooleanField {
    /// Main road access.
    Mainroad,
    Basement,
    Hotwaterheating,
    Airconditioning,
    /// Preferred area.
    Prefarea,
}

impl BooleanField {
    pub const ALL: [BooleanField; 5] = [
        BooleanField::Mainroad,
        BooleanField::Basement,
        BooleanField::Hotwaterheating,
        BooleanField::Airconditioning,
        BooleanField::Prefarea,
    ];

    /// Wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            BooleanField::Mainroad => "mainroad",
            BooleanField::Basement => "basement",
            BooleanField::Hotwaterheating => "hotwaterheating",
            BooleanField::Airconditioning => "airconditioning",
            BooleanField::Prefarea => "prefarea",
        }
    }
}

impl FromStr for BooleanField {
    type Err = HomevalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BooleanField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| HomevalError::invalid_field("boolean", s))
    }
}

impl fmt::Display for BooleanField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowest number of stories reachable by stepping.
pub const STORIES_MIN: u32 = 1;

/// Highest number of stories reachable by stepping.
pub const STORIES_MAX: u32 = 5;

/// Phase of the most recent prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RequestLifecycleState {
    /// No request has been made yet.
    #[default]
    Idle,
    /// A request is in flight.
    Pending,
    /// The service returned a price.
    Succeeded { value: f64 },
    /// The request failed; `message` is safe to show to the user.
    Failed { message: String },
}

impl RequestLifecycleState {
    /// Returns true while a request is in flight.
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestLifecycleState::Pending)
    }

    /// Returns true once a request has produced an outcome.
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            RequestLifecycleState::Succeeded { .. } | RequestLifecycleState::Failed { .. }
        )
    }

    /// The predicted price, if the last request succeeded.
    pub fn prediction(&self) -> Option<f64> {
        match self {
            RequestLifecycleState::Succeeded { value } => Some(*value),
            _ => None,
        }
    }

    /// The user-facing failure message, if the last request failed.
    pub fn failure(&self) -> Option<&str> {
        match self {
            RequestLifecycleState::Failed { message } => Some(message),
            _ => None,
        }
    }

    pub fn kind(&self) -> StateKind {
        match self {
            RequestLifecycleState::Idle => StateKind::Idle,
            RequestLifecycleState::Pending => StateKind::Pending,
            RequestLifecycleState::Succeeded { .. } => StateKind::Succeeded,
            RequestLifecycleState::Failed { .. } => StateKind::Failed,
        }
    }
}

/// Discriminant of [`RequestLifecycleState`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    Idle,
    Pending,
    Succeeded,
    Failed,
}
