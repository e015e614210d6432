//! Property attributes and the form that mutates them.
//!
//! [`PropertyForm`] is the only writer of [`PropertyAttributes`]. Every mutator
//! preserves the attribute invariants: numeric values are finite and
//! non-negative, counters never drop below zero and stepping keeps `stories`
//! inside [`STORIES_MIN`, `STORIES_MAX`].

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::payload::PredictionPayload;
use crate::types::{BooleanField, CounterField, NumericField, STORIES_MAX, STORIES_MIN};

/// Structured attributes of a residential property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyAttributes {
    /// Square footage.
    pub area: f64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    /// Advisory range [1, 5]; direct assignment does not clamp it.
    pub stories: u32,
    pub parking: u32,
    pub mainroad: bool,
    pub basement: bool,
    pub hotwaterheating: bool,
    pub airconditioning: bool,
    pub prefarea: bool,
}

impl Default for PropertyAttributes {
    fn default() -> Self {
        Self {
            area: 4000.0,
            bedrooms: 3,
            bathrooms: 2,
            stories: 2,
            parking: 1,
            mainroad: true,
            basement: false,
            hotwaterheating: false,
            airconditioning: true,
            prefarea: false,
        }
    }
}

impl PropertyAttributes {
    /// Current value of a numeric field.
    pub fn numeric(&self, field: NumericField) -> f64 {
        match field {
            NumericField::Area => self.area,
            NumericField::Bedrooms => f64::from(self.bedrooms),
            NumericField::Bathrooms => f64::from(self.bathrooms),
            NumericField::Stories => f64::from(self.stories),
            NumericField::Parking => f64::from(self.parking),
        }
    }

    /// Current value of a counter field.
    pub fn counter(&self, field: CounterField) -> u32 {
        match field {
            CounterField::Bedrooms => self.bedrooms,
            CounterField::Bathrooms => self.bathrooms,
            CounterField::Parking => self.parking,
            CounterField::Stories => self.stories,
        }
    }

    /// Current value of a boolean field.
    pub fn flag(&self, field: BooleanField) -> bool {
        match field {
            BooleanField::Mainroad => self.mainroad,
            BooleanField::Basement => self.basement,
            BooleanField::Hotwaterheating => self.hotwaterheating,
            BooleanField::Airconditioning => self.airconditioning,
            BooleanField::Prefarea => self.prefarea,
        }
    }

    fn counter_mut(&mut self, field: CounterField) -> &mut u32 {
        match field {
            CounterField::Bedrooms => &mut self.bedrooms,
            CounterField::Bathrooms => &mut self.bathrooms,
            CounterField::Parking => &mut self.parking,
            CounterField::Stories => &mut self.stories,
        }
    }

    fn flag_mut(&mut self, field: BooleanField) -> &mut bool {
        match field {
            BooleanField::Mainroad => &mut self.mainroad,
            BooleanField::Basement => &mut self.basement,
            BooleanField::Hotwaterheating => &mut self.hotwaterheating,
            BooleanField::Airconditioning => &mut self.airconditioning,
            BooleanField::Prefarea => &mut self.prefarea,
        }
    }
}

/// Holds the working [`PropertyAttributes`] and applies constrained edits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyForm {
    attributes: PropertyAttributes,
}

impl PropertyForm {
    /// Create a form populated with the default attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a form from existing attributes.
    pub fn with_attributes(attributes: PropertyAttributes) -> Self {
        Self { attributes }
    }

    /// Read the current attributes.
    pub fn attributes(&self) -> &PropertyAttributes {
        &self.attributes
    }

    /// Restore the default attributes.
    pub fn reset(&mut self) {
        self.attributes = PropertyAttributes::default();
    }

    /// Assign a numeric field from raw user input.
    ///
    /// Returns `Ok(false)` when the input does not coerce to a valid value for
    /// the field; the field is left unchanged in that case. Only an unknown
    /// field name is an error.
    pub fn set_numeric_field(&mut self, name: &str, raw: &str) -> Result<bool> {
        let field: NumericField = name.parse()?;
        Ok(match coerce(field, raw) {
            Some(value) => self.set_numeric(field, value),
            None => false,
        })
    }

    /// Assign a numeric field directly.
    ///
    /// Negative, non-finite and (for integer fields) fractional values are
    /// ignored and `false` is returned.
    pub fn set_numeric(&mut self, field: NumericField, value: f64) -> bool {
        if !value.is_finite() || value < 0.0 {
            return false;
        }

        if field == NumericField::Area {
            self.attributes.area = value;
            return true;
        }

        if value.fract() != 0.0 || value > f64::from(u32::MAX) {
            return false;
        }

        let whole = value as u32;
        match field {
            NumericField::Bedrooms => self.attributes.bedrooms = whole,
            NumericField::Bathrooms => self.attributes.bathrooms = whole,
            NumericField::Stories => self.attributes.stories = whole,
            NumericField::Parking => self.attributes.parking = whole,
            NumericField::Area => unreachable!("area handled above"),
        }
        true
    }

    /// Step a counter field up by name.
    pub fn increment_field(&mut self, name: &str) -> Result<bool> {
        let field: CounterField = name.parse()?;
        Ok(self.increment(field))
    }

    /// Step a counter field down by name.
    pub fn decrement_field(&mut self, name: &str) -> Result<bool> {
        let field: CounterField = name.parse()?;
        Ok(self.decrement(field))
    }

    /// Step a counter field up. Returns false when the field is at its upper bound.
    pub fn increment(&mut self, field: CounterField) -> bool {
        let max = field.bounds().map_or(u32::MAX, |(_, max)| max);
        let value = self.attributes.counter_mut(field);
        if *value >= max {
            return false;
        }
        *value += 1;
        true
    }

    /// Step a counter field down. A no-op at zero, or at the lower bound for stories.
    pub fn decrement(&mut self, field: CounterField) -> bool {
        let min = field.bounds().map_or(0, |(min, _)| min);
        let value = self.attributes.counter_mut(field);
        if *value <= min {
            return false;
        }
        *value -= 1;
        true
    }

    /// Flip a boolean field by name, returning its new value.
    pub fn toggle_field(&mut self, name: &str) -> Result<bool> {
        let field: BooleanField = name.parse()?;
        Ok(self.toggle(field))
    }

    /// Flip a boolean field, returning its new value.
    pub fn toggle(&mut self, field: BooleanField) -> bool {
        let flag = self.attributes.flag_mut(field);
        *flag = !*flag;
        *flag
    }

    /// Project the current attributes into the wire payload.
    pub fn to_payload(&self) -> PredictionPayload {
        PredictionPayload::from(&self.attributes)
    }
}

fn coerce(field: NumericField, raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    if field.is_integer() && value.fract() != 0.0 {
        return None;
    }
    Some(value)
}
