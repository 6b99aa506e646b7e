use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

pub const LOCATION_MIN_LEN: usize = 3;
pub const LOCATION_MAX_LEN: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRange {
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NumericField {
    Temperature,
    Humidity,
    Rainfall,
    Nitrogen,
    Phosphorus,
    Potassium,
    Ph,
}

impl NumericField {
    pub const ALL: [NumericField; 7] = [
        NumericField::Temperature,
        NumericField::Humidity,
        NumericField::Rainfall,
        NumericField::Nitrogen,
        NumericField::Phosphorus,
        NumericField::Potassium,
        NumericField::Ph,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NumericField::Temperature => "temperature",
            NumericField::Humidity => "humidity",
            NumericField::Rainfall => "rainfall",
            NumericField::Nitrogen => "nitrogen",
            NumericField::Phosphorus => "phosphorus",
            NumericField::Potassium => "potassium",
            NumericField::Ph => "ph",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NumericField::Temperature => "Avg Temperature",
            NumericField::Humidity => "Avg Humidity",
            NumericField::Rainfall => "Avg Monthly Rainfall",
            NumericField::Nitrogen => "Nitrogen (N)",
            NumericField::Phosphorus => "Phosphorus (P)",
            NumericField::Potassium => "Potassium (K)",
            NumericField::Ph => "Soil pH",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            NumericField::Temperature => "°C",
            NumericField::Humidity => "%",
            NumericField::Rainfall => "mm/month",
            NumericField::Nitrogen | NumericField::Phosphorus | NumericField::Potassium => {
                "kg/ha"
            }
            NumericField::Ph => "",
        }
    }

    pub fn range(&self) -> FieldRange {
        match self {
            NumericField::Temperature => FieldRange::new(0.0, 45.0),
            NumericField::Humidity => FieldRange::new(0.0, 100.0),
            NumericField::Rainfall => FieldRange::new(0.0, 300.0),
            NumericField::Nitrogen => FieldRange::new(0.0, 140.0),
            NumericField::Phosphorus => FieldRange::new(5.0, 145.0),
            NumericField::Potassium => FieldRange::new(5.0, 205.0),
            NumericField::Ph => FieldRange::new(3.5, 10.0),
        }
    }

    pub fn default_value(&self) -> f64 {
        match self {
            NumericField::Temperature => 25.0,
            NumericField::Humidity => 70.0,
            NumericField::Rainfall => 100.0,
            NumericField::Nitrogen => 50.0,
            NumericField::Phosphorus => 82.0,
            NumericField::Potassium => 50.0,
            NumericField::Ph => 6.60,
        }
    }

    /// Reject non-finite or out-of-range values. Never clamps.
    pub fn validate(&self, value: f64) -> Result<f64, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite {
                field: self.as_str(),
            });
        }
        let range = self.range();
        if !range.contains(value) {
            return Err(ValidationError::OutOfRange {
                field: self.as_str(),
                value,
                min: range.min,
                max: range.max,
            });
        }
        Ok(value)
    }
}

impl std::fmt::Display for NumericField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Optional free-text fields. Any of these may be filled by the
/// initial-parameters estimator when left blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextField {
    DesiredCrops,
    SoilType,
    HistoricalYieldData,
    OtherRelevantParameters,
}

impl TextField {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextField::DesiredCrops => "desired crops",
            TextField::SoilType => "soil type",
            TextField::HistoricalYieldData => "historical yield data",
            TextField::OtherRelevantParameters => "other relevant parameters",
        }
    }

    pub fn max_len(&self) -> usize {
        match self {
            TextField::DesiredCrops => 200,
            TextField::SoilType => 100,
            TextField::HistoricalYieldData | TextField::OtherRelevantParameters => 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmParameters {
    pub location: String,
    pub desired_crops: Option<String>,
    pub soil_type: Option<String>,
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall: f64,
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub ph: f64,
    pub historical_yield_data: Option<String>,
    pub other_relevant_parameters: Option<String>,
}

impl Default for FarmParameters {
    fn default() -> Self {
        Self {
            location: String::new(),
            desired_crops: None,
            soil_type: None,
            temperature: NumericField::Temperature.default_value(),
            humidity: NumericField::Humidity.default_value(),
            rainfall: NumericField::Rainfall.default_value(),
            nitrogen: NumericField::Nitrogen.default_value(),
            phosphorus: NumericField::Phosphorus.default_value(),
            potassium: NumericField::Potassium.default_value(),
            ph: NumericField::Ph.default_value(),
            historical_yield_data: None,
            other_relevant_parameters: None,
        }
    }
}

impl FarmParameters {
    pub fn get(&self, field: NumericField) -> f64 {
        match field {
            NumericField::Temperature => self.temperature,
            NumericField::Humidity => self.humidity,
            NumericField::Rainfall => self.rainfall,
            NumericField::Nitrogen => self.nitrogen,
            NumericField::Phosphorus => self.phosphorus,
            NumericField::Potassium => self.potassium,
            NumericField::Ph => self.ph,
        }
    }

    fn slot(&mut self, field: NumericField) -> &mut f64 {
        match field {
            NumericField::Temperature => &mut self.temperature,
            NumericField::Humidity => &mut self.humidity,
            NumericField::Rainfall => &mut self.rainfall,
            NumericField::Nitrogen => &mut self.nitrogen,
            NumericField::Phosphorus => &mut self.phosphorus,
            NumericField::Potassium => &mut self.potassium,
            NumericField::Ph => &mut self.ph,
        }
    }

    /// Edit-boundary write: out-of-range values are rejected and the previous
    /// value is kept.
    pub fn set_numeric(&mut self, field: NumericField, value: f64) -> Result<(), ValidationError> {
        let value = field.validate(value)?;
        *self.slot(field) = value;
        Ok(())
    }

    /// Estimator write: clamps into the field range instead of rejecting.
    /// Returns the value actually stored, or None for a non-finite input.
    pub fn set_numeric_clamped(&mut self, field: NumericField, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        let clamped = field.range().clamp(value);
        *self.slot(field) = clamped;
        Some(clamped)
    }

    pub fn set_location(&mut self, value: &str) -> Result<(), ValidationError> {
        if value.trim().chars().count() > LOCATION_MAX_LEN {
            return Err(ValidationError::TooLong {
                field: "location",
                max: LOCATION_MAX_LEN,
            });
        }
        self.location = value.to_string();
        Ok(())
    }

    /// The field's value if it holds anything other than whitespace.
    pub fn text(&self, field: TextField) -> Option<&str> {
        let value = match field {
            TextField::DesiredCrops => &self.desired_crops,
            TextField::SoilType => &self.soil_type,
            TextField::HistoricalYieldData => &self.historical_yield_data,
            TextField::OtherRelevantParameters => &self.other_relevant_parameters,
        };
        value.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn is_unset(&self, field: TextField) -> bool {
        self.text(field).is_none()
    }

    pub fn set_text(&mut self, field: TextField, value: Option<&str>) -> Result<(), ValidationError> {
        if let Some(v) = value {
            if v.chars().count() > field.max_len() {
                return Err(ValidationError::TooLong {
                    field: field.as_str(),
                    max: field.max_len(),
                });
            }
        }
        let value = value.map(str::to_string);
        match field {
            TextField::DesiredCrops => self.desired_crops = value,
            TextField::SoilType => self.soil_type = value,
            TextField::HistoricalYieldData => self.historical_yield_data = value,
            TextField::OtherRelevantParameters => self.other_relevant_parameters = value,
        }
        Ok(())
    }

    pub fn needs_initial_params(&self) -> bool {
        self.is_unset(TextField::SoilType)
            || self.is_unset(TextField::HistoricalYieldData)
            || self.is_unset(TextField::OtherRelevantParameters)
    }

    /// Whole-snapshot check performed before a submission.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let location_len = self.location.trim().chars().count();
        if location_len < LOCATION_MIN_LEN {
            return Err(ValidationError::TooShort {
                field: "location",
                min: LOCATION_MIN_LEN,
            });
        }
        if location_len > LOCATION_MAX_LEN {
            return Err(ValidationError::TooLong {
                field: "location",
                max: LOCATION_MAX_LEN,
            });
        }
        for field in NumericField::ALL {
            field.validate(self.get(field))?;
        }
        Ok(())
    }
}
