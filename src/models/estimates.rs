use super::farm_parameters::NumericField;
use serde::{Deserialize, Serialize};

/// Estimator contract bounds. These are looser than the form ranges; the
/// parameter session clamps again when writing into FarmParameters.
pub const HUMIDITY_BOUNDS: (f64, f64) = (0.0, 100.0);
pub const PH_BOUNDS: (f64, f64) = (3.5, 10.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EstimateKind {
    Climate,
    Soil,
}

impl EstimateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstimateKind::Climate => "Climate",
            EstimateKind::Soil => "Soil",
        }
    }
}

impl std::fmt::Display for EstimateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimateEstimate {
    #[serde(rename = "averageTemperatureC")]
    pub average_temperature_c: f64,
    #[serde(rename = "averageHumidityPercent")]
    pub average_humidity_percent: f64,
    #[serde(rename = "averageMonthlyRainfallMM")]
    pub average_monthly_rainfall_mm: f64,
}

impl ClimateEstimate {
    /// Humidity into [0, 100], rainfall non-negative. Temperature is passed
    /// through as the model reported it.
    pub fn clamped(self) -> Self {
        Self {
            average_temperature_c: self.average_temperature_c,
            average_humidity_percent: self
                .average_humidity_percent
                .clamp(HUMIDITY_BOUNDS.0, HUMIDITY_BOUNDS.1),
            average_monthly_rainfall_mm: self.average_monthly_rainfall_mm.max(0.0),
        }
    }

    pub fn values(&self) -> [(NumericField, f64); 3] {
        [
            (NumericField::Temperature, self.average_temperature_c),
            (NumericField::Humidity, self.average_humidity_percent),
            (NumericField::Rainfall, self.average_monthly_rainfall_mm),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilEstimate {
    pub nitrogen_kg_ha: f64,
    pub phosphorus_kg_ha: f64,
    pub potassium_kg_ha: f64,
    pub ph: f64,
}

impl SoilEstimate {
    pub fn clamped(self) -> Self {
        Self {
            nitrogen_kg_ha: self.nitrogen_kg_ha.max(0.0),
            phosphorus_kg_ha: self.phosphorus_kg_ha.max(0.0),
            potassium_kg_ha: self.potassium_kg_ha.max(0.0),
            ph: self.ph.clamp(PH_BOUNDS.0, PH_BOUNDS.1),
        }
    }

    pub fn values(&self) -> [(NumericField, f64); 4] {
        [
            (NumericField::Nitrogen, self.nitrogen_kg_ha),
            (NumericField::Phosphorus, self.phosphorus_kg_ha),
            (NumericField::Potassium, self.potassium_kg_ha),
            (NumericField::Ph, self.ph),
        ]
    }
}

/// Text details estimated for fields the user left blank.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialParameters {
    #[serde(default)]
    pub soil_type: String,
    #[serde(default)]
    pub historical_yield_data: String,
    #[serde(default)]
    pub other_relevant_parameters: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn climate(humidity: f64, rainfall: f64) -> ClimateEstimate {
        ClimateEstimate {
            average_temperature_c: 52.0,
            average_humidity_percent: humidity,
            average_monthly_rainfall_mm: rainfall,
        }
    }

    fn soil(nitrogen: f64, ph: f64) -> SoilEstimate {
        SoilEstimate {
            nitrogen_kg_ha: nitrogen,
            phosphorus_kg_ha: 30.0,
            potassium_kg_ha: 40.0,
            ph,
        }
    }

    #[test]
    fn climate_clamps_humidity_and_rainfall() {
        assert_eq!(climate(150.0, 80.0).clamped().average_humidity_percent, 100.0);
        assert_eq!(climate(-5.0, 80.0).clamped().average_humidity_percent, 0.0);
        assert_eq!(climate(60.0, -10.0).clamped().average_monthly_rainfall_mm, 0.0);
        // In-range values untouched
        let c = climate(60.0, 80.0).clamped();
        assert_eq!(c.average_humidity_percent, 60.0);
        assert_eq!(c.average_monthly_rainfall_mm, 80.0);
    }

    #[test]
    fn climate_temperature_not_clamped() {
        assert_eq!(climate(50.0, 10.0).clamped().average_temperature_c, 52.0);
    }

    #[test]
    fn soil_clamps_ph_and_nutrients() {
        assert_eq!(soil(50.0, 12.0).clamped().ph, 10.0);
        assert_eq!(soil(50.0, 1.0).clamped().ph, 3.5);
        assert_eq!(soil(-5.0, 6.5).clamped().nitrogen_kg_ha, 0.0);

        let s = SoilEstimate {
            nitrogen_kg_ha: 10.0,
            phosphorus_kg_ha: -1.0,
            potassium_kg_ha: -0.5,
            ph: 6.5,
        }
        .clamped();
        assert_eq!(s.phosphorus_kg_ha, 0.0);
        assert_eq!(s.potassium_kg_ha, 0.0);
        assert_eq!(s.ph, 6.5);
    }

    #[test]
    fn deserializes_model_keys() {
        let c: ClimateEstimate = serde_json::from_str(
            r#"{"averageTemperatureC": 16.5, "averageHumidityPercent": 62, "averageMonthlyRainfallMM": 45}"#,
        )
        .unwrap();
        assert_eq!(c.average_monthly_rainfall_mm, 45.0);

        let p: InitialParameters =
            serde_json::from_str(r#"{"soilType": "Clay loam", "historicalYieldData": "3 t/acre"}"#)
                .unwrap();
        assert_eq!(p.soil_type, "Clay loam");
        assert!(p.other_relevant_parameters.is_empty());
    }
}
