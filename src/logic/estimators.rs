use crate::datasources::{generate_structured, LanguageModel};
use crate::error::{CropWiseError, Result};
use crate::logic::prompts;
use crate::models::{ClimateEstimate, EstimateKind, InitialParameters, SoilEstimate};
use std::sync::Arc;
use tracing::{debug, error};

/// Location-based estimates of climate, soil and the free-text farm details.
///
/// Every call goes to the model; results are never cached because the same
/// location may legitimately produce different answers.
#[derive(Clone)]
pub struct Estimator {
    model: Arc<dyn LanguageModel>,
}

impl Estimator {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    pub async fn climate(&self, location_description: &str) -> Result<ClimateEstimate> {
        let prompt = prompts::climate(location_description);
        let estimate: ClimateEstimate = generate_structured(self.model.as_ref(), &prompt)
            .await
            .inspect_err(|e| log_failure("climate", location_description, e))?;

        debug!("Climate estimate for {:?}: {:?}", location_description, estimate);
        Ok(estimate.clamped())
    }

    pub async fn soil(&self, location_description: &str) -> Result<SoilEstimate> {
        let prompt = prompts::soil(location_description);
        let estimate: SoilEstimate = generate_structured(self.model.as_ref(), &prompt)
            .await
            .inspect_err(|e| log_failure("soil", location_description, e))?;

        debug!("Soil estimate for {:?}: {:?}", location_description, estimate);
        Ok(estimate.clamped())
    }

    pub async fn initial_parameters(
        &self,
        location_description: &str,
        desired_crops: Option<&str>,
    ) -> Result<InitialParameters> {
        let crops = desired_crops
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(prompts::DEFAULT_CROPS_HINT);
        let prompt = prompts::initial_parameters(location_description, crops);

        let params: InitialParameters = generate_structured(self.model.as_ref(), &prompt)
            .await
            .inspect_err(|e| log_failure("initial parameters", location_description, e))?;

        Ok(InitialParameters {
            soil_type: params.soil_type.trim().to_string(),
            historical_yield_data: params.historical_yield_data.trim().to_string(),
            other_relevant_parameters: params.other_relevant_parameters.trim().to_string(),
        })
    }

    pub async fn estimate(&self, kind: EstimateKind, location_description: &str) -> Result<Estimate> {
        match kind {
            EstimateKind::Climate => self.climate(location_description).await.map(Estimate::Climate),
            EstimateKind::Soil => self.soil(location_description).await.map(Estimate::Soil),
        }
    }

    pub async fn test_connection(&self) -> Result<bool> {
        self.model.test_connection().await
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Estimate {
    Climate(ClimateEstimate),
    Soil(SoilEstimate),
}

fn log_failure(what: &str, location: &str, err: &CropWiseError) {
    if err.is_rate_limit() {
        error!("RATE LIMIT HIT: {} estimate for {:?}: {}", what, location, err);
    } else {
        error!("Error estimating {} for {:?}: {}", what, location, err);
    }
}
