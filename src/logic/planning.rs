use crate::config::{Config, PlanningConfig};
use crate::datasources::{
    acquire_position, GeminiClient, LanguageModel, NominatimClient, PlaceSearch, PositionOptions,
    PositionProvider,
};
use crate::error::{CropWiseError, Result, ValidationError};
use crate::logic::debounce::Debouncer;
use crate::logic::estimators::{Estimate, Estimator};
use crate::logic::geocoding::Geocoder;
use crate::logic::session::{ApplyReport, ParameterSession};
use crate::logic::suggestions::SuggestionGenerator;
use crate::models::{
    coordinate_placeholder, is_coordinate_placeholder, EstimateKind, FarmParameters,
    GeocodeResult, LocationQuery, NumericField, Position, SuggestionRequest, SuggestionResult,
    TextField, LOCATION_MAX_LEN, LOCATION_MIN_LEN,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Drives one planning session: location edits, environmental estimates,
/// device location and the final suggestion request.
pub struct PlanningService {
    geocoder: Geocoder,
    estimator: Estimator,
    generator: SuggestionGenerator,
    session: Arc<RwLock<ParameterSession>>,
    climate_debounce: Debouncer,
    soil_debounce: Debouncer,
    geolocation_timeout: Duration,
}

/// Result of a concurrent climate and soil refresh. The two halves succeed
/// or fail independently.
#[derive(Debug)]
pub struct RefreshOutcome {
    pub climate: Result<ApplyReport>,
    pub soil: Result<ApplyReport>,
}

impl RefreshOutcome {
    pub fn all_ok(&self) -> bool {
        self.climate.is_ok() && self.soil.is_ok()
    }

    pub fn first_error(&self) -> Option<&CropWiseError> {
        self.climate.as_ref().err().or(self.soil.as_ref().err())
    }
}

#[derive(Debug)]
pub struct LocationOutcome {
    pub position: Position,
    pub location: String,
    /// None when the position could not be described and the coordinate
    /// placeholder was used instead.
    pub refresh: Option<RefreshOutcome>,
}

#[derive(Debug)]
pub struct Submission {
    pub parameters: FarmParameters,
    pub filled: Vec<TextField>,
    pub request: SuggestionRequest,
    pub result: SuggestionResult,
}

/// Location text worth estimating for: long enough, and not raw coordinates.
pub fn auto_refresh_eligible(location: &str) -> bool {
    location.trim().chars().count() >= LOCATION_MIN_LEN && !is_coordinate_placeholder(location)
}

impl PlanningService {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        places: Arc<dyn PlaceSearch>,
        planning: &PlanningConfig,
    ) -> Self {
        Self {
            geocoder: Geocoder::new(places, Arc::clone(&model)),
            estimator: Estimator::new(Arc::clone(&model)),
            generator: SuggestionGenerator::new(model),
            session: Arc::new(RwLock::new(ParameterSession::new())),
            climate_debounce: Debouncer::new(planning.debounce()),
            soil_debounce: Debouncer::new(planning.debounce()),
            geolocation_timeout: planning.geolocation_timeout(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let model = GeminiClient::new(config.llm.clone())?;
        info!("Language model configured: {}", config.llm.model);
        let places = NominatimClient::new(config.geocoding.clone())?;
        info!("Place search configured: {}", config.geocoding.base_url);

        Ok(Self::new(Arc::new(model), Arc::new(places), &config.planning))
    }

    pub fn session(&self) -> Arc<RwLock<ParameterSession>> {
        Arc::clone(&self.session)
    }

    pub async fn parameters(&self) -> FarmParameters {
        self.session.read().await.parameters().clone()
    }

    fn cancel_pending(&self) {
        self.climate_debounce.cancel();
        self.soil_debounce.cancel();
    }

    /// Store the new location text and schedule debounced estimates for it.
    /// Returns whether estimates were scheduled.
    pub async fn edit_location(&self, text: &str) -> Result<bool> {
        self.session.write().await.edit_location(text)?;
        self.cancel_pending();

        if !auto_refresh_eligible(text) {
            debug!("Not refreshing estimates for {:?}", text);
            return Ok(false);
        }

        for (kind, debouncer) in [
            (EstimateKind::Climate, &self.climate_debounce),
            (EstimateKind::Soil, &self.soil_debounce),
        ] {
            let estimator = self.estimator.clone();
            let session = Arc::clone(&self.session);
            debouncer.call(async move {
                if let Err(e) = run_estimate(&estimator, &session, kind).await {
                    warn!("Automatic {} refresh failed: {}", kind, e.user_message());
                }
            });
        }
        Ok(true)
    }

    pub async fn edit_numeric(&self, field: NumericField, value: f64) -> Result<()> {
        self.session.write().await.edit_numeric(field, value)?;
        Ok(())
    }

    pub async fn edit_text(&self, field: TextField, value: Option<&str>) -> Result<()> {
        self.session.write().await.edit_text(field, value)?;
        Ok(())
    }

    /// Forward geocode the session's current location and remember the
    /// coordinates.
    pub async fn resolve_location(&self) -> Result<Option<GeocodeResult>> {
        let location = self.session.read().await.location().to_string();
        if location.trim().is_empty() {
            return Err(ValidationError::TooShort {
                field: "location",
                min: LOCATION_MIN_LEN,
            }
            .into());
        }

        let resolved = self.geocoder.resolve(&LocationQuery::parse(&location)).await?;
        match &resolved {
            Some(place) => info!(
                "Resolved {:?} to {:.4}, {:.4}",
                location, place.latitude, place.longitude
            ),
            None => warn!("No geocoding match for {:?}", location),
        }

        let mut session = self.session.write().await;
        if session.location() == location {
            session.set_coordinates(resolved.clone());
        }
        Ok(resolved)
    }

    /// Explicit refresh: both estimates run concurrently and each overwrites
    /// its own numeric fields.
    pub async fn refresh_environment(&self) -> Result<RefreshOutcome> {
        self.cancel_pending();

        let location = self.session.read().await.location().to_string();
        if is_coordinate_placeholder(&location) {
            return Err(CropWiseError::InvalidData(
                "enter a place name before estimating conditions".into(),
            ));
        }
        if location.trim().chars().count() < LOCATION_MIN_LEN {
            return Err(ValidationError::TooShort {
                field: "location",
                min: LOCATION_MIN_LEN,
            }
            .into());
        }

        Ok(self.run_both().await)
    }

    async fn run_both(&self) -> RefreshOutcome {
        let (climate, soil) = tokio::join!(
            run_estimate(&self.estimator, &self.session, EstimateKind::Climate),
            run_estimate(&self.estimator, &self.session, EstimateKind::Soil),
        );
        RefreshOutcome { climate, soil }
    }

    /// Acquire a device fix, describe it, and refresh estimates for the
    /// description. When the fix cannot be described the location becomes a
    /// coordinate placeholder and estimates are skipped.
    pub async fn use_current_location(
        &self,
        provider: &dyn PositionProvider,
    ) -> Result<LocationOutcome> {
        self.cancel_pending();

        let options = PositionOptions::fresh(self.geolocation_timeout);
        let position = acquire_position(provider, &options).await?;
        let described = self
            .geocoder
            .reverse_geocode(position.latitude, position.longitude)
            .await?;

        if described.location_description.is_empty() {
            let placeholder = coordinate_placeholder(position.latitude, position.longitude);
            warn!("Could not describe position; using {:?}", placeholder);
            let mut session = self.session.write().await;
            session.edit_location(&placeholder)?;
            session.set_coordinates(
                GeocodeResult::new(position.latitude, position.longitude, placeholder.clone()).ok(),
            );
            return Ok(LocationOutcome {
                position,
                location: placeholder,
                refresh: None,
            });
        }

        let location: String = described
            .location_description
            .chars()
            .take(LOCATION_MAX_LEN)
            .collect();
        let location = location.trim_end().to_string();
        {
            let mut session = self.session.write().await;
            session.edit_location(&location)?;
            session.set_coordinates(
                GeocodeResult::new(position.latitude, position.longitude, location.clone()).ok(),
            );
        }
        info!("Current location: {}", location);

        let refresh = self.run_both().await;
        Ok(LocationOutcome {
            position,
            location,
            refresh: Some(refresh),
        })
    }

    /// Validate, fill blank details if needed, and ask for crop suggestions.
    /// Nothing in the session changes unless the estimate succeeds.
    pub async fn submit(&self) -> Result<Submission> {
        let snapshot = {
            let session = self.session.read().await;
            session.parameters().validate()?;
            session.clone()
        };

        let mut filled = Vec::new();
        if snapshot.needs_initial_params() {
            let params = snapshot.parameters();
            let estimated = self
                .estimator
                .initial_parameters(&params.location, params.text(TextField::DesiredCrops))
                .await?;
            filled = self.session.write().await.apply_initial_parameters(estimated);
            if !filled.is_empty() {
                info!("Filled {} blank field(s) from estimates", filled.len());
            }
        }

        let (parameters, request) = {
            let session = self.session.read().await;
            (session.parameters().clone(), session.build_request())
        };
        let result = self.generator.generate(&request).await?;

        Ok(Submission {
            parameters,
            filled,
            request,
            result,
        })
    }

    pub async fn check_connections(&self) -> ConnectionStatus {
        let (geocoding, llm) = tokio::join!(
            self.geocoder.test_connection(),
            self.estimator.test_connection()
        );

        ConnectionStatus {
            geocoding: geocoding.unwrap_or(false),
            llm: llm.unwrap_or(false),
        }
    }
}

/// Request one estimate for the session's current location and merge it.
/// Skipped when the same estimate is already running.
async fn run_estimate(
    estimator: &Estimator,
    session: &RwLock<ParameterSession>,
    kind: EstimateKind,
) -> Result<ApplyReport> {
    let Some(ticket) = session.write().await.try_begin_estimate(kind) else {
        debug!("{} estimate already running for this location", kind);
        return Ok(ApplyReport::already_running());
    };
    let estimate = estimator.estimate(kind, &ticket.location).await;

    let mut session = session.write().await;
    session.finish_estimate(&ticket);
    let report = match estimate? {
        Estimate::Climate(climate) => session.apply_climate(&ticket, &climate),
        Estimate::Soil(soil) => session.apply_soil(&ticket, &soil),
    };

    if !report.skipped.is_empty() {
        debug!(
            "Kept user values for {:?} from {} estimate",
            report.skipped, kind
        );
    }
    Ok(report)
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionStatus {
    pub geocoding: bool,
    pub llm: bool,
}

impl ConnectionStatus {
    pub fn all_connected(&self) -> bool {
        self.geocoding && self.llm
    }
}
