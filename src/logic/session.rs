use crate::error::ValidationError;
use crate::logic::request_builder::build_request;
use crate::models::{
    ClimateEstimate, EstimateKind, FarmParameters, GeocodeResult, InitialParameters,
    NumericField, SoilEstimate, SuggestionRequest, TextField,
};
use std::collections::HashMap;
use tracing::debug;

/// Snapshot taken when an estimate is requested, used to decide which parts
/// of the answer are still wanted when it lands.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateTicket {
    pub kind: EstimateKind,
    pub location: String,
    issued_at: u64,
}

/// What happened to an estimate when it was merged into the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    /// Fields written, with the value actually stored.
    pub applied: Vec<(NumericField, f64)>,
    /// Fields left alone because the user edited them after the request.
    pub skipped: Vec<NumericField>,
    /// The location changed while the estimate was in flight.
    pub discarded: bool,
    /// Not requested: the same estimate for this location was already
    /// running and merges when it lands.
    pub already_running: bool,
}

impl ApplyReport {
    fn discarded() -> Self {
        Self {
            discarded: true,
            ..Default::default()
        }
    }

    pub fn already_running() -> Self {
        Self {
            already_running: true,
            ..Default::default()
        }
    }
}

/// Canonical farm parameters for one planning session, plus the bookkeeping
/// needed to merge asynchronous estimates without clobbering user edits.
#[derive(Debug, Clone, Default)]
pub struct ParameterSession {
    params: FarmParameters,
    revision: u64,
    edited_at: HashMap<NumericField, u64>,
    estimated: Option<InitialParameters>,
    coordinates: Option<GeocodeResult>,
    in_flight: Vec<(EstimateKind, String)>,
}

impl ParameterSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parameters(&self) -> &FarmParameters {
        &self.params
    }

    pub fn location(&self) -> &str {
        &self.params.location
    }

    pub fn coordinates(&self) -> Option<&GeocodeResult> {
        self.coordinates.as_ref()
    }

    pub fn set_coordinates(&mut self, coordinates: Option<GeocodeResult>) {
        self.coordinates = coordinates;
    }

    fn bump(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }

    pub fn edit_numeric(&mut self, field: NumericField, value: f64) -> Result<(), ValidationError> {
        self.params.set_numeric(field, value)?;
        let revision = self.bump();
        self.edited_at.insert(field, revision);
        Ok(())
    }

    /// A new location invalidates any resolved coordinates.
    pub fn edit_location(&mut self, value: &str) -> Result<(), ValidationError> {
        if value == self.params.location {
            return Ok(());
        }
        self.params.set_location(value)?;
        self.coordinates = None;
        self.bump();
        Ok(())
    }

    pub fn edit_text(&mut self, field: TextField, value: Option<&str>) -> Result<(), ValidationError> {
        self.params.set_text(field, value)?;
        self.bump();
        Ok(())
    }

    pub fn needs_initial_params(&self) -> bool {
        self.params.needs_initial_params()
    }

    pub fn begin_estimate(&self, kind: EstimateKind) -> EstimateTicket {
        EstimateTicket {
            kind,
            location: self.params.location.clone(),
            issued_at: self.revision,
        }
    }

    /// Like `begin_estimate`, but returns None while an estimate of the same
    /// kind for the same location is outstanding. Pair with `finish_estimate`.
    pub fn try_begin_estimate(&mut self, kind: EstimateKind) -> Option<EstimateTicket> {
        let key = (kind, self.params.location.clone());
        if self.in_flight.contains(&key) {
            return None;
        }
        self.in_flight.push(key);
        Some(self.begin_estimate(kind))
    }

    pub fn finish_estimate(&mut self, ticket: &EstimateTicket) {
        self.in_flight
            .retain(|(kind, location)| !(*kind == ticket.kind && *location == ticket.location));
    }

    pub fn apply_climate(&mut self, ticket: &EstimateTicket, estimate: &ClimateEstimate) -> ApplyReport {
        self.apply_values(ticket, &estimate.values())
    }

    pub fn apply_soil(&mut self, ticket: &EstimateTicket, estimate: &SoilEstimate) -> ApplyReport {
        self.apply_values(ticket, &estimate.values())
    }

    fn apply_values(&mut self, ticket: &EstimateTicket, values: &[(NumericField, f64)]) -> ApplyReport {
        if ticket.location != self.params.location {
            debug!(
                "Discarding {} estimate for {:?}; location is now {:?}",
                ticket.kind, ticket.location, self.params.location
            );
            return ApplyReport::discarded();
        }

        let mut report = ApplyReport::default();
        for &(field, value) in values {
            let edited_since = self
                .edited_at
                .get(&field)
                .is_some_and(|&at| at > ticket.issued_at);
            if edited_since {
                report.skipped.push(field);
                continue;
            }
            match self.params.set_numeric_clamped(field, value) {
                Some(stored) => report.applied.push((field, stored)),
                None => report.skipped.push(field),
            }
        }
        report
    }

    /// Fill the text fields that are still blank and remember the estimate
    /// for request building. Returns the fields that were filled.
    pub fn apply_initial_parameters(&mut self, estimated: InitialParameters) -> Vec<TextField> {
        let mut filled = Vec::new();
        let candidates = [
            (TextField::SoilType, &estimated.soil_type),
            (TextField::HistoricalYieldData, &estimated.historical_yield_data),
            (TextField::OtherRelevantParameters, &estimated.other_relevant_parameters),
        ];

        for (field, value) in candidates {
            let value = value.trim();
            if value.is_empty() || !self.params.is_unset(field) {
                continue;
            }
            let truncated: String = value.chars().take(field.max_len()).collect();
            if self.params.set_text(field, Some(&truncated)).is_ok() {
                filled.push(field);
            }
        }

        self.estimated = Some(estimated);
        filled
    }

    pub fn build_request(&self) -> SuggestionRequest {
        build_request(&self.params, self.estimated.as_ref())
    }
}
