use crate::datasources::{generate_structured, LanguageModel, PlaceSearch};
use crate::error::Result;
use crate::logic::prompts;
use crate::models::{GeocodeResult, LocationQuery, ReverseGeocodeOutput};
use std::sync::Arc;
use tracing::debug;

/// Forward geocoding through a place-search service, reverse geocoding
/// through the language model.
#[derive(Clone)]
pub struct Geocoder {
    places: Arc<dyn PlaceSearch>,
    model: Arc<dyn LanguageModel>,
}

impl Geocoder {
    pub fn new(places: Arc<dyn PlaceSearch>, model: Arc<dyn LanguageModel>) -> Self {
        Self { places, model }
    }

    pub async fn forward_geocode(&self, location: &str) -> Result<Option<GeocodeResult>> {
        self.places.search(location).await
    }

    /// Coordinates short-circuit the place search; descriptions go through it.
    pub async fn resolve(&self, query: &LocationQuery) -> Result<Option<GeocodeResult>> {
        match query {
            LocationQuery::Coordinates {
                latitude,
                longitude,
            } => GeocodeResult::new(
                *latitude,
                *longitude,
                crate::models::coordinate_placeholder(*latitude, *longitude),
            )
            .map(Some),
            LocationQuery::Description(text) => self.forward_geocode(text).await,
        }
    }

    /// Model errors are returned as-is; an empty description is a valid
    /// answer and is left for the caller to handle.
    pub async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ReverseGeocodeOutput> {
        let prompt = prompts::reverse_geocode(latitude, longitude);
        let mut output: ReverseGeocodeOutput =
            generate_structured(self.model.as_ref(), &prompt).await?;
        output.location_description = output.location_description.trim().to_string();

        debug!(
            "Reverse geocoded {:.4}, {:.4} to {:?}",
            latitude, longitude, output.location_description
        );
        Ok(output)
    }

    pub async fn test_connection(&self) -> Result<bool> {
        self.places.test_connection().await
    }
}
