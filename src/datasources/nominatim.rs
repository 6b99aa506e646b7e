use crate::config::GeocodingConfig;
use crate::error::{CropWiseError, Result};
use crate::models::GeocodeResult;
use async_trait::async_trait;
use reqwest::header::ACCEPT_LANGUAGE;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

/// Free-text place search.
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn search(&self, location: &str) -> Result<Option<GeocodeResult>>;

    async fn test_connection(&self) -> Result<bool> {
        Ok(true)
    }
}

/// Forward geocoding against a Nominatim-compatible place search API.
pub struct NominatimClient {
    client: reqwest::Client,
    config: GeocodingConfig,
}

impl NominatimClient {
    pub fn new(config: GeocodingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Resolve free text to the provider's best match.
    ///
    /// Returns `Ok(None)` when the provider answers with a non-2xx status or
    /// no candidates; transport failures and malformed candidates are errors.
    pub async fn forward_geocode(&self, location: &str) -> Result<Option<GeocodeResult>> {
        let url = Url::parse_with_params(
            &self.endpoint("search"),
            &[("format", "json"), ("q", location)],
        )
        .map_err(|e| CropWiseError::Config(format!("Invalid geocoding base_url: {}", e)))?;

        debug!("Geocoding {:?}", location);

        let response = self
            .client
            .get(url)
            .header(ACCEPT_LANGUAGE, self.config.accept_language.as_str())
            .send()
            .await
            .map_err(|e| CropWiseError::Upstream(format!("Nominatim: {}", e)))?;

        if !response.status().is_success() {
            warn!("Nominatim returned {} for {:?}", response.status(), location);
            return Ok(None);
        }

        let body: Value = response.json().await.map_err(|e| {
            CropWiseError::Upstream(format!("Failed to parse Nominatim response: {}", e))
        })?;

        let best = match body.as_array().and_then(|places| places.first()) {
            Some(place) => place,
            None => {
                debug!("No geocoding candidates for {:?}", location);
                return Ok(None);
            }
        };

        let latitude = coordinate(best, "lat")?;
        let longitude = coordinate(best, "lon")?;
        let display_name = best
            .get("display_name")
            .and_then(Value::as_str)
            .unwrap_or(location);

        GeocodeResult::new(latitude, longitude, display_name).map(Some)
    }
}

#[async_trait]
impl PlaceSearch for NominatimClient {
    async fn search(&self, location: &str) -> Result<Option<GeocodeResult>> {
        self.forward_geocode(location).await
    }

    async fn test_connection(&self) -> Result<bool> {
        let response = self
            .client
            .get(self.endpoint("status"))
            .send()
            .await
            .map_err(|e| CropWiseError::Upstream(format!("Nominatim: {}", e)))?;

        Ok(response.status().is_success())
    }
}

// Nominatim sends coordinates as strings; accept plain numbers too.
fn coordinate(place: &Value, key: &str) -> Result<f64> {
    let value = place.get(key);
    value
        .and_then(|v| match v {
            Value::String(s) => s.trim().parse::<f64>().ok(),
            Value::Number(n) => n.as_f64(),
            _ => None,
        })
        .ok_or_else(|| {
            CropWiseError::Upstream(format!("Nominatim candidate has invalid {}: {:?}", key, value))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coordinate_accepts_strings_and_numbers() {
        let place = json!({"lat": "38.5816", "lon": -121.4944});
        assert_eq!(coordinate(&place, "lat").unwrap(), 38.5816);
        assert_eq!(coordinate(&place, "lon").unwrap(), -121.4944);
    }

    #[test]
    fn coordinate_rejects_garbage() {
        let place = json!({"lat": "north", "lon": null});
        assert!(matches!(
            coordinate(&place, "lat"),
            Err(CropWiseError::Upstream(_))
        ));
        assert!(coordinate(&place, "lon").is_err());
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        let client = NominatimClient::new(GeocodingConfig {
            base_url: "http://localhost:8080/".into(),
            ..GeocodingConfig::default()
        })
        .unwrap();
        assert_eq!(client.endpoint("search"), "http://localhost:8080/search");
    }
}
