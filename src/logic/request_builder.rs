use crate::models::{
    FarmParameters, InitialParameters, SuggestionRequest, TextField, NOT_SPECIFIED,
    SUGGEST_SENTINEL,
};

/// Split a comma-separated crop list, trimming entries and dropping empties.
pub fn parse_crop_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn climate_summary(params: &FarmParameters) -> String {
    format!(
        "Avg Temp: {}°C, Avg Humidity: {}%, Avg Rainfall: {}mm/month",
        params.temperature, params.humidity, params.rainfall
    )
}

pub fn soil_summary(params: &FarmParameters, soil_type: Option<&str>) -> String {
    format!(
        "N: {} kg/ha, P: {} kg/ha, K: {} kg/ha, pH: {:.2}, Soil Type: {}",
        params.nitrogen,
        params.phosphorus,
        params.potassium,
        params.ph,
        soil_type.unwrap_or("Not specified")
    )
}

fn text_or_estimated<'a>(
    params: &'a FarmParameters,
    estimated: Option<&'a InitialParameters>,
    field: TextField,
) -> Option<&'a str> {
    params.text(field).or_else(|| {
        let estimated = estimated?;
        let value = match field {
            TextField::SoilType => &estimated.soil_type,
            TextField::HistoricalYieldData => &estimated.historical_yield_data,
            TextField::OtherRelevantParameters => &estimated.other_relevant_parameters,
            TextField::DesiredCrops => return None,
        };
        Some(value.trim()).filter(|s| !s.is_empty())
    })
}

/// Build the generator request from the current parameters. Optional text
/// fields prefer the user's value, then the latest estimated value.
pub fn build_request(
    params: &FarmParameters,
    estimated: Option<&InitialParameters>,
) -> SuggestionRequest {
    let mut crops = params
        .text(TextField::DesiredCrops)
        .map(parse_crop_list)
        .unwrap_or_default();
    if crops.is_empty() {
        crops.push(SUGGEST_SENTINEL.to_string());
    }

    let pick = |field| text_or_estimated(params, estimated, field);
    let soil_type = pick(TextField::SoilType);

    SuggestionRequest {
        crop_suggestions: crops,
        location: params.location.trim().to_string(),
        soil_type: soil_type.unwrap_or(NOT_SPECIFIED).to_string(),
        climate_conditions: climate_summary(params),
        soil_conditions: soil_summary(params, soil_type),
        historical_yield_data: pick(TextField::HistoricalYieldData)
            .unwrap_or(NOT_SPECIFIED)
            .to_string(),
        other_relevant_parameters: pick(TextField::OtherRelevantParameters)
            .unwrap_or(NOT_SPECIFIED)
            .to_string(),
    }
}
