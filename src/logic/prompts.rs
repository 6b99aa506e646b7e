//! Fixed instruction templates and response schemas for each model call.

use crate::datasources::Prompt;
use crate::models::SuggestionRequest;
use serde_json::{json, Value};

pub const DEFAULT_CROPS_HINT: &str = "common crops for the area";

fn number(description: &str) -> Value {
    json!({ "type": "NUMBER", "description": description })
}

fn string(description: &str) -> Value {
    json!({ "type": "STRING", "description": description })
}

fn string_list(description: &str) -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" }, "description": description })
}

fn object(properties: Value, required: &[&str]) -> Value {
    json!({ "type": "OBJECT", "properties": properties, "required": required })
}

pub fn climate(location_description: &str) -> Prompt {
    let text = format!(
        "You are an agricultural climate data provider. Based on the provided location \
description, estimate the typical average environmental parameters. Provide numerical \
estimates only.

Location Description: {location_description}

Estimate the following average values for this location:
- averageTemperatureC: Average monthly temperature in Celsius.
- averageHumidityPercent: Average monthly relative humidity percentage (0-100).
- averageMonthlyRainfallMM: Average monthly rainfall in millimeters.

Return only the numerical estimates in the specified JSON format. Ensure humidity is between 0 and 100."
    );

    let schema = object(
        json!({
            "averageTemperatureC": number("Estimated average yearly temperature in Celsius."),
            "averageHumidityPercent": number("Estimated average yearly relative humidity percentage (0-100)."),
            "averageMonthlyRainfallMM": number("Estimated average monthly rainfall in millimeters."),
        }),
        &[
            "averageTemperatureC",
            "averageHumidityPercent",
            "averageMonthlyRainfallMM",
        ],
    );

    Prompt::new("climate", text, schema)
}

pub fn soil(location_description: &str) -> Prompt {
    let text = format!(
        "You are an agricultural soil data provider. Based on the provided location \
description, estimate the typical average soil parameters. Provide numerical estimates only.

Location Description: {location_description}

Estimate the following average soil values for this location:
- nitrogen_kg_ha: Typical Nitrogen (N) content in kilograms per hectare (kg/ha).
- phosphorus_kg_ha: Typical Phosphorus (P) content in kilograms per hectare (kg/ha).
- potassium_kg_ha: Typical Potassium (K) content in kilograms per hectare (kg/ha).
- ph: Typical soil pH value (e.g., between 4.0 and 9.0).

Return only the numerical estimates in the specified JSON format. Ensure pH is within a \
reasonable range (3.5 to 10.0)."
    );

    let schema = object(
        json!({
            "nitrogen_kg_ha": number("Estimated typical Nitrogen (N) in kg/ha."),
            "phosphorus_kg_ha": number("Estimated typical Phosphorus (P) in kg/ha."),
            "potassium_kg_ha": number("Estimated typical Potassium (K) in kg/ha."),
            "ph": number("Estimated typical soil pH (e.g., 6.5)."),
        }),
        &["nitrogen_kg_ha", "phosphorus_kg_ha", "potassium_kg_ha", "ph"],
    );

    Prompt::new("soil", text, schema)
}

pub fn initial_parameters(location_description: &str, desired_crops: &str) -> Prompt {
    let text = format!(
        "You are an expert agricultural consultant. A user is planning crops and needs \
initial parameters for their location and desired crops. Climate information is provided \
separately.

Location Description: {location_description}
Desired Crops: {desired_crops}

Output the following parameters:
- soilType: The predicted soil type for the given location, under 100 characters.
- historicalYieldData: An estimate of historical yield (e.g., tons per acre) for the \
specified crops in the given location, under 100 words.
- otherRelevantParameters: Any other parameters relevant to crop prediction, such as pest \
pressure or market demand in the area, under 100 words."
    );

    let schema = object(
        json!({
            "soilType": string("The predicted soil type for the given location."),
            "historicalYieldData": string("An estimate of historical yield data for the crops in the location."),
            "otherRelevantParameters": string("Other parameters relevant to crop prediction for the location and crops."),
        }),
        &["soilType", "historicalYieldData", "otherRelevantParameters"],
    );

    Prompt::new("initial_parameters", text, schema)
}

pub fn reverse_geocode(latitude: f64, longitude: f64) -> Prompt {
    let text = format!(
        "Based on the provided latitude and longitude coordinates, describe the general \
location. Include the city, state/region, and country if possible. Be concise.

Latitude: {latitude}
Longitude: {longitude}"
    );

    let schema = object(
        json!({
            "locationDescription": string("A general description of the location, including city, state/region, and country."),
        }),
        &["locationDescription"],
    );

    Prompt::new("reverse_geocode", text, schema)
}

pub fn crop_suggestions(request: &SuggestionRequest) -> Prompt {
    let (desired, instruction) = if request.wants_open_suggestions() {
        (
            "Suggest based on parameters".to_string(),
            "No crops were specified: identify 3-5 crops best suited for the given conditions \
and provide the analysis for them.",
        )
    } else {
        (
            request.crop_suggestions.join(", "),
            "Analyze exactly the crops in the Desired Crops list, and no others.",
        )
    };

    let text = format!(
        "You are an expert agricultural consultant providing crop recommendations.

For each crop, provide:
1. Specific reasons why the crop is suitable (or unsuitable) considering all provided parameters.
2. Concrete, actionable steps to increase confidence in this crop's success or to optimize \
conditions for it (e.g., soil amendments, irrigation adjustments, pest monitoring).

Farm Data:
Location: {location}
Climate Conditions: {climate}
Soil Type: {soil_type}
Detailed Soil Parameters: {soil}
Historical Yield Data: {yield_data}
Other Relevant Parameters: {other}
Desired Crops: {desired}

{instruction}",
        location = request.location,
        climate = request.climate_conditions,
        soil_type = request.soil_type,
        soil = request.soil_conditions,
        yield_data = request.historical_yield_data,
        other = request.other_relevant_parameters,
    );

    let schema = object(
        json!({
            "improvedSuggestions": {
                "type": "ARRAY",
                "items": object(
                    json!({
                        "crop": string("The suggested or analyzed crop."),
                        "reasons": string_list("Reasons for the crop's suitability based on the provided data."),
                        "suggestedActions": string_list("Concrete, actionable steps to increase confidence or optimize for the crop."),
                    }),
                    &["crop", "reasons", "suggestedActions"],
                ),
            },
        }),
        &["improvedSuggestions"],
    );

    Prompt::new("crop_suggestions", text, schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NOT_SPECIFIED, SUGGEST_SENTINEL};

    fn request(crops: &[&str]) -> SuggestionRequest {
        SuggestionRequest {
            crop_suggestions: crops.iter().map(|s| s.to_string()).collect(),
            location: "Sacramento, California".into(),
            soil_type: "Loam".into(),
            climate_conditions: "Avg Temp: 25°C".into(),
            soil_conditions: "N: 50 kg/ha".into(),
            historical_yield_data: NOT_SPECIFIED.into(),
            other_relevant_parameters: NOT_SPECIFIED.into(),
        }
    }

    #[test]
    fn sentinel_request_asks_for_three_to_five() {
        let prompt = crop_suggestions(&request(&[SUGGEST_SENTINEL]));
        assert!(prompt.text.contains("3-5 crops"));
        assert!(prompt.text.contains("Desired Crops: Suggest based on parameters"));
    }

    #[test]
    fn explicit_crops_are_listed() {
        let prompt = crop_suggestions(&request(&["tomato", "basil"]));
        assert!(prompt.text.contains("Desired Crops: tomato, basil"));
        assert!(prompt.text.contains("exactly the crops"));
        assert!(!prompt.text.contains("3-5 crops"));
    }

    #[test]
    fn schemas_require_every_key() {
        let prompt = climate("Jharkhand, India");
        assert!(prompt.text.contains("Jharkhand, India"));
        assert_eq!(prompt.schema["required"].as_array().unwrap().len(), 3);

        let prompt = soil("Jharkhand, India");
        assert_eq!(prompt.schema["required"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn reverse_geocode_embeds_coordinates() {
        let prompt = reverse_geocode(38.5816, -121.4944);
        assert!(prompt.text.contains("Latitude: 38.5816"));
        assert!(prompt.text.contains("Longitude: -121.4944"));
    }
}
