use cropwise::config::{Config, GeocodingConfig, LlmConfig, PlanningConfig};
use cropwise::datasources::FixedPosition;
use cropwise::logic::PlanningService;
use cropwise::models::TextField;
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

fn answer(value: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{ "content": { "parts": [{ "text": value.to_string() }] } }]
    }))
}

async fn mount_prompt(server: &MockServer, marker: &str, value: Value) {
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains(marker))
        .respond_with(answer(value))
        .mount(server)
        .await;
}

fn service_for(server: &MockServer) -> PlanningService {
    let config = Config {
        llm: LlmConfig {
            api_key: "test-key".into(),
            model: "gemini-2.0-flash".into(),
            base_url: server.uri(),
        },
        geocoding: GeocodingConfig {
            base_url: server.uri(),
            ..GeocodingConfig::default()
        },
        planning: PlanningConfig::default(),
    };
    PlanningService::from_config(&config).expect("Failed to build service")
}

/// Device position -> description -> concurrent estimates -> suggestions
#[tokio::test]
async fn test_current_location_to_suggestions() {
    let server = MockServer::start().await;

    mount_prompt(
        &server,
        "describe the general location",
        json!({ "locationDescription": "Sacramento, California, USA" }),
    )
    .await;
    mount_prompt(
        &server,
        "agricultural climate data provider",
        json!({
            "averageTemperatureC": 17.0,
            "averageHumidityPercent": 55.0,
            "averageMonthlyRainfallMM": 38.0
        }),
    )
    .await;
    mount_prompt(
        &server,
        "agricultural soil data provider",
        json!({
            "nitrogen_kg_ha": 35.0,
            "phosphorus_kg_ha": 30.0,
            "potassium_kg_ha": 160.0,
            "ph": 6.9
        }),
    )
    .await;
    mount_prompt(
        &server,
        "needs initial parameters",
        json!({
            "soilType": "Loam",
            "historicalYieldData": "Processing tomatoes around 50 t/acre",
            "otherRelevantParameters": "Hot, dry summers"
        }),
    )
    .await;
    mount_prompt(
        &server,
        "providing crop recommendations",
        json!({
            "improvedSuggestions": [
                {
                    "crop": "Tomato",
                    "reasons": ["long warm season", "loam soil", "local processing demand"],
                    "suggestedActions": ["drip irrigation"]
                },
                { "crop": "Almond", "reasons": ["mild winters"], "suggestedActions": ["a", "b", "c"] }
            ]
        }),
    )
    .await;

    let service = service_for(&server);
    let outcome = service
        .use_current_location(&FixedPosition::new(38.5816, -121.4944, Some(25.0)))
        .await
        .expect("Location flow failed");

    assert_eq!(outcome.location, "Sacramento, California, USA");
    assert!(outcome.refresh.expect("Expected a refresh").all_ok());

    let params = service.parameters().await;
    assert_eq!(params.temperature, 17.0);
    assert_eq!(params.potassium, 160.0);

    let submission = service.submit().await.expect("Submit failed");
    assert_eq!(submission.request.soil_type, "Loam");
    assert_eq!(
        submission.request.crop_suggestions,
        vec!["suggest based on parameters"]
    );
    assert_eq!(submission.filled.len(), 3);
    assert_eq!(
        submission.parameters.text(TextField::SoilType),
        Some("Loam")
    );
    assert_eq!(submission.result.suggestions.len(), 2);
    assert_eq!(
        submission.result.suggestions[0].confidence().as_str(),
        "High"
    );
    assert_eq!(submission.result.suggestions[1].confidence().as_str(), "Low");
}

/// Forward geocoding stores coordinates on the session
#[tokio::test]
async fn test_resolve_location_records_coordinates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "lat": "38.5449", "lon": "-121.7405", "display_name": "Davis, Yolo County, California" }
        ])))
        .mount(&server)
        .await;

    let service = service_for(&server);
    service
        .session()
        .write()
        .await
        .edit_location("Davis, California")
        .unwrap();

    let place = service.resolve_location().await.unwrap().unwrap();
    assert_eq!(place.latitude, 38.5449);

    let session = service.session();
    let session = session.read().await;
    assert_eq!(
        session.coordinates().map(|c| c.display_name.as_str()),
        Some("Davis, Yolo County, California")
    );
}
