use cropwise::config::GeocodingConfig;
use cropwise::datasources::{NominatimClient, PlaceSearch};
use cropwise::error::CropWiseError;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> NominatimClient {
    NominatimClient::new(GeocodingConfig {
        base_url: server.uri(),
        user_agent: "CropWise-Test/1.0 (test@example.com)".into(),
        accept_language: "en".into(),
    })
    .expect("Failed to create client")
}

/// First candidate wins; string coordinates are parsed
#[tokio::test]
async fn test_forward_geocode_returns_first_candidate() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("format", "json"))
        .and(query_param("q", "Sacramento, California"))
        .and(header("accept-language", "en"))
        .and(header("user-agent", "CropWise-Test/1.0 (test@example.com)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "lat": "38.5810606",
                "lon": "-121.4938950",
                "display_name": "Sacramento, Sacramento County, California, United States"
            },
            {
                "lat": "38.0",
                "lon": "-121.0",
                "display_name": "Somewhere else"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server)
        .forward_geocode("Sacramento, California")
        .await
        .expect("Geocode failed")
        .expect("Expected a match");

    assert_eq!(result.latitude, 38.5810606);
    assert_eq!(result.longitude, -121.4938950);
    assert!(result.display_name.starts_with("Sacramento, Sacramento County"));
}

/// An empty candidate list is "no match", not an error
#[tokio::test]
async fn test_forward_geocode_empty_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .search("Atlantis")
        .await
        .expect("Geocode failed");
    assert!(result.is_none());
}

/// Non-2xx responses are treated as no match
#[tokio::test]
async fn test_forward_geocode_server_error_is_no_match() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .forward_geocode("Davis, California")
        .await
        .expect("Geocode failed");
    assert!(result.is_none());
}

/// Out-of-range coordinates from the provider are an upstream error
#[tokio::test]
async fn test_forward_geocode_rejects_invalid_coordinates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "lat": "123.4", "lon": "10.0", "display_name": "Nowhere" }
        ])))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .forward_geocode("Nowhere")
        .await
        .unwrap_err();
    match err {
        CropWiseError::Upstream(msg) => assert!(msg.contains("out-of-range")),
        e => panic!("Expected Upstream error, got: {:?}", e),
    }
}

/// Missing display_name falls back to the query text
#[tokio::test]
async fn test_forward_geocode_display_name_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "lat": 28.6, "lon": 77.2 }])),
        )
        .mount(&server)
        .await;

    let result = client_for(&server)
        .forward_geocode("Delhi")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.display_name, "Delhi");
}

#[tokio::test]
async fn test_connection_checks_status_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&server)
        .await;

    assert!(client_for(&server).test_connection().await.unwrap());
}
