//! Integration tests for `AmapClient` using wiremock HTTP mocks.

use haulgeo_amap::{AmapClient, AmapError};
use haulgeo_core::{AdminLevel, Coordinate};
use haulgeo_engine::{GeocodeProvider, ProviderError, RouteProvider};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> AmapClient {
    AmapClient::with_base_url("test-key", 30, base_url)
        .expect("client construction should not fail")
        .with_retry(2, 0)
}

#[tokio::test]
async fn geocode_returns_parsed_candidates() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "status": "1",
        "info": "OK",
        "infocode": "10000",
        "count": "1",
        "geocodes": [{
            "formatted_address": "云南省昆明市西山区贵昆路188号",
            "country": "中国",
            "province": "云南省",
            "city": "昆明市",
            "citycode": "0871",
            "district": "西山区",
            "township": [],
            "neighborhood": { "name": [], "type": [] },
            "street": "贵昆路",
            "number": "188号",
            "adcode": "530112",
            "location": "102.656892,25.025324",
            "level": "门牌号"
        }]
    });

    Mock::given(method("GET"))
        .and(path("/v3/geocode/geo"))
        .and(query_param("key", "test-key"))
        .and(query_param("address", "云南省昆明市西山区贵昆路188号"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&format!("{}/v3", server.uri()));
    let candidates = client
        .geocode("云南省昆明市西山区贵昆路188号", None)
        .await
        .expect("should parse geocodes");

    assert_eq!(candidates.len(), 1);
    let top = &candidates[0];
    assert_eq!(top.level, Some(AdminLevel::HouseNumber));
    assert_eq!(top.house_number, "188号");
    assert_eq!(top.township, "");
    let coordinate = top.coordinate.expect("location should parse");
    assert!((coordinate.lat - 25.025_324).abs() < 1e-9);
    assert!((coordinate.lon - 102.656_892).abs() < 1e-9);
}

#[tokio::test]
async fn geocode_forwards_city_scope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geocode/geo"))
        .and(query_param("address", "西山区贵昆路188号"))
        .and(query_param("city", "昆明市"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "1", "info": "OK", "infocode": "10000", "count": "0", "geocodes": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let candidates = client
        .forward_geocode("西山区贵昆路188号", Some("昆明市"))
        .await
        .expect("empty result is not an error");
    assert!(candidates.is_empty());
}

#[tokio::test]
async fn error_status_becomes_api_error_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "0", "info": "INVALID_USER_KEY", "infocode": "10001"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.geocode("昆明市", None).await.unwrap_err();
    assert!(
        matches!(err, AmapError::Api { ref infocode, ref info } if infocode == "10001" && info == "INVALID_USER_KEY"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn throttled_request_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "0", "info": "CUQPS_HAS_EXCEEDED_THE_LIMIT", "infocode": "10020"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "1", "info": "OK", "infocode": "10000",
            "geocodes": [{ "location": "102.712251,25.040609", "level": "市" }]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let candidates = client.geocode("昆明市", None).await.expect("retry should succeed");
    assert_eq!(candidates[0].level, Some(AdminLevel::City));
}

#[tokio::test]
async fn server_errors_exhaust_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.geocode("昆明市", None).await.unwrap_err();
    assert!(matches!(err, AmapError::Http(_)));

    let provider_err: ProviderError = err.into();
    assert!(matches!(provider_err, ProviderError::Transport(_)));
}

#[tokio::test]
async fn malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.geocode("昆明市", None).await.unwrap_err();
    assert!(matches!(err, AmapError::Deserialize { .. }));
}

#[tokio::test]
async fn reverse_geocode_parses_address_component() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "status": "1",
        "info": "OK",
        "infocode": "10000",
        "regeocode": {
            "formatted_address": "云南省昆明市西山区前卫街道贵昆路",
            "addressComponent": {
                "country": "中国",
                "province": "云南省",
                "city": "昆明市",
                "citycode": "0871",
                "district": "西山区",
                "adcode": "530112",
                "township": "前卫街道",
                "streetNumber": { "street": "贵昆路", "number": [] }
            }
        }
    });

    Mock::given(method("GET"))
        .and(path("/geocode/regeo"))
        .and(query_param("location", "102.656892,25.025324"))
        .and(query_param("radius", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let address = client
        .reverse_geocode(Coordinate::new(25.025_324, 102.656_892), None)
        .await
        .expect("should parse regeocode");

    assert_eq!(address.township, "前卫街道");
    assert_eq!(address.street, "贵昆路");
    assert_eq!(address.house_number, "");
    assert_eq!(address.finest_level(), Some(AdminLevel::Street));
}

#[tokio::test]
async fn driving_route_joins_step_polylines() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "status": "1",
        "info": "OK",
        "infocode": "10000",
        "route": {
            "origin": "102.710000,25.040000",
            "destination": "103.800000,25.490000",
            "paths": [{
                "distance": "136042",
                "duration": "5400",
                "steps": [
                    { "polyline": "102.71,25.04;103.2,25.3" },
                    { "polyline": "103.2,25.3;103.8,25.49" }
                ]
            }]
        }
    });

    Mock::given(method("GET"))
        .and(path("/direction/driving"))
        .and(query_param("origin", "102.710000,25.040000"))
        .and(query_param("destination", "103.800000,25.490000"))
        .and(query_param("waypoints", "102.540000,24.350000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let route = client
        .route(&[
            Coordinate::new(25.04, 102.71),
            Coordinate::new(24.35, 102.54),
            Coordinate::new(25.49, 103.80),
        ])
        .await
        .expect("should parse driving route");

    assert_eq!(route.coordinates.len(), 3);
    assert_eq!(route.coordinates[1], Coordinate::new(25.3, 103.2));
    assert_eq!(route.distance_meters, Some(136_042.0));
}

#[tokio::test]
async fn driving_route_without_paths_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/direction/driving"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "1", "info": "OK", "infocode": "10000", "route": { "paths": [] }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .route(&[Coordinate::new(25.04, 102.71), Coordinate::new(25.49, 103.80)])
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Rejected { .. }));
}
