//! Integration tests for `PoiClient` against a `wiremock` server.
//!
//! Covers paged search stop conditions, failure degradation, and the
//! GPS → IP → unavailable location chain. No real network traffic.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use eatwhat_core::{GeoPoint, LocationSource};
use eatwhat_provider::{
    FetchStop, LocationResolution, PoiClient, ProviderError, SearchAnchor, UNKNOWN_LOCATION_LABEL,
};

fn test_client(server: &MockServer) -> PoiClient {
    PoiClient::new("test-key", 5, "eatwhat-test/0.1", 0, 0)
        .expect("failed to build test PoiClient")
        .with_base_url(&server.uri())
}

fn around() -> SearchAnchor {
    SearchAnchor::Around {
        point: GeoPoint::new(30.5728, 104.0668),
        radius_m: 2000,
    }
}

/// `n` POIs whose names are prefixed with the page number.
fn page_json(page: u32, n: usize) -> serde_json::Value {
    let pois: Vec<_> = (0..n)
        .map(|i| {
            json!({
                "id": format!("P{page}-{i}"),
                "name": format!("餐厅 {page}-{i}"),
                "address": if i % 2 == 0 { json!(format!("路 {i} 号")) } else { json!([]) },
                "location": "104.066800,30.572800",
                "type": "餐饮服务;中餐厅",
                "distance": format!("{}", 100 + i),
                "biz_ext": {"rating": [], "cost": []},
                "photos": []
            })
        })
        .collect();
    json!({"status": "1", "info": "OK", "count": n.to_string(), "pois": pois})
}

async fn mount_page(server: &MockServer, route: &str, page: u32, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(query_param("page", page.to_string().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(server)
        .await;
}

async fn forbid_page(server: &MockServer, route: &str, page: u32) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(query_param("page", page.to_string().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page_json(page, 25)))
        .expect(0)
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Paged search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn short_third_page_stops_pagination_with_sixty_items() {
    let server = MockServer::start().await;
    mount_page(&server, "/v3/place/around", 1, page_json(1, 25)).await;
    mount_page(&server, "/v3/place/around", 2, page_json(2, 25)).await;
    mount_page(&server, "/v3/place/around", 3, page_json(3, 10)).await;
    forbid_page(&server, "/v3/place/around", 4).await;

    let fetch = test_client(&server).fetch_all(&around()).await;

    assert_eq!(fetch.len(), 60);
    assert_eq!(fetch.pages_requested, 3);
    assert_eq!(fetch.stop, FetchStop::ShortPage { page: 3, len: 10 });
    assert_eq!(fetch.items[0].name.as_deref(), Some("餐厅 1-0"));
    assert_eq!(fetch.items[59].name.as_deref(), Some("餐厅 3-9"));
}

#[tokio::test]
async fn four_full_pages_hit_the_page_limit() {
    let server = MockServer::start().await;
    for page in 1..=4 {
        mount_page(&server, "/v3/place/around", page, page_json(page, 25)).await;
    }
    forbid_page(&server, "/v3/place/around", 5).await;

    let fetch = test_client(&server).fetch_all(&around()).await;

    assert_eq!(fetch.len(), 100);
    assert_eq!(fetch.stop, FetchStop::PageLimit);
}

#[tokio::test]
async fn empty_page_stops_without_requesting_more() {
    let server = MockServer::start().await;
    mount_page(&server, "/v3/place/around", 1, page_json(1, 25)).await;
    mount_page(&server, "/v3/place/around", 2, page_json(2, 0)).await;
    forbid_page(&server, "/v3/place/around", 3).await;

    let fetch = test_client(&server).fetch_all(&around()).await;

    assert_eq!(fetch.len(), 25);
    assert_eq!(fetch.stop, FetchStop::EmptyPage { page: 2 });
}

#[tokio::test]
async fn provider_rejection_keeps_earlier_pages() {
    let server = MockServer::start().await;
    mount_page(&server, "/v3/place/around", 1, page_json(1, 25)).await;
    mount_page(
        &server,
        "/v3/place/around",
        2,
        json!({"status": "0", "info": "DAILY_QUERY_OVER_LIMIT", "infocode": "10003"}),
    )
    .await;
    forbid_page(&server, "/v3/place/around", 3).await;

    let fetch = test_client(&server).fetch_all(&around()).await;

    assert_eq!(fetch.len(), 25);
    assert_eq!(
        fetch.stop,
        FetchStop::Rejected {
            page: 2,
            info: "DAILY_QUERY_OVER_LIMIT".to_string()
        }
    );
}

#[tokio::test]
async fn transport_failure_discards_everything() {
    let server = MockServer::start().await;
    mount_page(&server, "/v3/place/around", 1, page_json(1, 25)).await;
    Mock::given(method("GET"))
        .and(path("/v3/place/around"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;
    forbid_page(&server, "/v3/place/around", 3).await;

    let fetch = test_client(&server).fetch_all(&around()).await;

    assert!(fetch.is_empty());
    assert!(matches!(fetch.stop, FetchStop::TransportFailure { page: 2, .. }));
}

#[tokio::test]
async fn city_mode_uses_text_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/place/text"))
        .and(query_param("city", "成都市"))
        .and(query_param("citylimit", "true"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page_json(1, 3)))
        .expect(1)
        .mount(&server)
        .await;

    let fetch = test_client(&server)
        .fetch_all(&SearchAnchor::City("成都市".to_string()))
        .await;

    assert_eq!(fetch.len(), 3);
    let items = fetch.sync_items();
    assert_eq!(items.len(), 3);
    assert_eq!(items[1].address, "unknown");
    assert_eq!(items[0].distance_meters, Some(100.0));
}

#[tokio::test]
async fn fetch_page_surfaces_rate_limit_after_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/place/around"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .expect(3)
        .mount(&server)
        .await;

    let client = PoiClient::new("test-key", 5, "eatwhat-test/0.1", 2, 0)
        .expect("failed to build test PoiClient")
        .with_base_url(&server.uri());
    let result = client.fetch_page(&around(), 1).await;

    match result {
        Err(ProviderError::RateLimited {
            retry_after_secs, ..
        }) => assert_eq!(retry_after_secs, 30),
        other => panic!("expected RateLimited, got: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_page_reports_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/place/around"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = test_client(&server).fetch_page(&around(), 1).await;

    assert!(matches!(result, Err(ProviderError::Deserialize { .. })));
}

// ---------------------------------------------------------------------------
// Location chain
// ---------------------------------------------------------------------------

async fn mount_ip(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/v3/ip"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(server)
        .await;
}

fn chengdu_ip() -> serde_json::Value {
    json!({
        "status": "1",
        "info": "OK",
        "province": "四川省",
        "city": "成都市",
        "adcode": "510100",
        "rectangle": "103.9,30.5;104.2,30.8"
    })
}

#[tokio::test]
async fn gps_fix_is_labelled_by_reverse_geocode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/geocode/regeo"))
        .and(query_param("location", "104.066800,30.572800"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "status": "1",
            "regeocode": {"formatted_address": "四川省成都市武侯区天府大道"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resolution = test_client(&server)
        .resolve_location(Some(GeoPoint::new(30.5728, 104.0668)))
        .await;

    let fix = resolution.fix().expect("expected a fix");
    assert_eq!(fix.source, LocationSource::Gps);
    assert_eq!(fix.label, "四川省成都市武侯区天府大道");
    assert!(fix.city.is_none());
}

#[tokio::test]
async fn gps_fix_without_address_keeps_the_coordinate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/geocode/regeo"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(&json!({"status": "0", "info": "ENGINE_RESPONSE_DATA_ERROR"})),
        )
        .mount(&server)
        .await;
    mount_ip(&server, chengdu_ip()).await;

    let resolution = test_client(&server)
        .resolve_location(Some(GeoPoint::new(30.5728, 104.0668)))
        .await;

    let fix = resolution.fix().expect("expected a fix");
    assert_eq!(fix.source, LocationSource::Gps);
    assert_eq!(fix.label, UNKNOWN_LOCATION_LABEL);
}

#[tokio::test]
async fn reverse_geocode_failure_falls_back_to_ip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/geocode/regeo"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_ip(&server, chengdu_ip()).await;

    let resolution = test_client(&server)
        .resolve_location(Some(GeoPoint::new(30.5728, 104.0668)))
        .await;

    let fix = resolution.fix().expect("expected a fix");
    assert_eq!(fix.source, LocationSource::Ip);
    assert_eq!(fix.label, "四川省成都市");
    assert_eq!(fix.city.as_deref(), Some("成都市"));
    let point = fix.point.expect("rectangle centre");
    assert!((point.lat - 30.65).abs() < 1e-9);
    assert!((point.lng - 104.05).abs() < 1e-9);
}

#[tokio::test]
async fn no_gps_goes_straight_to_ip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/geocode/regeo"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mount_ip(&server, chengdu_ip()).await;

    let resolution = test_client(&server).resolve_location(None).await;

    assert_eq!(
        resolution.fix().map(|f| f.source),
        Some(LocationSource::Ip)
    );
}

#[tokio::test]
async fn ip_city_without_rectangle_is_a_city_only_fix() {
    let server = MockServer::start().await;
    mount_ip(
        &server,
        json!({"status": "1", "province": "四川省", "city": "成都市", "rectangle": []}),
    )
    .await;

    let resolution = test_client(&server).resolve_location(None).await;

    let fix = resolution.fix().expect("expected a fix");
    assert_eq!(fix.source, LocationSource::Ip);
    assert_eq!(fix.label, "四川省成都市");
    assert!(fix.point.is_none());
    assert_eq!(
        SearchAnchor::for_fix(fix, 2000),
        Some(SearchAnchor::City("成都市".to_string()))
    );
}

#[tokio::test]
async fn unplaceable_ip_is_unavailable() {
    let server = MockServer::start().await;
    mount_ip(
        &server,
        json!({"status": "1", "info": "OK", "province": [], "city": [], "rectangle": []}),
    )
    .await;

    let resolution = test_client(&server).resolve_location(None).await;

    assert_eq!(resolution, LocationResolution::Unavailable);
}

#[tokio::test]
async fn ip_network_failure_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/ip"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let resolution = test_client(&server).resolve_location(None).await;

    assert_eq!(resolution, LocationResolution::Unavailable);
}
