//! Offline unit tests for eatwhat-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::path::PathBuf;

use chrono::Utc;
use eatwhat_core::{AppConfig, Candidate, Category, Environment};
use eatwhat_db::{CandidateRow, CategoryRow, FavoriteToggle, PoolConfig};
use rust_decimal::Decimal;

fn app_config() -> AppConfig {
    AppConfig {
        database_url: Some("postgres://example".to_string()),
        env: Environment::Test,
        log_level: "info".to_string(),
        poi_api_key: None,
        poi_base_url: "https://restapi.amap.com".to_string(),
        poi_keyword: "餐饮".to_string(),
        poi_types: "050000".to_string(),
        search_radius_m: 2000,
        nearby_radius_km: 3.0,
        user_key: "local".to_string(),
        cache_path: PathBuf::from("./.eatwhat/cache.json"),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        provider_request_timeout_secs: 30,
        provider_user_agent: "ua".to_string(),
        provider_max_retries: 3,
        provider_retry_backoff_base_secs: 1,
        provider_inter_request_delay_ms: 0,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[tokio::test]
async fn connect_without_database_url_is_a_typed_error() {
    let mut config = app_config();
    config.database_url = None;
    let err = eatwhat_db::connect_from_app_config(&config)
        .await
        .expect_err("no URL must fail before connecting");
    assert!(matches!(err, eatwhat_db::DbError::MissingDatabaseUrl));
}

#[test]
fn candidate_row_maps_coordinates_into_a_point() {
    let row = CandidateRow {
        id: 3,
        name: "川味小馆".to_string(),
        address: "人民路 12 号".to_string(),
        category_id: 2,
        rating: Decimal::new(43, 1),
        price_label: "￥45".to_string(),
        tags: vec!["辣".to_string()],
        image_url: None,
        description: "餐饮服务;中餐厅;川菜馆".to_string(),
        lat: 30.66,
        lng: 104.06,
        created_at: Utc::now(),
    };

    let candidate = Candidate::from(row);
    assert_eq!(candidate.id, 3);
    assert!((candidate.location.lat - 30.66).abs() < f64::EPSILON);
    assert!((candidate.location.lng - 104.06).abs() < f64::EPSILON);
    assert_eq!(candidate.tags, ["辣"]);
    assert!(candidate.distance_meters.is_none(), "distance is never persisted");
}

#[test]
fn category_row_drops_timestamps() {
    let row = CategoryRow {
        id: 5,
        name: "甜点饮品".to_string(),
        icon: Some("Coffee".to_string()),
        description: None,
        created_at: Utc::now(),
    };
    assert_eq!(
        Category::from(row),
        Category {
            id: 5,
            name: "甜点饮品".to_string(),
            icon: Some("Coffee".to_string()),
            description: None,
        }
    );
}

#[test]
fn favorite_toggle_displays_lowercase() {
    assert_eq!(FavoriteToggle::Added.to_string(), "added");
    assert_eq!(FavoriteToggle::Removed.to_string(), "removed");
}
