use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use bazaarlink::cache::MemoryCacheStore;
use bazaarlink::config::BazaarConfig;
use bazaarlink::core::RecommendationEngine;
use bazaarlink::storage::{FileArtifactStore, MemoryCatalog};
use bazaarlink_server::config::ServerConfig;
use bazaarlink_server::{AppState, create_router};
use http::StatusCode;
use serde_json::{Value, json};
use tempfile::TempDir;

const LAT: f64 = 40.7128;
const LON: f64 = -74.006;

fn snapshot() -> Value {
    let two_days_ago = (chrono::Utc::now() - chrono::Duration::days(2)).to_rfc3339();
    json!({
        "users": [
            { "id": "u1" },
            { "id": "u2", "latitude": LAT, "longitude": LON },
            { "id": "u3", "latitude": LAT, "longitude": LON }
        ],
        "shops": [
            { "id": "bakery", "name": "Corner Bakery", "latitude": LAT, "longitude": LON, "average_rating": 4.6 },
            { "id": "grocer", "name": "Green Grocer", "latitude": LAT + 0.01, "longitude": LON, "average_rating": 4.1 }
        ],
        "products": [
            { "id": "sourdough", "shop_id": "bakery", "name": "Sourdough", "category": "bakery", "price": 6.5, "average_rating": 4.8 },
            { "id": "croissant", "shop_id": "bakery", "name": "Croissant", "category": "bakery", "price": 2.5, "average_rating": 4.9 },
            { "id": "baguette", "shop_id": "bakery", "name": "Baguette", "category": "bakery", "price": 3.0, "discount_price": 2.5 },
            { "id": "apples", "shop_id": "grocer", "name": "Apples", "category": "produce", "price": 4.0 }
        ],
        "orders": [
            { "id": "o1", "user_id": "u2", "shop_id": "bakery", "status": "DELIVERED", "created_at": two_days_ago,
              "items": [{ "product_id": "sourdough" }, { "product_id": "croissant" }] },
            { "id": "o2", "user_id": "u3", "shop_id": "grocer", "status": "DELIVERED", "created_at": two_days_ago,
              "items": [{ "product_id": "apples" }] }
        ]
    })
}

/// Helper function to create a test server over a catalog snapshot file
async fn create_test_server() -> (TestServer, TempDir) {
    create_test_server_with(ServerConfig::default()).await
}

async fn create_test_server_with(config: ServerConfig) -> (TestServer, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    let catalog_path = temp_dir.path().join("catalog.json");
    std::fs::write(&catalog_path, snapshot().to_string()).expect("Failed to write catalog");
    let catalog = MemoryCatalog::load(&catalog_path)
        .await
        .expect("Failed to load catalog");

    let engine = RecommendationEngine::new(
        Arc::new(catalog),
        Arc::new(MemoryCacheStore::new(128).expect("Failed to create cache")),
        Arc::new(FileArtifactStore::new(temp_dir.path().join("models"))),
        BazaarConfig::default(),
    );

    let state = Arc::new(AppState::new(Arc::new(engine), config));
    let server = TestServer::new(create_router(state)).expect("Failed to create test server");

    (server, temp_dir)
}

#[tokio::test]
async fn test_health_check() {
    let (server, _temp_dir) = create_test_server().await;

    let response = server.get("/health").await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["catalog_available"], true);
    assert_eq!(json["model"]["loaded"], false);
}

#[tokio::test]
async fn test_openapi_spec_available() {
    let (server, _temp_dir) = create_test_server().await;

    let response = server.get("/api-docs/openapi.json").await;
    response.assert_status_ok();

    let json: Value = response.json();
    assert_eq!(json["info"]["title"], "BazaarLink Recommendation API");
    assert!(json["paths"]["/api/v1/recommendations/{user_id}"].is_object());
}

mod recommendations {
    use super::*;

    #[tokio::test]
    async fn test_nearby_recommendations_for_new_user() {
        let (server, _temp_dir) = create_test_server().await;

        let response = server
            .get("/api/v1/recommendations/newcomer")
            .add_query_param("latitude", LAT)
            .add_query_param("longitude", LON)
            .add_query_param("limit", 3)
            .await;

        response.assert_status_ok();
        let json: Value = response.json();
        let items = json.as_array().expect("Expected an array");
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["shop_name"], "Corner Bakery");
        assert_eq!(items[0]["score"], 0.2);
        assert!(items[0]["reason"].as_str().unwrap().contains("nearby shop"));

        let baguette = items.iter().find(|i| i["product_id"] == "baguette").unwrap();
        assert_eq!(baguette["discount_price"], 2.5);
    }

    #[tokio::test]
    async fn test_unknown_user_without_location_gets_empty_list() {
        let (server, _temp_dir) = create_test_server().await;

        let response = server.get("/api/v1/recommendations/nobody").await;

        response.assert_status_ok();
        let json: Value = response.json();
        assert_eq!(json, json!([]));
    }

    #[tokio::test]
    async fn test_purchased_products_are_excluded() {
        let (server, _temp_dir) = create_test_server().await;

        let response = server
            .get("/api/v1/recommendations/u2")
            .add_query_param("latitude", LAT)
            .add_query_param("longitude", LON)
            .await;

        response.assert_status_ok();
        let json: Value = response.json();
        let ids: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["product_id"].as_str().unwrap())
            .collect();
        assert!(ids.contains(&"baguette"));
        assert!(!ids.contains(&"sourdough"));
        assert!(!ids.contains(&"croissant"));
    }

    #[tokio::test]
    async fn test_zero_limit_is_rejected() {
        let (server, _temp_dir) = create_test_server().await;

        let response = server
            .get("/api/v1/recommendations/u2")
            .add_query_param("limit", 0)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let json: Value = response.json();
        assert_eq!(json["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_single_coordinate_is_rejected() {
        let (server, _temp_dir) = create_test_server().await;

        let response = server
            .get("/api/v1/recommendations/u2")
            .add_query_param("latitude", LAT)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

mod events {
    use super::*;

    #[tokio::test]
    async fn test_track_event() {
        let (server, _temp_dir) = create_test_server().await;

        let response = server
            .post("/api/v1/events")
            .json(&json!({
                "user_id": "u1",
                "event_type": "view",
                "event_data": { "product_id": "baguette" }
            }))
            .await;

        response.assert_status_ok();
        let json: Value = response.json();
        assert_eq!(json["message"], "Event tracked successfully");
        assert!(json["event_id"].is_string());
    }

    #[tokio::test]
    async fn test_tracked_purchase_changes_recommendations() {
        let (server, _temp_dir) = create_test_server().await;

        server
            .post("/api/v1/events")
            .json(&json!({
                "user_id": "u1",
                "event_type": "purchase",
                "event_data": { "product_id": "sourdough" }
            }))
            .await
            .assert_status_ok();

        let response = server.get("/api/v1/recommendations/u1").await;
        response.assert_status_ok();
        let json: Value = response.json();
        let items = json.as_array().unwrap();
        assert!(!items.is_empty());
        assert!(items.iter().all(|i| i["product_id"] != "sourdough"));
        assert!(
            items
                .iter()
                .any(|i| i["reason"] == "Based on your interest in bakery")
        );
    }

    #[tokio::test]
    async fn test_oversized_event_is_rejected() {
        let config = ServerConfig {
            max_request_size: 256,
            ..ServerConfig::default()
        };
        let (server, _temp_dir) = create_test_server_with(config).await;

        let response = server
            .post("/api/v1/events")
            .json(&json!({
                "user_id": "u1",
                "event_type": "search",
                "event_data": { "query": "x".repeat(1024) }
            }))
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_event_without_user_is_rejected() {
        let (server, _temp_dir) = create_test_server().await;

        let response = server
            .post("/api/v1/events")
            .json(&json!({ "user_id": "", "event_type": "view" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

mod insights {
    use super::*;

    #[tokio::test]
    async fn test_trending_products() {
        let (server, _temp_dir) = create_test_server().await;

        for event_type in ["view", "purchase"] {
            server
                .post("/api/v1/events")
                .json(&json!({
                    "user_id": "u3",
                    "event_type": event_type,
                    "event_data": { "product_id": "baguette" }
                }))
                .await
                .assert_status_ok();
        }

        let response = server
            .get(&format!("/api/v1/trending/{}/{}", LAT, LON))
            .await;

        response.assert_status_ok();
        let json: Value = response.json();
        assert_eq!(json[0]["product_id"], "baguette");
        assert_eq!(json[0]["view_count"], 2);
        assert_eq!(json[0]["order_count"], 1);
    }

    #[tokio::test]
    async fn test_popular_shops() {
        let (server, _temp_dir) = create_test_server().await;

        let response = server
            .get(&format!("/api/v1/popular-shops/{}/{}", LAT, LON))
            .add_query_param("limit", 5)
            .await;

        response.assert_status_ok();
        let json: Value = response.json();
        let shops = json.as_array().unwrap();
        assert_eq!(shops.len(), 2);
        assert_eq!(shops[0]["shop_name"], "Corner Bakery");
    }

    #[tokio::test]
    async fn test_out_of_range_coordinates() {
        let (server, _temp_dir) = create_test_server().await;

        let response = server.get("/api/v1/trending/123.0/10.0").await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

mod admin {
    use super::*;

    #[tokio::test]
    async fn test_retrain_model_runs_in_background() {
        let (server, temp_dir) = create_test_server().await;

        let response = server.post("/admin/retrain-model").await;
        response.assert_status(StatusCode::ACCEPTED);
        let json: Value = response.json();
        assert_eq!(json["message"], "Model retraining started in background");

        let mut loaded = false;
        for _ in 0..50 {
            let health: Value = server.get("/health").await.json();
            if health["model"]["loaded"] == true {
                assert_eq!(health["model"]["users"], 2);
                loaded = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(loaded, "Model was not published in time");
        assert!(temp_dir.path().join("models").join("user_similarity.json").exists());
    }
}
