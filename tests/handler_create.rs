mod common;

use axum::body::Bytes;
use axum::http::StatusCode;
use serde_json::json;
use std::collections::HashSet;
use tokio::task::JoinSet;

#[tokio::test]
async fn test_create_with_generated_code() {
    let mut app = common::spawn_app();

    let response = app
        .server
        .post("/api/urls")
        .json(&json!({
            "long_url": "https://example.com/some/page",
            "username": "alice"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);

    let json = response.json::<serde_json::Value>();
    let code = json["short_code"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 8);
    assert_eq!(json["short_url"], format!("/{code}"));
    assert_eq!(json["long_url"], "https://example.com/some/page");
    assert!(json["id"].as_i64().unwrap() > 0);
    assert!(json["created_at"].is_string());

    assert_eq!(
        app.cache.cached_url(&code).as_deref(),
        Some("https://example.com/some/page")
    );

    let job = app.metadata_rx.try_recv().unwrap();
    assert_eq!(job.long_url, "https://example.com/some/page");
}

#[tokio::test]
async fn test_create_with_custom_code() {
    let app = common::spawn_app();

    let response = app
        .server
        .post("/api/urls")
        .json(&json!({
            "long_url": "https://example.com",
            "username": "alice",
            "custom_code": "promo"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["short_code"], "promo");
    assert_eq!(json["short_url"], "/promo");
}

#[tokio::test]
async fn test_generated_codes_are_distinct() {
    let app = common::spawn_app();
    let mut codes = HashSet::new();

    for i in 0..5 {
        let response = app
            .server
            .post("/api/urls")
            .add_header("x-api-key", format!("key-{i}"))
            .json(&json!({ "long_url": "https://example.com", "username": "alice" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let json = response.json::<serde_json::Value>();
        codes.insert(json["short_code"].as_str().unwrap().to_string());
    }

    assert_eq!(codes.len(), 5);
}

#[tokio::test]
async fn test_concurrent_generated_codes_are_distinct() {
    const REQUESTS: usize = 20;

    let app = common::spawn_app();

    let mut tasks = JoinSet::new();
    for i in 0..REQUESTS {
        let request = app
            .server
            .post("/api/urls")
            .add_header("x-api-key", format!("burst-{i}"))
            .json(&json!({ "long_url": "https://example.com", "username": "alice" }));
        tasks.spawn(async move {
            let response = request.await;
            (response.status_code(), response.text())
        });
    }

    let mut codes = HashSet::new();
    while let Some(result) = tasks.join_next().await {
        let (status, body) = result.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        codes.insert(json["short_code"].as_str().unwrap().to_string());
    }

    assert_eq!(codes.len(), REQUESTS);
    assert_eq!(app.store.links().len(), REQUESTS);
}

#[tokio::test]
async fn test_duplicate_custom_code_conflicts() {
    let app = common::spawn_app();
    let body = json!({
        "long_url": "https://first.example.com",
        "username": "alice",
        "custom_code": "dup"
    });

    app.server
        .post("/api/urls")
        .json(&body)
        .await
        .assert_status(StatusCode::CREATED);

    let response = app
        .server
        .post("/api/urls")
        .json(&json!({
            "long_url": "https://second.example.com",
            "username": "bob",
            "custom_code": "dup"
        }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "conflict");

    assert_eq!(
        app.cache.cached_url("dup").as_deref(),
        Some("https://first.example.com")
    );
}

#[tokio::test]
async fn test_store_conflict_after_cache_expiry_leaves_no_cache_entry() {
    let app = common::spawn_app();
    app.store.seed_link("taken", "https://original.example.com", true);

    let response = app
        .server
        .post("/api/urls")
        .json(&json!({
            "long_url": "https://new.example.com",
            "username": "alice",
            "custom_code": "taken"
        }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(app.cache.cached_url("taken"), None);
}

#[tokio::test]
async fn test_create_with_store_down_serves_from_cache() {
    let mut app = common::spawn_app();
    app.store.set_down(true);

    let response = app
        .server
        .post("/api/urls")
        .json(&json!({
            "long_url": "https://example.com",
            "username": "alice",
            "custom_code": "offline"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let json = response.json::<serde_json::Value>();
    assert!(json["id"].is_null());
    assert_eq!(json["short_code"], "offline");
    assert!(app.metadata_rx.try_recv().is_err());

    let redirect = app.server.get("/offline").await;
    redirect.assert_status(StatusCode::FOUND);
    assert_eq!(redirect.header("location"), "https://example.com");
}

#[tokio::test]
async fn test_create_with_cache_down_is_internal_error() {
    let app = common::spawn_app();
    app.cache.set_down(true);

    let response = app
        .server
        .post("/api/urls")
        .json(&json!({ "long_url": "https://example.com", "username": "alice" }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert!(app.store.links().is_empty());
}

#[tokio::test]
async fn test_validation_errors() {
    let app = common::spawn_app();

    let cases = [
        json!({ "long_url": "not-a-url", "username": "alice" }),
        json!({ "long_url": "ftp://example.com", "username": "alice" }),
        json!({ "long_url": "https://example.com", "username": "" }),
        json!({ "long_url": "https://example.com", "username": "alice", "custom_code": "bad code" }),
        json!({ "long_url": "https://example.com", "username": "alice", "custom_code": "api" }),
        json!({ "username": "alice" }),
    ];

    for (i, body) in cases.iter().enumerate() {
        let response = app
            .server
            .post("/api/urls")
            .add_header("x-api-key", format!("validation-{i}"))
            .json(body)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let json = response.json::<serde_json::Value>();
        assert_eq!(json["error"]["code"], "validation_error", "case {i}");
    }

    assert!(app.store.links().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = common::spawn_app();

    let response = app
        .server
        .post("/api/urls")
        .bytes(Bytes::from_static(b"{not json"))
        .content_type("application/json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}
