mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use common::{test_config, Harness};
use pettag_server::api;
use pettag_server::config::AppConfig;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app(harness: &Harness) -> Router {
    api::router(
        Arc::new(harness.registry()),
        Arc::new(harness.intake()),
        harness.config.clone(),
    )
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn admin(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn register_luna(app: &Router) -> String {
    let (status, body) = send(
        app,
        post_json(
            "/api/register",
            json!({"name": "Luna", "species": "Gato", "sex": "Hembra", "color": "Negro"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["petId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_check_answers() {
    let harness = Harness::new().await;
    let (status, body) = send(&app(&harness), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".into()));
}

#[tokio::test]
async fn register_then_lookup() {
    let harness = Harness::new().await;
    let app = app(&harness);

    let (status, body) = send(
        &app,
        post_json(
            "/api/register",
            json!({"name": "Luna", "species": "Gato", "sex": "Hembra", "color": "Negro", "age_years": 2}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let code = body["petId"].as_str().unwrap().to_string();
    assert!(code.starts_with("PET_"));
    assert_eq!(body["petUrl"], format!("https://pets.example.org/pet/{}", code));
    assert!(body["qrCode"].as_str().unwrap().starts_with("data:image/svg+xml"));
    assert_eq!(body["pet"]["name"], "Luna");
    assert_eq!(body["pet"]["breed"], "No especificada");

    let (status, body) = send(&app, get(&format!("/pet/{}", code))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pet"]["name"], "Luna");
    assert_eq!(body["pet"]["ageText"], "2 años");

    let (status, body) = send(&app, get("/pet/PET_NOPE0000")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn register_lists_missing_fields() {
    let harness = Harness::new().await;
    let (status, body) = send(
        &app(&harness),
        post_json("/api/register", json!({"name": "Luna", "color": ""})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["missingFields"], json!(["species", "sex", "color"]));
    assert_eq!(harness.store.count_active_pets().await.unwrap(), 0);
}

#[tokio::test]
async fn form_payload_with_text_ages_registers() {
    let harness = Harness::new().await;
    let app = app(&harness);

    let (status, body) = send(
        &app,
        post_json(
            "/api/register",
            json!({
                "name": "Toby",
                "species": "Perro",
                "sex": "Macho",
                "color": "Marrón",
                "breed": "",
                "age_years": "3",
                "age_months": "",
                "sterilization_code": "",
                "whatsapp_number": "",
                "gps_alerts": true,
                "alert_email": true,
                "alert_whatsapp": false,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let code = body["petId"].as_str().unwrap().to_string();

    let (_, body) = send(&app, get(&format!("/pet/{}", code))).await;
    assert_eq!(body["pet"]["ageYears"], 3);
    assert_eq!(body["pet"]["ageMonths"], Value::Null);
    assert_eq!(body["pet"]["ageText"], "3 años");
}

#[tokio::test]
async fn text_age_still_lists_missing_fields() {
    let harness = Harness::new().await;
    let (status, body) = send(
        &app(&harness),
        post_json(
            "/api/register",
            json!({"species": "Perro", "sex": "Macho", "color": "Gris", "age_years": "3"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["missingFields"], json!(["name"]));
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let harness = Harness::new().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(&app(&harness), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn finder_endpoints_record_events() {
    let harness = Harness::new().await;
    let app = app(&harness);
    let code = register_luna(&app).await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/found-location",
            json!({"petId": code, "latitude": 40.4, "longitude": -3.7, "accuracy": 20, "timestamp": "2025-04-10T12:00:00Z"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["locationId"].as_i64().unwrap() > 0);

    let (status, body) = send(
        &app,
        post_json(
            "/api/notify-owner",
            json!({"petId": code, "finderName": "Marta", "finderPhone": "600000000", "message": "Hola"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["notificationId"].as_i64().unwrap() > 0);
    assert_eq!(body["ownerNotified"], false);

    let (status, _) = send(
        &app,
        post_json(
            "/api/found-location",
            json!({"petId": "PET_NOPE0000", "latitude": 40.4, "longitude": -3.7}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        post_json("/api/notify-owner", json!({"petId": code, "finderName": "Marta"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["missingFields"], json!(["finderPhone"]));
}

#[tokio::test]
async fn breeds_by_species() {
    let harness = Harness::new().await;
    let (status, body) = send(&app(&harness), get("/api/breeds/Conejo")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let breeds = body["breeds"].as_array().unwrap();
    assert!(breeds.iter().any(|b| b["name"] == "Holland Lop"));
    assert!(breeds.iter().all(|b| b["id"].is_i64()));
}

#[tokio::test]
async fn admin_requires_the_token() {
    let harness = Harness::new().await;
    let app = app(&harness);
    let code = register_luna(&app).await;

    let (status, _) = send(&app, admin(Method::GET, "/admin/pets", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, admin(Method::GET, "/admin/pets", Some("wrong"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, admin(Method::GET, "/admin/pets", Some("s3cret"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pets"][0]["petCode"], code.as_str());
    assert_eq!(body["pets"][0]["age"], "-");

    let (status, body) = send(
        &app,
        admin(Method::GET, &format!("/admin/pets/{}/reports", code), Some("s3cret")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["locations"], json!([]));

    let (status, _) = send(
        &app,
        admin(Method::POST, &format!("/admin/pets/{}/deactivate", code), Some("s3cret")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, get(&format!("/pet/{}", code))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_accepts_header_token_for_owner_listing() {
    let harness = Harness::new().await;
    let app = app(&harness);
    register_luna(&app).await;

    let request = Request::builder()
        .uri("/admin/owners/1/pets")
        .header("x-admin-token", "s3cret")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pets"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn admin_disabled_without_a_token() {
    let harness = Harness::with_config(AppConfig {
        admin_token: None,
        ..test_config()
    })
    .await;

    let (status, _) = send(&app(&harness), admin(Method::GET, "/admin/pets", Some("s3cret"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
