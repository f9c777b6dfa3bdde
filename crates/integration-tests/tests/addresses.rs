//! Address endpoint tests against an in-memory `SQLite` store.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use mercato_integration_tests::{TestApp, address_payload};
use proptest::prelude::*;
use serde_json::{Value, json};

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_address() {
    let app = TestApp::in_memory().await;

    let resp = app.post_json("/addresses", &address_payload()).await;

    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(resp.body["street"], "123 Test St");
    assert_eq!(resp.body["city"], "San Francisco");
    assert!(resp.body["id"].is_i64());
    assert_eq!(app.count("addresses").await, 1);
}

#[tokio::test]
async fn test_create_address_uppercases_codes() {
    let app = TestApp::in_memory().await;

    let resp = app
        .post_json(
            "/addresses",
            &json!({
                "country_code": "gb",
                "state_code": "lnd",
                "street": "10 Downing St",
                "postcode": "SW1A 2AA",
            }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(resp.body["country_code"], "GB");
    assert_eq!(resp.body["state_code"], "LND");
    assert_eq!(resp.body["city"], Value::Null);
}

#[tokio::test]
async fn test_create_address_non_alphabetic_country_code() {
    let app = TestApp::in_memory().await;
    let mut payload = address_payload();
    payload["country_code"] = json!("U5");

    let resp = app.post_json("/addresses", &payload).await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error(), "Invalid Content");
    assert_eq!(
        resp.body["message"],
        "ISO 3166 country code must be 2 alphabetical characters"
    );
    assert_eq!(app.count("addresses").await, 0);
}

#[tokio::test]
async fn test_create_address_long_country_code() {
    let app = TestApp::in_memory().await;
    let mut payload = address_payload();
    payload["country_code"] = json!("USA");

    let resp = app.post_json("/addresses", &payload).await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error(), "Invalid format");
    assert_eq!(
        resp.body["messages"]["country_code"],
        json!(["Longer than maximum length 2."])
    );
}

#[tokio::test]
async fn test_create_address_short_state_code() {
    let app = TestApp::in_memory().await;
    let mut payload = address_payload();
    payload["state_code"] = json!("C");

    let resp = app.post_json("/addresses", &payload).await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error(), "Invalid Content");
    assert_eq!(
        resp.body["message"],
        "ISO 3166-2 subdivision code must be 2 or 3 alphabetical characters"
    );
}

#[tokio::test]
async fn test_create_address_missing_fields() {
    let app = TestApp::in_memory().await;

    let resp = app
        .post_json("/addresses", &json!({ "city": "Nowhere" }))
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error(), "Invalid format");
    let messages = resp.body["messages"].as_object().unwrap();
    for field in ["country_code", "state_code", "street", "postcode"] {
        assert_eq!(
            messages[field],
            json!(["Missing data for required field."]),
            "field {field}"
        );
    }
}

#[tokio::test]
async fn test_create_address_rejects_client_id() {
    let app = TestApp::in_memory().await;
    let mut payload = address_payload();
    payload["id"] = json!(42);

    let resp = app.post_json("/addresses", &payload).await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["messages"]["id"], json!(["Unknown field."]));
}

#[tokio::test]
async fn test_create_address_no_input() {
    let app = TestApp::in_memory().await;

    for body in ["", "   ", "null", "{}"] {
        let resp = app.post_raw("/addresses", body).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "body {body:?}");
        assert_eq!(
            resp.body,
            json!({ "error": "No input data provided." }),
            "body {body:?}"
        );
    }
    assert_eq!(app.count("addresses").await, 0);
}

#[tokio::test]
async fn test_create_address_malformed_json() {
    let app = TestApp::in_memory().await;

    let resp = app.post_raw("/addresses", "{\"street\": ").await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error(), "Invalid format");
    let reason = resp.body["messages"]["_schema"][0].as_str().unwrap();
    assert!(reason.starts_with("Invalid JSON: "));
}

#[tokio::test]
async fn test_create_address_non_object() {
    let app = TestApp::in_memory().await;

    let resp = app.post_raw("/addresses", "[1, 2, 3]").await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["messages"]["_schema"], json!(["Invalid input type."]));
}

// ============================================================================
// Read & Delete
// ============================================================================

#[tokio::test]
async fn test_list_and_show_addresses() {
    let app = TestApp::in_memory().await;
    let created = app.post_json("/addresses", &address_payload()).await;
    let id = created.id();

    let list = app.get("/addresses").await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body, json!([created.body]));

    let show = app.get(&format!("/addresses/{id}")).await;
    assert_eq!(show.status, StatusCode::OK);
    assert_eq!(show.body, created.body);
}

#[tokio::test]
async fn test_show_unknown_address() {
    let app = TestApp::in_memory().await;

    let resp = app.get("/addresses/999").await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body, json!({ "error": "Address not found" }));
}

#[tokio::test]
async fn test_show_malformed_id() {
    let app = TestApp::in_memory().await;

    let resp = app.get("/addresses/abc").await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_address() {
    let app = TestApp::in_memory().await;
    let id = app.post_json("/addresses", &address_payload()).await.id();

    let resp = app.delete(&format!("/addresses/{id}")).await;
    assert_eq!(resp.status, StatusCode::NO_CONTENT);
    assert_eq!(resp.body, Value::Null);

    let again = app.delete(&format!("/addresses/{id}")).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
    assert_eq!(app.count("addresses").await, 0);
}

// ============================================================================
// Service
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::in_memory().await;

    let live = app.get("/health").await;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.body, "ok");

    let ready = app.get("/health/ready").await;
    assert_eq!(ready.status, StatusCode::OK);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = TestApp::in_memory().await;

    let resp = app.post_raw("/addresses", "").await;

    assert!(resp.request_id.is_some_and(|id| !id.is_empty()));
}

// ============================================================================
// Properties
// ============================================================================

fn post_address(app: &TestApp, rt: &tokio::runtime::Runtime, payload: &Value) -> StatusCode {
    rt.block_on(app.post_json("/addresses", payload)).status
}

#[test]
fn test_bad_code_lengths_are_client_errors() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let app = rt.block_on(TestApp::in_memory());

    proptest!(ProptestConfig::with_cases(48), |(code in "[a-zA-Z]{0,6}")| {
        let len = code.chars().count();

        if len != 2 {
            let mut payload = address_payload();
            payload["country_code"] = json!(code);
            prop_assert_eq!(post_address(&app, &rt, &payload), StatusCode::BAD_REQUEST);
        }

        if !(2..=3).contains(&len) {
            let mut payload = address_payload();
            payload["state_code"] = json!(code);
            prop_assert_eq!(post_address(&app, &rt, &payload), StatusCode::BAD_REQUEST);
        }
    });

    assert_eq!(rt.block_on(app.count("addresses")), 0);
}
