//! Integration test support for Mercato.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests against SQLite (in memory, or a temporary file)
//! cargo test -p mercato-integration-tests
//!
//! # PostgreSQL variants (tables are truncated, use a scratch database)
//! MERCATO_TEST_DATABASE_URL=postgres://localhost/mercato_test \
//!     cargo test -p mercato-integration-tests -- --ignored --test-threads=1 postgres
//!
//! # Smoke tests against a running server
//! MERCATO_BASE_URL=http://localhost:3000 \
//!     cargo test -p mercato-integration-tests -- --ignored live
//! ```
//!
//! # Test Categories
//!
//! - `addresses` - Address endpoints
//! - `customers` - Customer endpoints, uniqueness and address references
//! - `postgres` - The same flows on `PostgreSQL`
//! - `live` - HTTP smoke tests over the network with `reqwest`

use std::path::Path;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::Value;
use sqlx::AnyPool;
use tower::ServiceExt;

use mercato_api::config::ApiConfig;
use mercato_api::db::StoreEngine;
use mercato_api::state::AppState;

/// A response with its body decoded.
///
/// JSON bodies are parsed; an empty body is `Null`; anything else (such as
/// a path rejection) is kept as a JSON string.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub request_id: Option<String>,
    pub body: Value,
}

impl TestResponse {
    /// The `error` headline of an error response.
    #[must_use]
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }

    /// The generated `id` of a created entity.
    ///
    /// # Panics
    ///
    /// Panics if the body has no integer `id`.
    #[must_use]
    pub fn id(&self) -> i64 {
        self.body["id"]
            .as_i64()
            .unwrap_or_else(|| panic!("response has no id: {}", self.body))
    }
}

/// The full router over a fresh store, driven in-process.
pub struct TestApp {
    router: Router,
    state: AppState,
}

impl TestApp {
    /// A fresh, migrated in-memory `SQLite` store.
    ///
    /// # Panics
    ///
    /// Panics if the store cannot be opened.
    pub async fn in_memory() -> Self {
        Self::with_config(ApiConfig::in_memory()).await
    }

    /// A fresh, migrated `SQLite` database file served by a pool of
    /// `max_connections`, for tests that need concurrent writers.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be created.
    pub async fn sqlite_file(path: &Path, max_connections: u32) -> Self {
        let config = ApiConfig {
            database_url: SecretString::from(format!("sqlite://{}?mode=rwc", path.display())),
            max_connections,
            ..ApiConfig::in_memory()
        };
        Self::with_config(config).await
    }

    /// A migrated `PostgreSQL` store with both tables emptied.
    ///
    /// # Panics
    ///
    /// Panics if the database cannot be reached or cleaned.
    pub async fn postgres(database_url: &str) -> Self {
        let config = ApiConfig {
            database_url: SecretString::from(database_url),
            engine: StoreEngine::Postgres,
            max_connections: 5,
            ..ApiConfig::in_memory()
        };
        let app = Self::with_config(config).await;

        sqlx::query("TRUNCATE customers, addresses RESTART IDENTITY CASCADE")
            .execute(app.pool())
            .await
            .expect("Failed to clean test database");
        app
    }

    async fn with_config(config: ApiConfig) -> Self {
        let state = AppState::connect(config)
            .await
            .expect("Failed to open test store");
        let router = mercato_api::app(state.clone());
        Self { router, state }
    }

    #[must_use]
    pub fn pool(&self) -> &AnyPool {
        self.state.pool()
    }

    /// Send a request with an optional raw body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn request(&self, method: Method, uri: &str, body: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(body.map_or_else(Body::empty, |raw| Body::from(raw.to_owned())))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        let status = response.status();
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            request_id,
            body,
        }
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> TestResponse {
        self.request(Method::POST, uri, Some(&body.to_string())).await
    }

    pub async fn post_raw(&self, uri: &str, body: &str) -> TestResponse {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None).await
    }

    /// Number of rows in `table`.
    ///
    /// # Panics
    ///
    /// Panics if the query fails.
    pub async fn count(&self, table: &str) -> i64 {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(self.pool())
            .await
            .expect("Failed to count rows");
        count
    }
}

/// A valid address payload.
#[must_use]
pub fn address_payload() -> Value {
    serde_json::json!({
        "country_code": "US",
        "state_code": "CA",
        "city": "San Francisco",
        "street": "123 Test St",
        "postcode": "12345",
    })
}

/// A valid customer payload referencing `address_id`.
#[must_use]
pub fn customer_payload(email: &str, address_id: i64) -> Value {
    serde_json::json!({
        "f_name": "John",
        "l_name": "Smith",
        "email": email,
        "phone": "+1 415-555-2671",
        "address_id": address_id,
    })
}
