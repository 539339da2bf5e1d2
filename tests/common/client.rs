//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per API endpoint.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::Value;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    // ========================================================================
    // Endpoints
    // ========================================================================

    /// GET /
    pub async fn get_home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Home request failed")
    }

    /// GET /v1/filters
    pub async fn get_filters(&self) -> Response {
        self.client
            .get(format!("{}/v1/filters", self.base_url))
            .send()
            .await
            .expect("Filters request failed")
    }

    /// POST /v1/dashboard
    pub async fn post_dashboard(&self, body: Value) -> Response {
        self.client
            .post(format!("{}/v1/dashboard", self.base_url))
            .json(&body)
            .send()
            .await
            .expect("Dashboard request failed")
    }

    /// POST /v1/dashboard with a raw, possibly malformed, body
    pub async fn post_dashboard_raw(&self, body: &str) -> Response {
        self.client
            .post(format!("{}/v1/dashboard", self.base_url))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("Dashboard request failed")
    }

    /// GET /v1/reference/global
    pub async fn get_global_reference(&self) -> Response {
        self.client
            .get(format!("{}/v1/reference/global", self.base_url))
            .send()
            .await
            .expect("Global reference request failed")
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Posts the filters and returns the decoded body, asserting a 200.
    pub async fn dashboard_json(&self, body: Value) -> Value {
        let response = self.post_dashboard(body).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        response.json().await.expect("Dashboard body is not JSON")
    }
}
