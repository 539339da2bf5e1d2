//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient, TOTAL_TRACKS};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_overview() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let response = client.post_dashboard(serde_json::json!({})).await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

// Each test binary uses a different subset of the helpers
#![allow(dead_code)]

mod client;
mod constants;
mod fixtures;
mod server;

// Public API - this is what tests import
pub use client::TestClient;
pub use constants::*;
pub use server::TestServer;
