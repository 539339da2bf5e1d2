//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own dataset file.

use super::constants::*;
use super::fixtures::{create_empty_dataset, create_test_dataset};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use trackstats_server::server::{make_app, ServerConfig};
use trackstats_server::{DatasetStore, RequestsLoggingLevel};

/// Test server instance with an isolated dataset
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    // Private fields - keep resources alive until drop
    _temp_dataset_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server over the standard test dataset
    pub async fn spawn() -> Self {
        let (dir, db_path) = create_test_dataset().expect("Failed to create test dataset");
        Self::spawn_with(dir, db_path, None).await
    }

    /// Spawns a new test server over a dataset without rows
    pub async fn spawn_empty() -> Self {
        let (dir, db_path) = create_empty_dataset().expect("Failed to create empty dataset");
        Self::spawn_with(dir, db_path, None).await
    }

    /// Spawns a new test server that feeds at most `limit` rows to the artist ranking and hits
    pub async fn spawn_with_sample_limit(limit: usize) -> Self {
        let (dir, db_path) = create_test_dataset().expect("Failed to create test dataset");
        Self::spawn_with(dir, db_path, Some(limit)).await
    }

    async fn spawn_with(dir: TempDir, db_path: PathBuf, sample_row_limit: Option<usize>) -> Self {
        let dataset = DatasetStore::open(&db_path).expect("Failed to open dataset");

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            sample_row_limit,
            ..ServerConfig::default()
        };

        let app = make_app(config, dataset);

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            _temp_dataset_dir: dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
