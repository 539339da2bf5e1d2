use axum::extract::FromRef;

use crate::dataset::DatasetStore;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedDatasetStore = Arc<DatasetStore>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub dataset: GuardedDatasetStore,
    pub hash: String,
}

impl ServerState {
    pub fn new(config: ServerConfig, dataset: DatasetStore) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            dataset: Arc::new(dataset),
            hash: env!("GIT_HASH").to_owned(),
        }
    }
}

impl FromRef<ServerState> for GuardedDatasetStore {
    fn from_ref(input: &ServerState) -> Self {
        input.dataset.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
