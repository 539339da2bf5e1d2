//! Dashboard API routes

use crate::dashboard::{self, ComputeOptions};
use crate::dataset::DatasetError;
use crate::filter::{ExplicitChoice, FilterOptions, FilterSpec};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::error;

use super::metrics::record_error;
use super::state::{GuardedDatasetStore, ServerState};
use super::ServerConfig;

/// Body of `POST /v1/dashboard`. Missing fields keep the unrestricted value.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct DashboardRequest {
    pub year_range: Option<(i64, i64)>,
    pub popularity_range: Option<(i64, i64)>,
    pub genres: Option<Vec<String>>,
    pub album_types: Option<Vec<String>>,
    pub explicit: Option<ExplicitChoice>,
    pub exclude_unknown_genre: Option<bool>,
}

impl DashboardRequest {
    pub fn into_filter_spec(self, options: &FilterOptions) -> FilterSpec {
        let mut spec = FilterSpec::unrestricted(options);
        if let Some(range) = self.year_range {
            spec.year_range = range;
        }
        if let Some(range) = self.popularity_range {
            spec.popularity_range = range;
        }
        if let Some(genres) = self.genres {
            spec.genres = genres.into_iter().collect();
        }
        if let Some(album_types) = self.album_types {
            spec.album_types = album_types.into_iter().collect();
        }
        if let Some(explicit) = self.explicit {
            spec.explicit = explicit;
        }
        if let Some(exclude) = self.exclude_unknown_genre {
            spec.exclude_unknown_genre = exclude;
        }
        spec
    }
}

fn dataset_failure(endpoint: &str, err: DatasetError) -> Response {
    error!("{} failed: {}", endpoint, err);
    record_error("dataset", endpoint);
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

/// Runs a blocking dataset computation off the async runtime.
async fn run_blocking<T, F>(endpoint: &str, f: F) -> Result<T, Response>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, DatasetError> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(dataset_failure(endpoint, err)),
        Err(join_err) => {
            error!("{} task failed: {}", endpoint, join_err);
            record_error("task", endpoint);
            Err(StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
    }
}

async fn get_filters(State(dataset): State<GuardedDatasetStore>) -> Response {
    match run_blocking("/v1/filters", move || dashboard::filter_options(&dataset)).await {
        Ok(options) => Json(options).into_response(),
        Err(response) => response,
    }
}

async fn post_dashboard(
    State(dataset): State<GuardedDatasetStore>,
    State(config): State<ServerConfig>,
    Json(request): Json<DashboardRequest>,
) -> Response {
    let compute_options = ComputeOptions {
        sample_row_limit: config.sample_row_limit,
    };
    let result = run_blocking("/v1/dashboard", move || {
        let session = dataset.session()?;
        let options = FilterOptions::load(&session)?;
        let spec = request.into_filter_spec(&options);
        dashboard::compute_with(&session, &spec, &compute_options)
    })
    .await;

    match result {
        Ok(outcome) => Json(outcome).into_response(),
        Err(response) => response,
    }
}

async fn get_global_reference(State(dataset): State<GuardedDatasetStore>) -> Response {
    match run_blocking("/v1/reference/global", move || {
        dashboard::global_reference(&dataset)
    })
    .await
    {
        Ok(Some(track)) => Json(track).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(response) => response,
    }
}

pub fn make_dashboard_routes(state: ServerState) -> Router {
    Router::new()
        .route("/filters", get(get_filters))
        .route("/dashboard", post(post_dashboard))
        .route("/reference/global", get(get_global_reference))
        .with_state(state)
}
