//! One dashboard interaction: compile the filters, aggregate, score.
//!
//! [`compute`] keeps no state between calls. It acquires a session from the
//! store, runs every query on it and drops it before returning.

use crate::aggregation::{AggregateBundle, Aggregator, SimilarityRow};
use crate::dataset::{DatasetError, DatasetStore};
use crate::filter::{compile, CompiledPredicate, FilterOptions, FilterSpec};
use crate::scoring::{
    correlation_matrix, evaluate_hits, rank_artists, rank_by_similarity, ArtistRanking,
    CorrelationMatrix, HitEvaluation, SimilarityOutcome,
};
use crate::server::metrics;
use rusqlite::Connection;
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComputeOptions {
    /// Caps the sampled rows the artist ranking and hit evaluation work on. `None` keeps all.
    pub sample_row_limit: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardReport {
    pub filter: FilterSpec,
    pub predicate: CompiledPredicate,
    pub aggregates: AggregateBundle,
    pub artist_ranking: ArtistRanking,
    pub hit_evaluation: HitEvaluation,
    pub similarity: SimilarityOutcome,
    pub correlation: CorrelationMatrix,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DashboardOutcome {
    NoData { predicate: CompiledPredicate },
    Ready(Box<DashboardReport>),
}

impl DashboardOutcome {
    fn metric_label(&self) -> &'static str {
        match self {
            DashboardOutcome::NoData { .. } => "no_data",
            DashboardOutcome::Ready(_) => "ready",
        }
    }
}

pub fn compute(
    filter_spec: &FilterSpec,
    store: &DatasetStore,
    options: &ComputeOptions,
) -> Result<DashboardOutcome, DatasetError> {
    let session = store.session()?;
    compute_with(&session, filter_spec, options)
}

/// Same as [`compute`] on an already acquired connection.
pub fn compute_with(
    conn: &Connection,
    filter_spec: &FilterSpec,
    options: &ComputeOptions,
) -> Result<DashboardOutcome, DatasetError> {
    let start = Instant::now();
    let predicate = compile(filter_spec);
    let aggregator = Aggregator::new(conn, &predicate);

    let overview = aggregator.overview_metrics()?;
    let outcome = if overview.tracks == 0 {
        DashboardOutcome::NoData {
            predicate: predicate.clone(),
        }
    } else {
        let aggregates = aggregator.fetch_bundle(
            overview,
            filter_spec.exclude_unknown_genre,
            options.sample_row_limit,
        )?;
        let report = DashboardReport {
            artist_ranking: rank_artists(&aggregates.rows_sample),
            hit_evaluation: evaluate_hits(&aggregates.hit_rows),
            similarity: rank_by_similarity(&aggregates.similarity_rows),
            correlation: correlation_matrix(&aggregates.rows_full),
            filter: filter_spec.clone(),
            predicate: predicate.clone(),
            aggregates,
        };
        DashboardOutcome::Ready(Box::new(report))
    };

    metrics::record_dashboard_computation(outcome.metric_label());
    debug!(
        "Dashboard computed ({}) in {}ms with {} params",
        outcome.metric_label(),
        start.elapsed().as_millis(),
        predicate.params.len()
    );
    Ok(outcome)
}

pub fn filter_options(store: &DatasetStore) -> Result<FilterOptions, DatasetError> {
    let session = store.session()?;
    Ok(FilterOptions::load(&session)?)
}

/// The filter-independent reference track, `None` for an empty dataset.
pub fn global_reference(store: &DatasetStore) -> Result<Option<SimilarityRow>, DatasetError> {
    let session = store.session()?;
    let unrestricted = CompiledPredicate::unrestricted();
    Ok(Aggregator::new(&session, &unrestricted).global_reference_track()?)
}
