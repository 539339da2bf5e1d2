use super::normalize::{linear_quantile, log_followers, min_max};
use crate::aggregation::SimilarityRow;
use serde::{Deserialize, Serialize};

/// Popularity quantile a reference track must reach.
pub const REFERENCE_POPULARITY_QUANTILE: f64 = 0.99;
pub const REFERENCE_MIN_ARTIST_POPULARITY: i64 = 80;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredTrack {
    pub track_name: String,
    pub artist_name: String,
    pub track_popularity: i64,
    pub artist_popularity: i64,
    pub artist_followers: i64,
    pub artist_followers_log: f64,
    pub track_duration_min: f64,
    /// Euclidean distance to the reference in normalized feature space.
    pub similarity: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SimilarityOutcome {
    Ranked {
        reference: ScoredTrack,
        ranked: Vec<ScoredTrack>,
    },
    NoReference,
}

/// Index of the reference row: the most popular row among those at or above
/// the popularity cutoff whose artist is popular enough. Earliest row wins ties.
pub fn select_reference(rows: &[SimilarityRow]) -> Option<usize> {
    let popularity: Vec<f64> = rows.iter().map(|r| r.track_popularity as f64).collect();
    let cutoff = linear_quantile(&popularity, REFERENCE_POPULARITY_QUANTILE)?;

    let mut best: Option<usize> = None;
    for (i, row) in rows.iter().enumerate() {
        if (row.track_popularity as f64) < cutoff
            || row.artist_popularity < REFERENCE_MIN_ARTIST_POPULARITY
        {
            continue;
        }
        match best {
            Some(b) if rows[b].track_popularity >= row.track_popularity => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Ranks every row by its distance to the reference over normalized artist
/// popularity, log followers and duration, closest first.
pub fn rank_by_similarity(rows: &[SimilarityRow]) -> SimilarityOutcome {
    let Some(reference_index) = select_reference(rows) else {
        return SimilarityOutcome::NoReference;
    };

    let followers_log: Vec<f64> = rows
        .iter()
        .map(|r| log_followers(r.artist_followers as f64))
        .collect();
    let features = [
        min_max(
            &rows
                .iter()
                .map(|r| r.artist_popularity as f64)
                .collect::<Vec<_>>(),
        ),
        min_max(&followers_log),
        min_max(&rows.iter().map(|r| r.track_duration_min).collect::<Vec<_>>()),
    ];

    let distance = |i: usize| -> f64 {
        features
            .iter()
            .map(|f| (f[i] - f[reference_index]).powi(2))
            .sum::<f64>()
            .sqrt()
    };

    let mut ranked: Vec<ScoredTrack> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| ScoredTrack {
            track_name: row.track_name.clone(),
            artist_name: row.artist_name.clone(),
            track_popularity: row.track_popularity,
            artist_popularity: row.artist_popularity,
            artist_followers: row.artist_followers,
            artist_followers_log: followers_log[i],
            track_duration_min: row.track_duration_min,
            similarity: distance(i),
        })
        .collect();
    let reference = ranked[reference_index].clone();

    ranked.sort_by(|a, b| a.similarity.total_cmp(&b.similarity));
    SimilarityOutcome::Ranked { reference, ranked }
}
