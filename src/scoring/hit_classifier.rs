use super::normalize::linear_quantile;
use crate::aggregation::HitRow;
use serde::{Deserialize, Serialize};

/// Popularity quantile at or above which a track counts as an actual hit.
pub const HIT_POPULARITY_QUANTILE: f64 = 0.70;
pub const PREDICTED_HIT_MIN_ARTIST_POPULARITY: i64 = 75;
pub const PREDICTED_HIT_MIN_FOLLOWERS: i64 = 1_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitOutcome {
    TruePositive,
    FalsePositive,
    TrueNegative,
    FalseNegative,
}

/// Confusion matrix of the artist-based hit rule against the popularity cutoff.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HitEvaluation {
    pub popularity_cutoff: f64,
    pub true_positives: u64,
    pub false_positives: u64,
    pub true_negatives: u64,
    pub false_negatives: u64,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
}

impl HitEvaluation {
    pub fn total(&self) -> u64 {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }
}

pub fn is_predicted_hit(row: &HitRow) -> bool {
    row.artist_popularity >= PREDICTED_HIT_MIN_ARTIST_POPULARITY
        && row.artist_followers >= PREDICTED_HIT_MIN_FOLLOWERS
}

/// The hit cutoff of a sample, `None` when it is empty.
pub fn popularity_cutoff(rows: &[HitRow]) -> Option<f64> {
    let popularity: Vec<f64> = rows.iter().map(|r| r.track_popularity as f64).collect();
    linear_quantile(&popularity, HIT_POPULARITY_QUANTILE)
}

pub fn classify(row: &HitRow, cutoff: f64) -> HitOutcome {
    let actual = row.track_popularity as f64 >= cutoff;
    match (is_predicted_hit(row), actual) {
        (true, true) => HitOutcome::TruePositive,
        (true, false) => HitOutcome::FalsePositive,
        (false, false) => HitOutcome::TrueNegative,
        (false, true) => HitOutcome::FalseNegative,
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

pub fn evaluate_hits(rows: &[HitRow]) -> HitEvaluation {
    let Some(cutoff) = popularity_cutoff(rows) else {
        return HitEvaluation::default();
    };

    let mut evaluation = HitEvaluation {
        popularity_cutoff: cutoff,
        ..Default::default()
    };
    for row in rows {
        match classify(row, cutoff) {
            HitOutcome::TruePositive => evaluation.true_positives += 1,
            HitOutcome::FalsePositive => evaluation.false_positives += 1,
            HitOutcome::TrueNegative => evaluation.true_negatives += 1,
            HitOutcome::FalseNegative => evaluation.false_negatives += 1,
        }
    }

    let correct = evaluation.true_positives + evaluation.true_negatives;
    evaluation.accuracy = ratio(correct, evaluation.total());
    evaluation.precision = ratio(
        evaluation.true_positives,
        evaluation.true_positives + evaluation.false_positives,
    );
    evaluation.recall = ratio(
        evaluation.true_positives,
        evaluation.true_positives + evaluation.false_negatives,
    );
    evaluation
}
