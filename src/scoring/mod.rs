//! Pure scoring procedures over rows fetched by the aggregation engine.
//!
//! Nothing here touches storage; every function maps rows to a result value.

mod artist_index;
mod correlation;
mod hit_classifier;
pub mod normalize;
mod similarity;

pub use artist_index::{
    rank_artists, ArtistIndexEntry, ArtistRanking, ARTIST_RANKING_LIMIT, MIN_DISTINCT_ARTISTS,
};
pub use correlation::{correlation_matrix, CorrelationMatrix, CORRELATION_FEATURES};
pub use hit_classifier::{
    classify, evaluate_hits, is_predicted_hit, popularity_cutoff, HitEvaluation, HitOutcome,
    HIT_POPULARITY_QUANTILE, PREDICTED_HIT_MIN_ARTIST_POPULARITY, PREDICTED_HIT_MIN_FOLLOWERS,
};
pub use similarity::{
    rank_by_similarity, select_reference, ScoredTrack, SimilarityOutcome,
    REFERENCE_MIN_ARTIST_POPULARITY, REFERENCE_POPULARITY_QUANTILE,
};
