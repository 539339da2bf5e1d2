use serde::{Deserialize, Serialize};

/// Headline numbers of the filtered selection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OverviewMetrics {
    pub tracks: u64,
    pub unique_artists: u64,
    pub avg_popularity: f64,
    pub zero_popularity_count: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopularityQuantile {
    pub quantile: f64,
    pub value: i64,
}

/// Mean popularity and track count of one release year.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct YearlyPopularity {
    pub release_year: i64,
    pub avg_popularity: f64,
    pub num_tracks: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenreAverage {
    pub primary_genre: Option<String>,
    pub avg_popularity: f64,
    pub num_tracks: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenreFrequency {
    pub primary_genre: Option<String>,
    pub num_tracks: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExplicitSummary {
    pub explicit: bool,
    pub avg_popularity: f64,
    pub num_tracks: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PopularityBucket {
    Low,
    Medium,
    High,
}

impl PopularityBucket {
    /// Low up to 30, Medium up to 60, High above.
    pub fn of(popularity: i64) -> Self {
        if popularity <= 30 {
            PopularityBucket::Low
        } else if popularity <= 60 {
            PopularityBucket::Medium
        } else {
            PopularityBucket::High
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "Low" => Some(PopularityBucket::Low),
            "Medium" => Some(PopularityBucket::Medium),
            "High" => Some(PopularityBucket::High),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            PopularityBucket::Low => "Low",
            PopularityBucket::Medium => "Medium",
            PopularityBucket::High => "High",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BucketCount {
    pub popularity_bucket: PopularityBucket,
    pub num_tracks: u64,
}

/// One track joined with its artist, full projection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JoinedRow {
    pub track_name: String,
    pub track_popularity: i64,
    pub track_duration_min: f64,
    pub explicit: bool,
    pub release_year: Option<i64>,
    pub album_type: Option<String>,
    pub artist_name: String,
    pub primary_genre: Option<String>,
    pub artist_popularity: i64,
    pub artist_followers: i64,
}

/// Inputs of the rule-based hit evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HitRow {
    pub track_name: String,
    pub track_popularity: i64,
    pub artist_popularity: i64,
    pub artist_followers: i64,
}

/// Inputs of the similarity ranking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimilarityRow {
    pub track_name: String,
    pub track_popularity: i64,
    pub track_duration_min: f64,
    pub artist_name: String,
    pub artist_popularity: i64,
    pub artist_followers: i64,
}

/// Every aggregate of one interaction, computed from the same predicate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateBundle {
    pub overview: OverviewMetrics,
    pub median_popularity: Option<f64>,
    pub quantiles: Vec<PopularityQuantile>,
    pub yearly: Vec<YearlyPopularity>,
    pub top_avg_genres: Vec<GenreAverage>,
    pub genre_frequency: Vec<GenreFrequency>,
    pub explicit_summary: Vec<ExplicitSummary>,
    pub popularity_over_time: Vec<YearlyPopularity>,
    pub popularity_buckets: Vec<BucketCount>,
    pub rows_full: Vec<JoinedRow>,
    pub rows_sample: Vec<JoinedRow>,
    pub hit_rows: Vec<HitRow>,
    pub similarity_rows: Vec<SimilarityRow>,
}

impl AggregateBundle {
    pub fn is_empty(&self) -> bool {
        self.overview.tracks == 0
    }
}
