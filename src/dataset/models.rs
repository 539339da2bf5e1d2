//! Reference records of the tracks dataset.
//!
//! Both entities are read-only from the dashboard's point of view: they are
//! produced by the dataset export and only ever queried here.

use serde::{Deserialize, Serialize};

/// Sentinel genre assigned to artists without a known primary genre.
pub const UNKNOWN_GENRE: &str = "Unknown";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub artist_id: String,
    pub artist_name: String,
    pub primary_genre: Option<String>,
    /// 0-100
    pub artist_popularity: i64,
    pub artist_followers: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub track_id: String,
    pub track_name: String,
    /// 0-100
    pub track_popularity: i64,
    pub track_duration_min: f64,
    pub explicit: bool,
    pub release_year: Option<i64>,
    /// 'album', 'single', 'compilation'
    pub album_type: Option<String>,
    pub artist_id: String,
}
