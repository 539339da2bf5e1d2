use super::normalize::{log_followers, min_max};
use crate::aggregation::JoinedRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const POPULARITY_WEIGHT: f64 = 0.5;
pub const FOLLOWERS_WEIGHT: f64 = 0.3;
pub const TRACK_COUNT_WEIGHT: f64 = 0.2;

/// Artists kept in a ranking.
pub const ARTIST_RANKING_LIMIT: usize = 10;

/// Below this many distinct artists a ranking is not meaningful.
pub const MIN_DISTINCT_ARTISTS: usize = 3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArtistIndexEntry {
    pub artist_name: String,
    pub avg_artist_popularity: f64,
    pub log_followers: f64,
    pub track_count: u64,
    pub popularity_norm: f64,
    pub followers_norm: f64,
    pub track_count_norm: f64,
    pub artist_index: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArtistRanking {
    Ranked { artists: Vec<ArtistIndexEntry> },
    NotEnoughArtists { distinct_artists: usize },
}

#[derive(Default)]
struct ArtistAccumulator {
    popularity_sum: f64,
    followers_sum: f64,
    tracks: u64,
}

/// Ranks artists of the sample by a weighted index of normalized mean
/// popularity, log followers and track count.
///
/// Ties on the index are broken by artist name.
pub fn rank_artists(rows: &[JoinedRow]) -> ArtistRanking {
    let mut per_artist: BTreeMap<&str, ArtistAccumulator> = BTreeMap::new();
    for row in rows {
        let acc = per_artist.entry(row.artist_name.as_str()).or_default();
        acc.popularity_sum += row.artist_popularity as f64;
        acc.followers_sum += row.artist_followers as f64;
        acc.tracks += 1;
    }

    if per_artist.len() < MIN_DISTINCT_ARTISTS {
        return ArtistRanking::NotEnoughArtists {
            distinct_artists: per_artist.len(),
        };
    }

    let names: Vec<&str> = per_artist.keys().copied().collect();
    let popularity: Vec<f64> = per_artist
        .values()
        .map(|a| a.popularity_sum / a.tracks as f64)
        .collect();
    let followers: Vec<f64> = per_artist
        .values()
        .map(|a| log_followers(a.followers_sum / a.tracks as f64))
        .collect();
    let counts: Vec<f64> = per_artist.values().map(|a| a.tracks as f64).collect();

    let popularity_norm = min_max(&popularity);
    let followers_norm = min_max(&followers);
    let count_norm = min_max(&counts);

    let mut artists: Vec<ArtistIndexEntry> = names
        .iter()
        .enumerate()
        .map(|(i, name)| ArtistIndexEntry {
            artist_name: name.to_string(),
            avg_artist_popularity: popularity[i],
            log_followers: followers[i],
            track_count: counts[i] as u64,
            popularity_norm: popularity_norm[i],
            followers_norm: followers_norm[i],
            track_count_norm: count_norm[i],
            artist_index: POPULARITY_WEIGHT * popularity_norm[i]
                + FOLLOWERS_WEIGHT * followers_norm[i]
                + TRACK_COUNT_WEIGHT * count_norm[i],
        })
        .collect();

    // Names are already ascending, a stable sort keeps them as the tie-break.
    artists.sort_by(|a, b| b.artist_index.total_cmp(&a.artist_index));
    artists.truncate(ARTIST_RANKING_LIMIT);
    ArtistRanking::Ranked { artists }
}
