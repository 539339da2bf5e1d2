//! Small datasets shared by unit tests.

use super::{write_dataset, Artist, DatasetStore, Track};
use tempfile::TempDir;

pub fn artist(id: &str, name: &str, genre: Option<&str>, popularity: i64, followers: i64) -> Artist {
    Artist {
        artist_id: id.to_string(),
        artist_name: name.to_string(),
        primary_genre: genre.map(str::to_string),
        artist_popularity: popularity,
        artist_followers: followers,
    }
}

#[allow(clippy::too_many_arguments)]
pub fn track(
    id: &str,
    name: &str,
    popularity: i64,
    duration: f64,
    explicit: bool,
    year: Option<i64>,
    album_type: Option<&str>,
    artist_id: &str,
) -> Track {
    Track {
        track_id: id.to_string(),
        track_name: name.to_string(),
        track_popularity: popularity,
        track_duration_min: duration,
        explicit,
        release_year: year,
        album_type: album_type.map(str::to_string),
        artist_id: artist_id.to_string(),
    }
}

/// Writes the records to a fresh dataset file. The directory must outlive
/// the store.
pub fn store_with(artists: &[Artist], tracks: &[Track]) -> (TempDir, DatasetStore) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tracks.db");
    write_dataset(&path, artists, tracks).unwrap();
    let store = DatasetStore::open(&path).unwrap();
    (dir, store)
}

/// Two artists: A (90, 2M followers) and B (40, 10k followers), with track
/// popularities 5, 95, 60, 80, 0 in insertion order.
pub fn scenario_store() -> (TempDir, DatasetStore) {
    let artists = vec![
        artist("ar-a", "Artist A", Some("pop"), 90, 2_000_000),
        artist("ar-b", "Artist B", Some("rock"), 40, 10_000),
    ];
    let tracks = vec![
        track("t1", "Quiet Start", 5, 3.0, true, Some(2010), Some("single"), "ar-a"),
        track("t2", "Big Hit", 95, 3.5, false, Some(2012), Some("album"), "ar-a"),
        track("t3", "Steady", 60, 4.0, true, Some(2012), Some("album"), "ar-b"),
        track("t4", "Runner Up", 80, 2.5, false, Some(2015), Some("single"), "ar-a"),
        track("t5", "Forgotten", 0, 5.0, false, Some(2018), Some("compilation"), "ar-b"),
    ];
    store_with(&artists, &tracks)
}

/// Five artists across four genres, including 'Unknown' and a missing genre,
/// and one track without a release year.
pub fn catalog_store() -> (TempDir, DatasetStore) {
    let artists = vec![
        artist("ar1", "Nova", Some("pop"), 85, 5_000_000),
        artist("ar2", "Delta Ray", Some("rock"), 60, 250_000),
        artist("ar3", "Quiet Room", Some("Unknown"), 30, 1_200),
        artist("ar4", "Brass Ltd", Some("jazz"), 78, 1_500_000),
        artist("ar5", "Nameless", None, 10, 0),
    ];
    let tracks = vec![
        track("t01", "Skyline", 92, 3.2, true, Some(2019), Some("album"), "ar1"),
        track("t02", "Afterglow", 88, 3.8, false, Some(2020), Some("single"), "ar1"),
        track("t03", "Static", 40, 2.9, true, Some(2020), Some("album"), "ar1"),
        track("t04", "Gravel", 55, 4.5, false, Some(2005), Some("album"), "ar2"),
        track("t05", "Fault Lines", 61, 5.1, true, Some(2008), Some("album"), "ar2"),
        track("t06", "Low Tide", 0, 3.3, false, Some(2008), Some("compilation"), "ar2"),
        track("t07", "Hush", 12, 6.0, false, Some(2015), Some("single"), "ar3"),
        track("t08", "Murmur", 30, 2.2, false, Some(2016), Some("single"), "ar3"),
        track("t09", "Horn Call", 70, 7.5, false, Some(1998), Some("album"), "ar4"),
        track("t10", "Second Line", 77, 4.0, false, Some(2001), Some("album"), "ar4"),
        track("t11", "Untitled", 5, 1.5, false, None, None, "ar5"),
        track("t12", "Encore", 95, 3.6, true, Some(2021), Some("single"), "ar1"),
    ];
    store_with(&artists, &tracks)
}

/// A store with both tables and no rows.
pub fn empty_store() -> (TempDir, DatasetStore) {
    store_with(&[], &[])
}
