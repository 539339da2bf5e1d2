//! Test dataset creation

use anyhow::Result;
use std::path::PathBuf;
use tempfile::TempDir;
use trackstats_server::dataset::{write_dataset, Artist, Track};

fn artist(id: &str, name: &str, genre: &str, popularity: i64, followers: i64) -> Artist {
    Artist {
        artist_id: id.to_string(),
        artist_name: name.to_string(),
        primary_genre: Some(genre.to_string()),
        artist_popularity: popularity,
        artist_followers: followers,
    }
}

#[allow(clippy::too_many_arguments)]
fn track(
    id: &str,
    name: &str,
    popularity: i64,
    duration: f64,
    explicit: bool,
    year: i64,
    album_type: &str,
    artist_id: &str,
) -> Track {
    Track {
        track_id: id.to_string(),
        track_name: name.to_string(),
        track_popularity: popularity,
        track_duration_min: duration,
        explicit,
        release_year: Some(year),
        album_type: Some(album_type.to_string()),
        artist_id: artist_id.to_string(),
    }
}

/// Creates a dataset with 4 artists and 8 tracks, two per artist.
/// Returns (temp_dir, db_path)
pub fn create_test_dataset() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("tracks.db");

    let artists = vec![
        artist("artist-1", "The Test Band", "pop", 88, 3_000_000),
        artist("artist-2", "Jazz Ensemble", "jazz", 70, 1_400_000),
        artist("artist-3", "Garage Kids", "rock", 45, 20_000),
        artist("artist-4", "Mystery Act", "Unknown", 20, 500),
    ];
    let tracks = vec![
        track("track-1", "Opening Track", 90, 3.5, false, 2018, "album", "artist-1"),
        track("track-2", "Second Song", 75, 3.0, true, 2019, "single", "artist-1"),
        track("track-3", "Blue Note", 65, 6.2, false, 2001, "album", "artist-2"),
        track("track-4", "Late Set", 50, 8.0, false, 2003, "compilation", "artist-2"),
        track("track-5", "Feedback", 35, 2.8, true, 2012, "single", "artist-3"),
        track("track-6", "Basement", 20, 3.1, true, 2012, "album", "artist-3"),
        track("track-7", "Whisper", 10, 2.0, false, 2015, "single", "artist-4"),
        track("track-8", "Static Hum", 0, 4.4, false, 2016, "single", "artist-4"),
    ];

    write_dataset(&db_path, &artists, &tracks)?;
    Ok((dir, db_path))
}

/// Creates a dataset file with the schema and no rows.
pub fn create_empty_dataset() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("empty.db");
    write_dataset(&db_path, &[], &[])?;
    Ok((dir, db_path))
}
