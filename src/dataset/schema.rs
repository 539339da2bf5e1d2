//! SQLite schema of the tracks dataset.
//!
//! The column names follow the dataset export (one row per track, one row per
//! artist). The store requires these columns to be present and the `non_null`
//! ones to hold no NULLs; it never creates or migrates a dataset on its own.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, ForeignKey, SqlType, Table};

/// Artists table - one row per performer
pub const ARTISTS_TABLE: Table = Table {
    name: "artists",
    columns: &[
        sqlite_column!("artist_id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("artist_name", &SqlType::Text, non_null = true),
        sqlite_column!("primary_genre", &SqlType::Text), // 'Unknown' when uncategorized
        sqlite_column!("artist_popularity", &SqlType::Integer, non_null = true),
        sqlite_column!("artist_followers", &SqlType::Integer, non_null = true),
    ],
    indices: &[("idx_artists_genre", "primary_genre")],
};

const ARTIST_FOREIGN_KEY: ForeignKey = ForeignKey {
    foreign_table: "artists",
    foreign_column: "artist_id",
};

/// Tracks table - one row per song, each owned by exactly one artist
pub const TRACKS_TABLE: Table = Table {
    name: "tracks",
    columns: &[
        sqlite_column!("track_id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("track_name", &SqlType::Text, non_null = true),
        sqlite_column!("track_popularity", &SqlType::Integer, non_null = true),
        sqlite_column!("track_duration_min", &SqlType::Real, non_null = true),
        sqlite_column!("explicit", &SqlType::Integer, non_null = true), // 0/1
        sqlite_column!("release_year", &SqlType::Integer),
        sqlite_column!("album_type", &SqlType::Text),
        sqlite_column!(
            "artist_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&ARTIST_FOREIGN_KEY)
        ),
    ],
    indices: &[
        ("idx_tracks_artist", "artist_id"),
        ("idx_tracks_popularity", "track_popularity"),
        ("idx_tracks_release_year", "release_year"),
    ],
};

/// Tables in creation order (referenced tables first).
pub const DATASET_TABLES: &[Table] = &[ARTISTS_TABLE, TRACKS_TABLE];
