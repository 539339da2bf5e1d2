//! Writes a dataset file from in-memory records.
//!
//! Used to build fixtures and small demo datasets; production datasets come
//! from the export pipeline and are opened read-only by [`super::DatasetStore`].

use super::models::{Artist, Track};
use super::schema::DATASET_TABLES;
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::info;

pub fn write_dataset<P: AsRef<Path>>(db_path: P, artists: &[Artist], tracks: &[Track]) -> Result<()> {
    let db_path = db_path.as_ref();
    if db_path.exists() {
        bail!("Refusing to overwrite existing dataset at {:?}", db_path);
    }

    let mut conn = Connection::open(db_path)
        .with_context(|| format!("Failed to create dataset at {:?}", db_path))?;
    conn.execute("PRAGMA foreign_keys = ON;", params![])?;

    let tx = conn.transaction()?;
    for table in DATASET_TABLES {
        table.create(&tx)?;
    }

    {
        let mut insert_artist = tx.prepare(
            "INSERT INTO artists (artist_id, artist_name, primary_genre, artist_popularity, artist_followers)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for artist in artists {
            insert_artist.execute(params![
                artist.artist_id,
                artist.artist_name,
                artist.primary_genre,
                artist.artist_popularity,
                artist.artist_followers,
            ])?;
        }

        let mut insert_track = tx.prepare(
            "INSERT INTO tracks (track_id, track_name, track_popularity, track_duration_min, explicit, release_year, album_type, artist_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for track in tracks {
            insert_track
                .execute(params![
                    track.track_id,
                    track.track_name,
                    track.track_popularity,
                    track.track_duration_min,
                    track.explicit as i64,
                    track.release_year,
                    track.album_type,
                    track.artist_id,
                ])
                .with_context(|| format!("Failed to insert track {}", track.track_id))?;
        }
    }
    tx.commit()?;

    info!(
        "Wrote dataset with {} artists and {} tracks to {:?}",
        artists.len(),
        tracks.len(),
        db_path
    );
    Ok(())
}
