//! Read-only access to the tracks dataset.
//!
//! [`DatasetStore`] validates the dataset once at startup and then hands out
//! one [`DatasetSession`] per interaction. A session owns its own read-only
//! connection, which is closed when the session is dropped, on every exit
//! path of the caller.

use super::schema::DATASET_TABLES;
use crate::server::metrics;
use rusqlite::{Connection, OpenFlags};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Dataset file not found: {0:?}")]
    NotFound(PathBuf),

    #[error("Failed to open dataset {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Dataset is missing table '{0}'")]
    MissingTable(&'static str),

    #[error("Table {table} is missing required columns: {}", .columns.join(", "))]
    MissingColumns {
        table: &'static str,
        columns: Vec<&'static str>,
    },

    #[error("Column {table}.{column} has {rows} NULL values")]
    NullValues {
        table: &'static str,
        column: &'static str,
        rows: u64,
    },

    #[error("Dataset query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DatasetCounts {
    pub artists: usize,
    pub tracks: usize,
}

/// Handle to a validated dataset file.
#[derive(Clone, Debug)]
pub struct DatasetStore {
    db_path: PathBuf,
}

fn open_read_only(db_path: &Path) -> Result<Connection, DatasetError> {
    Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|source| DatasetError::Open {
        path: db_path.to_path_buf(),
        source,
    })
}

fn validate_schema(conn: &Connection) -> Result<(), DatasetError> {
    for table in DATASET_TABLES {
        if !table.exists(conn)? {
            return Err(DatasetError::MissingTable(table.name));
        }
        let missing = table.missing_columns(conn)?;
        if !missing.is_empty() {
            return Err(DatasetError::MissingColumns {
                table: table.name,
                columns: missing,
            });
        }
        if let Some(&(column, rows)) = table.null_counts(conn)?.first() {
            return Err(DatasetError::NullValues {
                table: table.name,
                column,
                rows,
            });
        }
    }
    Ok(())
}

impl DatasetStore {
    /// Opens and validates the dataset at `db_path`.
    ///
    /// Fails if the file does not exist or cannot be opened as SQLite. It also
    /// fails when a table or column the aggregation queries rely on is absent,
    /// or when a column declared `non_null` holds NULLs.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self, DatasetError> {
        let db_path = db_path.as_ref();
        if !db_path.is_file() {
            return Err(DatasetError::NotFound(db_path.to_path_buf()));
        }

        let conn = open_read_only(db_path)?;
        validate_schema(&conn)?;

        let store = DatasetStore {
            db_path: db_path.to_path_buf(),
        };
        let counts = store.counts_with(&conn)?;
        info!(
            "Opened tracks dataset at {:?}: {} artists, {} tracks",
            db_path, counts.artists, counts.tracks
        );
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Acquires a read-only connection for a single interaction.
    pub fn session(&self) -> Result<DatasetSession, DatasetError> {
        let conn = open_read_only(&self.db_path).inspect_err(|_| {
            metrics::record_db_connection_error();
        })?;
        debug!("Acquired dataset session on {:?}", self.db_path);
        Ok(DatasetSession {
            conn,
            acquired_at: Instant::now(),
        })
    }

    pub fn counts(&self) -> Result<DatasetCounts, DatasetError> {
        let session = self.session()?;
        self.counts_with(&session)
    }

    fn counts_with(&self, conn: &Connection) -> Result<DatasetCounts, DatasetError> {
        let artists: i64 = conn.query_row("SELECT COUNT(*) FROM artists", [], |r| r.get(0))?;
        let tracks: i64 = conn.query_row("SELECT COUNT(*) FROM tracks", [], |r| r.get(0))?;
        Ok(DatasetCounts {
            artists: artists as usize,
            tracks: tracks as usize,
        })
    }
}

/// A read-only connection scoped to one interaction.
pub struct DatasetSession {
    conn: Connection,
    acquired_at: Instant,
}

impl DatasetSession {
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

impl Deref for DatasetSession {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

impl Drop for DatasetSession {
    fn drop(&mut self) {
        debug!(
            "Released dataset session after {}ms",
            self.acquired_at.elapsed().as_millis()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{write_dataset, Artist, Track};
    use tempfile::TempDir;

    fn tiny_dataset() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("tracks.db");
        let artists = vec![Artist {
            artist_id: "a1".to_string(),
            artist_name: "Solo".to_string(),
            primary_genre: Some("pop".to_string()),
            artist_popularity: 50,
            artist_followers: 1000,
        }];
        let tracks = vec![Track {
            track_id: "t1".to_string(),
            track_name: "Only Song".to_string(),
            track_popularity: 42,
            track_duration_min: 3.5,
            explicit: false,
            release_year: Some(2020),
            album_type: Some("single".to_string()),
            artist_id: "a1".to_string(),
        }];
        write_dataset(&db_path, &artists, &tracks).unwrap();
        (temp_dir, db_path)
    }

    #[test]
    fn opens_valid_dataset() {
        let (_temp_dir, db_path) = tiny_dataset();
        let store = DatasetStore::open(&db_path).unwrap();
        assert_eq!(
            store.counts().unwrap(),
            DatasetCounts {
                artists: 1,
                tracks: 1
            }
        );
        assert_eq!(store.path(), db_path.as_path());
    }

    #[test]
    fn missing_file_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let result = DatasetStore::open(temp_dir.path().join("nope.db"));
        assert!(matches!(result, Err(DatasetError::NotFound(_))));
    }

    #[test]
    fn missing_table_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("partial.db");
        let conn = Connection::open(&db_path).unwrap();
        crate::dataset::ARTISTS_TABLE.create(&conn).unwrap();
        drop(conn);

        let result = DatasetStore::open(&db_path);
        assert!(matches!(result, Err(DatasetError::MissingTable("tracks"))));
    }

    #[test]
    fn missing_columns_are_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("broken.db");
        let conn = Connection::open(&db_path).unwrap();
        crate::dataset::ARTISTS_TABLE.create(&conn).unwrap();
        conn.execute(
            "CREATE TABLE tracks (track_id TEXT, track_name TEXT, artist_id TEXT)",
            [],
        )
        .unwrap();
        drop(conn);

        match DatasetStore::open(&db_path) {
            Err(DatasetError::MissingColumns { table, columns }) => {
                assert_eq!(table, "tracks");
                assert!(columns.contains(&"track_popularity"));
                assert!(columns.contains(&"release_year"));
            }
            other => panic!("Expected MissingColumns, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn null_in_required_column_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nulls.db");
        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch(
            "CREATE TABLE artists (artist_id TEXT, artist_name TEXT, primary_genre TEXT,
                 artist_popularity INTEGER, artist_followers INTEGER);
             CREATE TABLE tracks (track_id TEXT, track_name TEXT, track_popularity INTEGER,
                 track_duration_min REAL, explicit INTEGER, release_year INTEGER,
                 album_type TEXT, artist_id TEXT);
             INSERT INTO artists VALUES ('a1', 'Solo', 'pop', 50, NULL);
             INSERT INTO tracks VALUES ('t1', 'Only Song', 42, 3.5, 0, 2020, 'single', 'a1');",
        )
        .unwrap();
        drop(conn);

        match DatasetStore::open(&db_path) {
            Err(DatasetError::NullValues { table, column, rows }) => {
                assert_eq!(table, "artists");
                assert_eq!(column, "artist_followers");
                assert_eq!(rows, 1);
            }
            other => panic!("Expected NullValues, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn nullable_columns_may_hold_nulls() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("sparse.db");
        let artists = vec![Artist {
            artist_id: "a1".to_string(),
            artist_name: "Solo".to_string(),
            primary_genre: None,
            artist_popularity: 50,
            artist_followers: 1000,
        }];
        let tracks = vec![Track {
            track_id: "t1".to_string(),
            track_name: "Only Song".to_string(),
            track_popularity: 42,
            track_duration_min: 3.5,
            explicit: false,
            release_year: None,
            album_type: None,
            artist_id: "a1".to_string(),
        }];
        write_dataset(&db_path, &artists, &tracks).unwrap();

        assert!(DatasetStore::open(&db_path).is_ok());
    }

    #[test]
    fn non_sqlite_file_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("garbage.db");
        std::fs::write(&db_path, b"definitely not a database, just some text padding it out").unwrap();

        assert!(DatasetStore::open(&db_path).is_err());
    }

    #[test]
    fn sessions_are_independent() {
        let (_temp_dir, db_path) = tiny_dataset();
        let store = DatasetStore::open(&db_path).unwrap();

        let first = store.session().unwrap();
        let second = store.session().unwrap();
        let count: i64 = first
            .query_row("SELECT COUNT(*) FROM tracks", [], |r| r.get(0))
            .unwrap();
        drop(first);
        let count_again: i64 = second
            .conn()
            .query_row("SELECT COUNT(*) FROM tracks", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, count_again);
    }

    #[test]
    fn refuses_to_overwrite_dataset() {
        let (_temp_dir, db_path) = tiny_dataset();
        assert!(write_dataset(&db_path, &[], &[]).is_err());
    }
}
