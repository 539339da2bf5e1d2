use rusqlite::Connection;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_YEAR: i64 = 1950;
pub const DEFAULT_MAX_YEAR: i64 = 2025;

/// The values a user can pick from, as found in the dataset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub min_year: i64,
    pub max_year: i64,
    pub genres: Vec<String>,
    pub album_types: Vec<String>,
}

impl FilterOptions {
    /// Reads the year bounds and the distinct genres and album types.
    ///
    /// Falls back to [`DEFAULT_MIN_YEAR`]..[`DEFAULT_MAX_YEAR`] when no track
    /// has a release year.
    pub fn load(conn: &Connection) -> rusqlite::Result<Self> {
        let (min_year, max_year): (Option<i64>, Option<i64>) = conn.query_row(
            "SELECT CAST(MIN(release_year) AS INTEGER), CAST(MAX(release_year) AS INTEGER)
             FROM tracks WHERE release_year IS NOT NULL",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;

        let genres = conn
            .prepare(
                "SELECT DISTINCT primary_genre FROM artists
                 WHERE primary_genre IS NOT NULL ORDER BY primary_genre",
            )?
            .query_map([], |r| r.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let album_types = conn
            .prepare(
                "SELECT DISTINCT album_type FROM tracks
                 WHERE album_type IS NOT NULL ORDER BY album_type",
            )?
            .query_map([], |r| r.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(FilterOptions {
            min_year: min_year.unwrap_or(DEFAULT_MIN_YEAR),
            max_year: max_year.unwrap_or(DEFAULT_MAX_YEAR),
            genres,
            album_types,
        })
    }
}
