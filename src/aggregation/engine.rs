use super::models::*;
use crate::dataset::UNKNOWN_GENRE;
use crate::filter::CompiledPredicate;
use crate::server::metrics;
use rusqlite::{Connection, OptionalExtension, Row};
use std::time::Instant;
use tracing::{debug, warn};

const JOIN_SQL: &str = "FROM tracks t JOIN artists a ON t.artist_id = a.artist_id";

/// Quantiles reported by [`Aggregator::popularity_quantiles`].
pub const QUANTILES: [f64; 5] = [0.10, 0.25, 0.50, 0.75, 0.90];

/// Number of genres kept by the genre rankings.
pub const TOP_GENRES_LIMIT: usize = 10;

const JOINED_ROW_COLUMNS: &str = "t.track_name AS track_name,
    CAST(t.track_popularity AS INTEGER) AS track_popularity,
    CAST(t.track_duration_min AS REAL) AS track_duration_min,
    t.explicit AS explicit,
    CAST(t.release_year AS INTEGER) AS release_year,
    t.album_type AS album_type,
    a.artist_name AS artist_name,
    a.primary_genre AS primary_genre,
    CAST(a.artist_popularity AS INTEGER) AS artist_popularity,
    CAST(a.artist_followers AS INTEGER) AS artist_followers";

const HIT_ROW_COLUMNS: &str = "t.track_name AS track_name,
    CAST(t.track_popularity AS INTEGER) AS track_popularity,
    CAST(a.artist_popularity AS INTEGER) AS artist_popularity,
    CAST(a.artist_followers AS INTEGER) AS artist_followers";

const SIMILARITY_ROW_COLUMNS: &str = "t.track_name AS track_name,
    CAST(t.track_popularity AS INTEGER) AS track_popularity,
    CAST(t.track_duration_min AS REAL) AS track_duration_min,
    a.artist_name AS artist_name,
    CAST(a.artist_popularity AS INTEGER) AS artist_popularity,
    CAST(a.artist_followers AS INTEGER) AS artist_followers";

fn unknown_genre_condition() -> String {
    format!("a.primary_genre != '{}'", UNKNOWN_GENRE)
}

/// Runs the aggregate queries of one interaction.
///
/// Borrows the session connection and the compiled predicate; it holds no
/// other state, so any subset of queries can be issued in any order.
pub struct Aggregator<'a> {
    conn: &'a Connection,
    predicate: &'a CompiledPredicate,
}

impl<'a> Aggregator<'a> {
    pub fn new(conn: &'a Connection, predicate: &'a CompiledPredicate) -> Self {
        Aggregator { conn, predicate }
    }

    fn timed<T>(&self, operation: &str, f: impl FnOnce() -> rusqlite::Result<T>) -> rusqlite::Result<T> {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();
        metrics::record_db_query(operation, elapsed);
        match &result {
            Ok(_) => debug!("Query {} took {}ms", operation, elapsed.as_millis()),
            Err(e) => warn!("Query {} failed: {}", operation, e),
        }
        result
    }

    fn query_rows<T>(
        &self,
        sql: &str,
        map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
    ) -> rusqlite::Result<Vec<T>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(self.predicate.sql_params().as_slice(), map)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn matching_count(&self) -> rusqlite::Result<u64> {
        let sql = format!("SELECT COUNT(*) {} {}", JOIN_SQL, self.predicate.where_sql);
        let n: i64 = self
            .conn
            .query_row(&sql, self.predicate.sql_params().as_slice(), |r| r.get(0))?;
        Ok(n as u64)
    }

    /// Popularity at a 0-based position of the ascending popularity order.
    fn popularity_at_offset(&self, offset: u64) -> rusqlite::Result<Option<i64>> {
        let sql = format!(
            "SELECT CAST(t.track_popularity AS INTEGER) {} {}
             ORDER BY t.track_popularity
             LIMIT 1 OFFSET {}",
            JOIN_SQL, self.predicate.where_sql, offset
        );
        self.conn
            .query_row(&sql, self.predicate.sql_params().as_slice(), |r| r.get(0))
            .optional()
    }

    pub fn overview_metrics(&self) -> rusqlite::Result<OverviewMetrics> {
        self.timed("overview_metrics", || {
            let sql = format!(
                "SELECT
                    COUNT(*),
                    COUNT(DISTINCT a.artist_name),
                    AVG(t.track_popularity),
                    SUM(CASE WHEN t.track_popularity = 0 THEN 1 ELSE 0 END)
                 {} {}",
                JOIN_SQL, self.predicate.where_sql
            );
            self.conn
                .query_row(&sql, self.predicate.sql_params().as_slice(), |r| {
                    Ok(OverviewMetrics {
                        tracks: r.get::<_, i64>(0)? as u64,
                        unique_artists: r.get::<_, i64>(1)? as u64,
                        avg_popularity: r.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
                        zero_popularity_count: r.get::<_, Option<i64>>(3)?.unwrap_or(0) as u64,
                    })
                })
        })
    }

    /// Order-statistic quantiles of track popularity.
    ///
    /// For `n` matching rows the value for quantile `q` is the one at offset
    /// `floor((n - 1) * q)` of the ascending order; no interpolation.
    pub fn popularity_quantiles(&self) -> rusqlite::Result<Vec<PopularityQuantile>> {
        self.timed("popularity_quantiles", || {
            let n = self.matching_count()?;
            if n == 0 {
                return Ok(Vec::new());
            }

            let mut quantiles = Vec::with_capacity(QUANTILES.len());
            for quantile in QUANTILES {
                let offset = ((n - 1) as f64 * quantile).floor() as u64;
                if let Some(value) = self.popularity_at_offset(offset)? {
                    quantiles.push(PopularityQuantile { quantile, value });
                }
            }
            Ok(quantiles)
        })
    }

    /// Median as the lower middle element, offset `(n - 1) / 2`.
    pub fn median_popularity(&self) -> rusqlite::Result<Option<f64>> {
        self.timed("median_popularity", || {
            let n = self.matching_count()?;
            if n == 0 {
                return Ok(None);
            }
            Ok(self
                .popularity_at_offset((n - 1) / 2)?
                .map(|value| value as f64))
        })
    }

    fn per_year_popularity(&self) -> rusqlite::Result<Vec<YearlyPopularity>> {
        let sql = format!(
            "SELECT
                CAST(t.release_year AS INTEGER) AS release_year,
                AVG(t.track_popularity) AS avg_popularity,
                COUNT(*) AS num_tracks
             {} {}
             GROUP BY 1
             ORDER BY 1",
            JOIN_SQL,
            self.predicate
                .with_conditions(&["t.release_year IS NOT NULL"])
        );
        self.query_rows(&sql, |r| {
            Ok(YearlyPopularity {
                release_year: r.get("release_year")?,
                avg_popularity: r.get("avg_popularity")?,
                num_tracks: r.get::<_, i64>("num_tracks")? as u64,
            })
        })
    }

    pub fn yearly_aggregate(&self) -> rusqlite::Result<Vec<YearlyPopularity>> {
        self.timed("yearly_aggregate", || self.per_year_popularity())
    }

    pub fn popularity_over_time(&self) -> rusqlite::Result<Vec<YearlyPopularity>> {
        self.timed("popularity_over_time", || self.per_year_popularity())
    }

    /// Genres with the highest mean track popularity, ties by genre name.
    pub fn top_genres_by_avg_popularity(
        &self,
        exclude_unknown: bool,
    ) -> rusqlite::Result<Vec<GenreAverage>> {
        self.timed("top_genres_by_avg_popularity", || {
            let unknown = unknown_genre_condition();
            let conditions: Vec<&str> = if exclude_unknown {
                vec![unknown.as_str()]
            } else {
                vec![]
            };
            let sql = format!(
                "SELECT
                    a.primary_genre AS primary_genre,
                    AVG(t.track_popularity) AS avg_popularity,
                    COUNT(*) AS num_tracks
                 {} {}
                 GROUP BY a.primary_genre
                 ORDER BY avg_popularity DESC, a.primary_genre ASC
                 LIMIT {}",
                JOIN_SQL,
                self.predicate.with_conditions(&conditions),
                TOP_GENRES_LIMIT
            );
            self.query_rows(&sql, |r| {
                Ok(GenreAverage {
                    primary_genre: r.get("primary_genre")?,
                    avg_popularity: r.get("avg_popularity")?,
                    num_tracks: r.get::<_, i64>("num_tracks")? as u64,
                })
            })
        })
    }

    /// Genres with the most tracks, ties by genre name.
    pub fn genre_frequency(&self, exclude_unknown: bool) -> rusqlite::Result<Vec<GenreFrequency>> {
        self.timed("genre_frequency", || {
            let unknown = unknown_genre_condition();
            let conditions: Vec<&str> = if exclude_unknown {
                vec![unknown.as_str()]
            } else {
                vec![]
            };
            let sql = format!(
                "SELECT
                    a.primary_genre AS primary_genre,
                    COUNT(*) AS num_tracks
                 {} {}
                 GROUP BY a.primary_genre
                 ORDER BY num_tracks DESC, a.primary_genre ASC
                 LIMIT {}",
                JOIN_SQL,
                self.predicate.with_conditions(&conditions),
                TOP_GENRES_LIMIT
            );
            self.query_rows(&sql, |r| {
                Ok(GenreFrequency {
                    primary_genre: r.get("primary_genre")?,
                    num_tracks: r.get::<_, i64>("num_tracks")? as u64,
                })
            })
        })
    }

    pub fn explicit_summary(&self) -> rusqlite::Result<Vec<ExplicitSummary>> {
        self.timed("explicit_summary", || {
            let sql = format!(
                "SELECT
                    t.explicit AS explicit,
                    AVG(t.track_popularity) AS avg_popularity,
                    COUNT(*) AS num_tracks
                 {} {}
                 GROUP BY t.explicit
                 ORDER BY t.explicit",
                JOIN_SQL, self.predicate.where_sql
            );
            self.query_rows(&sql, |r| {
                Ok(ExplicitSummary {
                    explicit: r.get::<_, i64>("explicit")? != 0,
                    avg_popularity: r.get("avg_popularity")?,
                    num_tracks: r.get::<_, i64>("num_tracks")? as u64,
                })
            })
        })
    }

    /// Track counts per popularity bucket, largest first.
    pub fn popularity_buckets(&self) -> rusqlite::Result<Vec<BucketCount>> {
        self.timed("popularity_buckets", || {
            let sql = format!(
                "SELECT
                    CASE
                        WHEN t.track_popularity <= 30 THEN 'Low'
                        WHEN t.track_popularity <= 60 THEN 'Medium'
                        ELSE 'High'
                    END AS popularity_bucket,
                    COUNT(*) AS num_tracks
                 {} {}
                 GROUP BY popularity_bucket
                 ORDER BY num_tracks DESC",
                JOIN_SQL, self.predicate.where_sql
            );
            let mut buckets = self.query_rows(&sql, |r| {
                let label: String = r.get("popularity_bucket")?;
                let bucket = PopularityBucket::from_db_str(&label).ok_or_else(|| {
                    rusqlite::Error::InvalidColumnType(
                        0,
                        "popularity_bucket".to_string(),
                        rusqlite::types::Type::Text,
                    )
                })?;
                Ok(BucketCount {
                    popularity_bucket: bucket,
                    num_tracks: r.get::<_, i64>("num_tracks")? as u64,
                })
            })?;
            buckets.sort_by(|a, b| {
                b.num_tracks
                    .cmp(&a.num_tracks)
                    .then(a.popularity_bucket.cmp(&b.popularity_bucket))
            });
            Ok(buckets)
        })
    }

    fn row_to_joined_row(row: &Row) -> rusqlite::Result<JoinedRow> {
        Ok(JoinedRow {
            track_name: row.get("track_name")?,
            track_popularity: row.get("track_popularity")?,
            track_duration_min: row.get("track_duration_min")?,
            explicit: row.get::<_, i64>("explicit")? != 0,
            release_year: row.get("release_year")?,
            album_type: row.get("album_type")?,
            artist_name: row.get("artist_name")?,
            primary_genre: row.get("primary_genre")?,
            artist_popularity: row.get("artist_popularity")?,
            artist_followers: row.get("artist_followers")?,
        })
    }

    /// Every matching row in dataset order, optionally capped at `limit`.
    pub fn joined_rows(&self, limit: Option<usize>) -> rusqlite::Result<Vec<JoinedRow>> {
        let operation = if limit.is_some() {
            "joined_rows_sample"
        } else {
            "joined_rows_full"
        };
        self.timed(operation, || {
            let limit_sql = limit.map(|l| format!("LIMIT {}", l)).unwrap_or_default();
            let sql = format!(
                "SELECT {} {} {} ORDER BY t.rowid {}",
                JOINED_ROW_COLUMNS, JOIN_SQL, self.predicate.where_sql, limit_sql
            );
            self.query_rows(&sql, Self::row_to_joined_row)
        })
    }

    /// Rows for the hit classifier, capped like the sampled joined rows.
    pub fn hit_rows(&self, limit: Option<usize>) -> rusqlite::Result<Vec<HitRow>> {
        self.timed("hit_rows", || {
            let limit_sql = limit.map(|l| format!("LIMIT {}", l)).unwrap_or_default();
            let sql = format!(
                "SELECT {} {} {} ORDER BY t.rowid {}",
                HIT_ROW_COLUMNS, JOIN_SQL, self.predicate.where_sql, limit_sql
            );
            self.query_rows(&sql, |r| {
                Ok(HitRow {
                    track_name: r.get("track_name")?,
                    track_popularity: r.get("track_popularity")?,
                    artist_popularity: r.get("artist_popularity")?,
                    artist_followers: r.get("artist_followers")?,
                })
            })
        })
    }

    fn row_to_similarity_row(r: &Row) -> rusqlite::Result<SimilarityRow> {
        Ok(SimilarityRow {
            track_name: r.get("track_name")?,
            track_popularity: r.get("track_popularity")?,
            track_duration_min: r.get("track_duration_min")?,
            artist_name: r.get("artist_name")?,
            artist_popularity: r.get("artist_popularity")?,
            artist_followers: r.get("artist_followers")?,
        })
    }

    pub fn similarity_rows(&self) -> rusqlite::Result<Vec<SimilarityRow>> {
        self.timed("similarity_rows", || {
            let sql = format!(
                "SELECT {} {} {} ORDER BY t.rowid",
                SIMILARITY_ROW_COLUMNS, JOIN_SQL, self.predicate.where_sql
            );
            self.query_rows(&sql, Self::row_to_similarity_row)
        })
    }

    /// The most popular track, then most popular artist, then most followed.
    ///
    /// Meant to run with [`CompiledPredicate::unrestricted`] to pick an anchor
    /// that does not move with the filters.
    pub fn global_reference_track(&self) -> rusqlite::Result<Option<SimilarityRow>> {
        self.timed("global_reference_track", || {
            let sql = format!(
                "SELECT {} {} {}
                 ORDER BY t.track_popularity DESC, a.artist_popularity DESC, a.artist_followers DESC
                 LIMIT 1",
                SIMILARITY_ROW_COLUMNS,
                JOIN_SQL,
                self.predicate.with_conditions(&[
                    "t.track_popularity IS NOT NULL",
                    "a.artist_popularity IS NOT NULL",
                    "a.artist_followers IS NOT NULL",
                ])
            );
            self.conn
                .query_row(
                    &sql,
                    self.predicate.sql_params().as_slice(),
                    Self::row_to_similarity_row,
                )
                .optional()
        })
    }

    /// Runs the rest of the queries around an already fetched overview.
    ///
    /// The hit rows share the sample cap with `rows_sample`.
    pub fn fetch_bundle(
        &self,
        overview: OverviewMetrics,
        exclude_unknown_genre: bool,
        sample_limit: Option<usize>,
    ) -> rusqlite::Result<AggregateBundle> {
        let rows_full = self.joined_rows(None)?;
        let rows_sample = match sample_limit {
            Some(_) => self.joined_rows(sample_limit)?,
            None => rows_full.clone(),
        };
        Ok(AggregateBundle {
            overview,
            median_popularity: self.median_popularity()?,
            quantiles: self.popularity_quantiles()?,
            yearly: self.yearly_aggregate()?,
            top_avg_genres: self.top_genres_by_avg_popularity(exclude_unknown_genre)?,
            genre_frequency: self.genre_frequency(exclude_unknown_genre)?,
            explicit_summary: self.explicit_summary()?,
            popularity_over_time: self.popularity_over_time()?,
            popularity_buckets: self.popularity_buckets()?,
            rows_full,
            rows_sample,
            hit_rows: self.hit_rows(sample_limit)?,
            similarity_rows: self.similarity_rows()?,
        })
    }
}
