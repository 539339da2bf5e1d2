//! Shared constants for end-to-end tests
//!
//! When the test dataset changes, update only this file and fixtures.rs.

// ============================================================================
// Test Dataset
// ============================================================================

/// Number of tracks in the test dataset
pub const TOTAL_TRACKS: u64 = 8;

/// Number of artists in the test dataset
pub const TOTAL_ARTISTS: u64 = 4;

/// Earliest release year in the test dataset
pub const MIN_YEAR: i64 = 2001;

/// Latest release year in the test dataset
pub const MAX_YEAR: i64 = 2019;

/// Artist with the highest popularity and follower count
pub const ARTIST_1_NAME: &str = "The Test Band";

/// Jazz artist, above a million followers but below the predicted hit popularity
pub const ARTIST_2_NAME: &str = "Jazz Ensemble";

/// Most popular track, by ARTIST_1_NAME
pub const TOP_TRACK_NAME: &str = "Opening Track";

/// Every genre in the test dataset, sorted
pub const ALL_GENRES: [&str; 4] = ["Unknown", "jazz", "pop", "rock"];

/// Every album type in the test dataset, sorted
pub const ALL_ALBUM_TYPES: [&str; 3] = ["album", "compilation", "single"];

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for the server to answer its first request
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Delay between readiness polls
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;

/// Timeout for each request made by the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
