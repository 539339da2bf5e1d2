//! End-to-end tests for dashboard computation
//!
//! Covers the aggregate tables and the scoring outputs returned by
//! POST /v1/dashboard under different filters.

mod common;

use common::{TestClient, TestServer, ARTIST_1_NAME, TOP_TRACK_NAME, TOTAL_ARTISTS, TOTAL_TRACKS};
use reqwest::StatusCode;
use serde_json::{json, Value};

fn assert_close(actual: &Value, expected: f64) {
    let actual = actual.as_f64().expect("Expected a number");
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {} but got {}",
        expected,
        actual
    );
}

fn bucket_count(report: &Value, bucket: &str) -> u64 {
    report["aggregates"]["popularity_buckets"]
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["popularity_bucket"] == bucket)
        .map(|b| b["num_tracks"].as_u64().unwrap())
        .unwrap_or(0)
}

// =============================================================================
// Aggregates
// =============================================================================

#[tokio::test]
async fn test_unrestricted_overview() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let report = client.dashboard_json(json!({})).await;

    assert_eq!(report["status"], "ready");
    let overview = &report["aggregates"]["overview"];
    assert_eq!(overview["tracks"], TOTAL_TRACKS);
    assert_eq!(overview["unique_artists"], TOTAL_ARTISTS);
    assert_eq!(overview["zero_popularity_count"], 1);
    assert_close(&overview["avg_popularity"], 43.125);
    assert_close(&report["aggregates"]["median_popularity"], 35.0);
}

#[tokio::test]
async fn test_quantiles_are_order_statistics() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let report = client.dashboard_json(json!({})).await;

    let values: Vec<i64> = report["aggregates"]["quantiles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["value"].as_i64().unwrap())
        .collect();
    assert_eq!(values, vec![0, 10, 35, 65, 75]);
}

#[tokio::test]
async fn test_yearly_popularity_is_sorted_by_year() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let report = client.dashboard_json(json!({})).await;

    let yearly = report["aggregates"]["yearly"].as_array().unwrap();
    let years: Vec<i64> = yearly
        .iter()
        .map(|y| y["release_year"].as_i64().unwrap())
        .collect();
    assert_eq!(years, vec![2001, 2003, 2012, 2015, 2016, 2018, 2019]);

    let year_2012 = yearly.iter().find(|y| y["release_year"] == 2012).unwrap();
    assert_eq!(year_2012["num_tracks"], 2);
    assert_close(&year_2012["avg_popularity"], 27.5);
}

#[tokio::test]
async fn test_unknown_genre_is_excluded_from_rankings_by_default() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let report = client.dashboard_json(json!({})).await;
    let genres: Vec<&str> = report["aggregates"]["top_avg_genres"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["primary_genre"].as_str().unwrap())
        .collect();
    assert_eq!(genres, vec!["pop", "jazz", "rock"]);

    // The exclusion only touches the genre rankings
    assert_eq!(report["aggregates"]["overview"]["tracks"], TOTAL_TRACKS);

    let report = client
        .dashboard_json(json!({ "exclude_unknown_genre": false }))
        .await;
    let top = report["aggregates"]["top_avg_genres"].as_array().unwrap();
    assert_eq!(top.len(), 4);
    assert_eq!(top[3]["primary_genre"], "Unknown");
    assert_close(&top[3]["avg_popularity"], 5.0);
}

#[tokio::test]
async fn test_popularity_buckets() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let report = client.dashboard_json(json!({})).await;

    assert_eq!(bucket_count(&report, "Low"), 3);
    assert_eq!(bucket_count(&report, "Medium"), 2);
    assert_eq!(bucket_count(&report, "High"), 3);
}

// =============================================================================
// Scoring
// =============================================================================

#[tokio::test]
async fn test_artist_ranking_puts_strongest_artist_first() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let report = client.dashboard_json(json!({})).await;

    let ranking = &report["artist_ranking"];
    assert_eq!(ranking["status"], "ranked");
    let artists = ranking["artists"].as_array().unwrap();
    assert_eq!(artists.len(), TOTAL_ARTISTS as usize);
    assert_eq!(artists[0]["artist_name"], ARTIST_1_NAME);
    assert_close(&artists[0]["artist_index"], 0.9);
}

#[tokio::test]
async fn test_artist_ranking_needs_three_artists() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let report = client.dashboard_json(json!({ "genres": ["pop", "jazz"] })).await;

    assert_eq!(report["artist_ranking"]["status"], "not_enough_artists");
    assert_eq!(report["artist_ranking"]["distinct_artists"], 2);
}

#[tokio::test]
async fn test_sample_limit_applies_to_ranking_and_hits() {
    let server = TestServer::spawn_with_sample_limit(3).await;
    let client = TestClient::new(server.base_url.clone());

    let report = client.dashboard_json(json!({})).await;

    // The first three rows belong to two artists
    assert_eq!(report["artist_ranking"]["status"], "not_enough_artists");
    assert_eq!(report["aggregates"]["overview"]["tracks"], TOTAL_TRACKS);

    // Hits are judged within the sample of popularities 90, 75, 65
    let hits = &report["hit_evaluation"];
    assert_close(&hits["popularity_cutoff"], 81.0);
    assert_eq!(hits["true_positives"], 1);
    assert_eq!(hits["false_positives"], 1);
    assert_eq!(hits["true_negatives"], 1);
    assert_eq!(hits["false_negatives"], 0);

    // Similarity keeps every matching row
    let ranked = report["similarity"]["ranked"].as_array().unwrap();
    assert_eq!(ranked.len(), TOTAL_TRACKS as usize);
}

#[tokio::test]
async fn test_hit_evaluation() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let report = client.dashboard_json(json!({})).await;

    let hits = &report["hit_evaluation"];
    assert_close(&hits["popularity_cutoff"], 63.5);
    assert_eq!(hits["true_positives"], 2);
    assert_eq!(hits["false_positives"], 0);
    assert_eq!(hits["true_negatives"], 5);
    assert_eq!(hits["false_negatives"], 1);
    assert_close(&hits["accuracy"], 0.875);
    assert_close(&hits["precision"], 1.0);
    assert_close(&hits["recall"], 2.0 / 3.0);
}

#[tokio::test]
async fn test_similarity_ranks_reference_first() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let report = client.dashboard_json(json!({})).await;

    let similarity = &report["similarity"];
    assert_eq!(similarity["status"], "ranked");
    assert_eq!(similarity["reference"]["track_name"], TOP_TRACK_NAME);

    let ranked = similarity["ranked"].as_array().unwrap();
    assert_eq!(ranked.len(), TOTAL_TRACKS as usize);
    assert_eq!(ranked[0]["track_name"], TOP_TRACK_NAME);
    assert_close(&ranked[0]["similarity"], 0.0);

    let distances: Vec<f64> = ranked
        .iter()
        .map(|t| t["similarity"].as_f64().unwrap())
        .collect();
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_similarity_without_qualifying_reference() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    // No rock artist reaches the reference artist popularity
    let report = client.dashboard_json(json!({ "genres": ["rock"] })).await;

    assert_eq!(report["similarity"]["status"], "no_reference");
}

#[tokio::test]
async fn test_correlation_matrix_shape() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let report = client.dashboard_json(json!({})).await;

    let correlation = &report["correlation"];
    let features = correlation["features"].as_array().unwrap();
    let values = correlation["values"].as_array().unwrap();
    assert_eq!(features.len(), 4);
    assert_eq!(values.len(), 4);
    for (i, row) in values.iter().enumerate() {
        let row = row.as_array().unwrap();
        assert_eq!(row.len(), 4);
        assert_close(&row[i], 1.0);
    }
}

// =============================================================================
// No Data
// =============================================================================

#[tokio::test]
async fn test_no_matching_tracks_reports_no_data() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let report = client.dashboard_json(json!({ "genres": ["polka"] })).await;

    assert_eq!(report["status"], "no_data");
    assert!(report["predicate"]["where_sql"]
        .as_str()
        .unwrap()
        .starts_with("WHERE "));
    assert!(report.get("aggregates").is_none());
}

#[tokio::test]
async fn test_empty_dataset_reports_no_data() {
    let server = TestServer::spawn_empty().await;
    let client = TestClient::new(server.base_url.clone());

    let report = client.dashboard_json(json!({})).await;

    assert_eq!(report["status"], "no_data");
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.post_dashboard_raw("{").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client.post_dashboard_raw(r#"{"year_range": "recent"}"#).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
