//! Integration tests for related-content recommendations.

mod common;

use common::{get_json, TestHarness};

fn ids(body: &serde_json::Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_i64().unwrap())
        .collect()
}

fn tiers(body: &serde_json::Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|m| m["tier"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn genre_tier_scores_shared_genres() {
    let (h, addr) = TestHarness::with_server().await;
    h.movie(1, "Target", Some(8.0), &[28, 12], "2015-01-01");
    h.movie(2, "Twin", Some(8.0), &[28, 12], "2015-06-01");
    h.movie(3, "Cousin", Some(7.5), &[28], "2010-01-01");
    h.movie(4, "Stranger", Some(8.0), &[99], "2015-01-01");
    h.movie(5, "Far Rating", Some(3.0), &[28, 12], "2015-01-01");
    h.series(6, "Other Type", Some(8.0), &[28, 12], "2015-01-01");

    let body = get_json(&format!("http://{addr}/api/contents/correlati/movie/1"), 200).await;
    assert_eq!(ids(&body), vec![2, 3]);
    assert_eq!(tiers(&body), vec![1, 1]);

    let first = body[0]["similarity_score"].as_f64().unwrap();
    let second = body[1]["similarity_score"].as_f64().unwrap();
    assert!(first > second);
    assert!((first - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn falls_back_to_rating_then_top_rated() {
    let (h, addr) = TestHarness::with_server().await;
    h.movie(1, "Target", Some(6.0), &[28], "2015-01-01");
    h.movie(2, "Near", Some(7.0), &[18], "2015-01-01");
    h.movie(3, "Far", Some(9.5), &[18], "2015-01-01");

    // No shared genre: rating proximity wins.
    let body = get_json(&format!("http://{addr}/api/contents/correlati/movie/1"), 200).await;
    assert_eq!(ids(&body), vec![2]);
    assert_eq!(tiers(&body), vec![2]);
    assert!(body[0].get("similarity_score").is_none());

    // Nothing within two points: best rated at or above seven.
    h.movie(2, "Near", Some(9.0), &[18], "2015-01-01");
    let body = get_json(&format!("http://{addr}/api/contents/correlati/movie/1"), 200).await;
    assert_eq!(ids(&body), vec![3, 2]);
    assert_eq!(tiers(&body), vec![3, 3]);
}

#[tokio::test]
async fn unrated_target_goes_straight_to_top_rated() {
    let (h, addr) = TestHarness::with_server().await;
    h.series(1, "Unrated", None, &[28], "2015-01-01");
    h.series(2, "Great", Some(8.5), &[28], "2015-01-01");
    h.series(3, "Meh", Some(5.0), &[28], "2015-01-01");

    let body = get_json(&format!("http://{addr}/api/contents/correlati/tv/1"), 200).await;
    assert_eq!(ids(&body), vec![2]);
    assert_eq!(tiers(&body), vec![3]);
}

#[tokio::test]
async fn limit_is_clamped_and_unknown_target_is_empty() {
    let (h, addr) = TestHarness::with_server().await;
    h.movie(1, "Target", Some(8.0), &[28], "2015-01-01");
    for id in 2..=6 {
        h.movie(id, &format!("Peer {id}"), Some(8.0), &[28], "2015-01-01");
    }

    let body = get_json(
        &format!("http://{addr}/api/contents/correlati/movie/1?limit=2"),
        200,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let body = get_json(
        &format!("http://{addr}/api/contents/correlati/movie/1?limit=0"),
        200,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let body = get_json(&format!("http://{addr}/api/contents/correlati/movie/404"), 200).await;
    assert_eq!(body, serde_json::json!([]));

    let resp = reqwest::get(format!("http://{addr}/api/contents/correlati/movie/1?limit=many"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}
