//! Integration tests for seasons, episodes and next-episode navigation.

mod common;

use common::{get_json, TestHarness};

/// Series 10 with season 1 (episodes 1-3, episode 2 hidden), a hidden
/// season 2 and season 3 (episode 1).
fn seed(h: &TestHarness) {
    h.series(10, "Serie", Some(8.0), &[], "2020-01-01");
    h.season(1002, 10, 2, Some("2021-01-01"), false);
    h.season(1003, 10, 3, Some("2022-01-01"), true);
    h.episode(1, 1001, 1, "Pilota", Some("2020-01-01"), true);
    h.episode(2, 1001, 2, "Nascosto", Some("2020-01-08"), false);
    h.episode(3, 1001, 3, "Terzo", Some("2020-01-15"), true);
    h.episode(4, 1002, 1, "Inedito", Some("2021-01-01"), true);
    h.episode(5, 1003, 1, "Ritorno", Some("2022-01-01"), true);
}

#[tokio::test]
async fn seasons_skip_hidden() {
    let (h, addr) = TestHarness::with_server().await;
    seed(&h);

    let body = get_json(&format!("http://{addr}/api/contents/tv/10/seasons"), 200).await;
    let numbers: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["season_number"].as_i64().unwrap())
        .collect();
    assert_eq!(numbers, vec![1, 3]);
    assert_eq!(body[0]["media_id"], 10);

    let empty = get_json(&format!("http://{addr}/api/contents/tv/404/seasons"), 200).await;
    assert_eq!(empty, serde_json::json!([]));
}

#[tokio::test]
async fn movies_have_no_seasons() {
    let (h, addr) = TestHarness::with_server().await;
    h.movie(10, "Film", None, &[], "2020-01-01");

    for path in [
        "movie/10/seasons",
        "movie/10/episodes/1",
        "movie/10/episode/1/1",
        "movie/10/next-episode/1/1",
    ] {
        let resp = reqwest::get(format!("http://{addr}/api/contents/{path}"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 400, "path {path}");
    }
}

#[tokio::test]
async fn episodes_of_a_season() {
    let (h, addr) = TestHarness::with_server().await;
    seed(&h);

    let body = get_json(&format!("http://{addr}/api/contents/tv/10/episodes/1"), 200).await;
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Pilota", "Terzo"]);
    assert!(body[0].get("media_title").is_none());

    let hidden = get_json(&format!("http://{addr}/api/contents/tv/10/episodes/2"), 200).await;
    assert_eq!(hidden, serde_json::json!([]));

    let resp = reqwest::get(format!("http://{addr}/api/contents/tv/10/episodes/first"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn single_episode_carries_series_title() {
    let (h, addr) = TestHarness::with_server().await;
    seed(&h);

    let body = get_json(&format!("http://{addr}/api/contents/tv/10/episode/3/1"), 200).await;
    assert_eq!(body["title"], "Ritorno");
    assert_eq!(body["season_number"], 3);
    assert_eq!(body["episode_number"], 1);
    assert_eq!(body["media_title"], "Serie");

    let resp = reqwest::get(format!("http://{addr}/api/contents/tv/10/episode/1/2"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn next_episode_within_and_across_seasons() {
    let (h, addr) = TestHarness::with_server().await;
    seed(&h);

    let next = |s: i64, e: i64| format!("http://{addr}/api/contents/tv/10/next-episode/{s}/{e}");

    // Skips the hidden episode 2.
    let body = get_json(&next(1, 1), 200).await;
    assert_eq!(body["title"], "Terzo");

    // Skips the hidden season 2.
    let body = get_json(&next(1, 3), 200).await;
    assert_eq!(body["title"], "Ritorno");
    assert_eq!(body["season_number"], 3);

    let resp = reqwest::get(next(3, 1)).await.unwrap();
    assert_eq!(resp.status(), 404);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "not_found");
}
