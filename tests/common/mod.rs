//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates an in-memory DB, default config and
//! a full [`AppContext`]. The [`TestHarness::with_server`] constructor starts
//! Axum on a random port for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{Duration, Local, Utc};
use vt_core::config::Config;
use vt_core::MediaType;
use vt_db::models::NewMedia;
use vt_db::pool::{init_memory_pool, DbPool};
use vt_db::queries::{analytics, catalog};
use vt_server::context::AppContext;
use vt_server::router::build_router;

/// Test harness wrapping an [`AppContext`] backed by an in-memory database.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
}

impl TestHarness {
    /// Create a new harness with default configuration and in-memory DB.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new harness with a custom configuration and in-memory DB.
    pub fn with_config(config: Config) -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        let ctx = AppContext::new(db.clone(), Arc::new(config));
        Self { ctx, db }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::with_server_config(Config::default()).await
    }

    /// Start an Axum server with custom config on a random port.
    pub async fn with_server_config(config: Config) -> (Self, SocketAddr) {
        let harness = Self::with_config(config);
        let app = build_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    /// Get a database connection from the pool.
    pub fn conn(&self) -> vt_db::pool::PooledConnection {
        vt_db::pool::get_conn(&self.db).expect("failed to get db connection")
    }

    // -----------------------------------------------------------------------
    // Catalog seeding
    // -----------------------------------------------------------------------

    pub fn genre(&self, id: i64, name: &str) {
        catalog::upsert_genre(&self.conn(), id, name).expect("failed to insert genre");
    }

    /// Insert a fully specified entry.
    pub fn insert(&self, media: &NewMedia) {
        catalog::upsert_media(&self.conn(), media).expect("failed to insert media");
    }

    /// Insert a streamable movie.
    pub fn movie(&self, id: i64, title: &str, rating: Option<f64>, genres: &[i64], release: &str) {
        let mut m = NewMedia::new(id, MediaType::Movie, title);
        m.rating = rating;
        m.genre_ids = genres.to_vec();
        m.release_date = Some(release.to_string());
        self.insert(&m);
    }

    /// Insert a streamable series with one streamable season released
    /// together with the series.
    pub fn series(&self, id: i64, title: &str, rating: Option<f64>, genres: &[i64], release: &str) {
        let mut m = NewMedia::new(id, MediaType::Tv, title);
        m.rating = rating;
        m.genre_ids = genres.to_vec();
        m.release_date = Some(release.to_string());
        self.insert(&m);
        self.season(id * 100 + 1, id, 1, Some(release), true);
    }

    pub fn season(&self, id: i64, media_id: i64, number: i64, release: Option<&str>, streamable: bool) {
        catalog::upsert_season(&self.conn(), id, media_id, number, release, streamable)
            .expect("failed to insert season");
    }

    pub fn episode(
        &self,
        id: i64,
        season_id: i64,
        number: i64,
        title: &str,
        release: Option<&str>,
        streamable: bool,
    ) {
        catalog::upsert_episode(&self.conn(), id, season_id, number, Some(title), release, streamable)
            .expect("failed to insert episode");
    }

    /// Record `count` views of an entry, `hours_ago` hours before now.
    pub fn views(&self, media_type: MediaType, id: i64, count: usize, hours_ago: i64) {
        let conn = self.conn();
        let at = Utc::now() - Duration::hours(hours_ago);
        for _ in 0..count {
            analytics::record_view(&conn, media_type, id, at).expect("failed to record view");
        }
    }
}

/// `YYYY-MM-DD` for the local date `days` days ago.
pub fn days_ago(days: i64) -> String {
    (Local::now().date_naive() - Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

/// Fetch a URL and decode the JSON body, asserting the status first.
pub async fn get_json(url: &str, status: u16) -> serde_json::Value {
    let resp = reqwest::get(url).await.expect("request failed");
    assert_eq!(resp.status(), status, "unexpected status for {url}");
    resp.json().await.expect("body is not JSON")
}
