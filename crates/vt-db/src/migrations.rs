//! Embedded SQL migrations and runner.
//!
//! Migrations are stored as `&str` constants and executed in order.  A
//! `schema_migrations` table tracks which versions have been applied.

use rusqlite::Connection;
use vt_core::{Error, Result};

/// V1: initial catalog schema.
const V1_INITIAL: &str = r#"
-- Catalog entries. Movies and series share the id space per type only.
CREATE TABLE media (
    id            INTEGER NOT NULL,
    type          TEXT NOT NULL CHECK (type IN ('movie', 'tv')),
    title         TEXT NOT NULL,
    description   TEXT,
    release_date  TEXT,
    poster_url    TEXT,
    backdrop_url  TEXT,
    logo_url      TEXT,
    trailer_url   TEXT,
    certification TEXT,
    rating        REAL,
    genre_ids     TEXT NOT NULL DEFAULT '[]',
    streamable    INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (id, type)
);

CREATE TABLE genres (
    id   INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE tv_seasons (
    id                 INTEGER PRIMARY KEY,
    media_id           INTEGER NOT NULL,
    season_number      INTEGER NOT NULL,
    description        TEXT,
    number_of_episodes INTEGER,
    release_date       TEXT,
    streamable         INTEGER NOT NULL DEFAULT 0,
    UNIQUE (media_id, season_number)
);

CREATE TABLE tv_episodes (
    id             INTEGER PRIMARY KEY,
    season_id      INTEGER NOT NULL REFERENCES tv_seasons(id) ON DELETE CASCADE,
    episode_number INTEGER NOT NULL,
    title          TEXT,
    description    TEXT,
    duration       INTEGER,
    still_url      TEXT,
    release_date   TEXT,
    streamable     INTEGER NOT NULL DEFAULT 0,
    UNIQUE (season_id, episode_number)
);

-- View events; append-only.
CREATE TABLE analytics_history (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    media_id   INTEGER NOT NULL,
    media_type TEXT NOT NULL,
    timestamp  TEXT NOT NULL
);

CREATE INDEX idx_media_streamable ON media(streamable, type);
CREATE INDEX idx_media_release ON media(release_date);
CREATE INDEX idx_seasons_media ON tv_seasons(media_id, streamable);
CREATE INDEX idx_episodes_season ON tv_episodes(season_id, streamable);
CREATE INDEX idx_analytics_timestamp ON analytics_history(timestamp);
CREATE INDEX idx_analytics_media ON analytics_history(media_id, media_type);
"#;

/// Ordered list of (version, sql) pairs.
const MIGRATIONS: &[(i64, &str)] = &[(1, V1_INITIAL)];

/// Apply all pending migrations.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .map_err(|e| Error::database(format!("Failed to create schema_migrations: {e}")))?;

    for &(version, sql) in MIGRATIONS {
        let already: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM schema_migrations WHERE version = ?1",
                [version],
                |row| row.get(0),
            )
            .map_err(|e| Error::database(e.to_string()))?;

        if already {
            continue;
        }

        let tx = conn
            .unchecked_transaction()
            .map_err(|e| Error::database(e.to_string()))?;

        tx.execute_batch(sql)
            .map_err(|e| Error::database(format!("Migration V{version} failed: {e}")))?;

        tx.execute(
            "INSERT INTO schema_migrations (version) VALUES (?1)",
            [version],
        )
        .map_err(|e| Error::database(e.to_string()))?;

        tx.commit().map_err(|e| Error::database(e.to_string()))?;
        tracing::debug!(version, "Applied migration");
    }

    Ok(())
}
