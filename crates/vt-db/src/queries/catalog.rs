//! Catalog writes used by the ingestion process.
//!
//! The API never mutates the catalog; these upserts exist for the external
//! importer and for seeding test databases.

use rusqlite::Connection;
use vt_core::{Error, Result};

use crate::models::NewMedia;

/// Insert or replace a catalog entry keyed on `(id, type)`.
pub fn upsert_media(conn: &Connection, media: &NewMedia) -> Result<()> {
    let genre_ids =
        serde_json::to_string(&media.genre_ids).map_err(|e| Error::Internal(e.to_string()))?;

    conn.execute(
        "INSERT INTO media (id, type, title, description, release_date, poster_url,
            backdrop_url, logo_url, trailer_url, certification, rating, genre_ids, streamable)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13)
         ON CONFLICT (id, type) DO UPDATE SET
            title = excluded.title,
            description = excluded.description,
            release_date = excluded.release_date,
            poster_url = excluded.poster_url,
            backdrop_url = excluded.backdrop_url,
            logo_url = excluded.logo_url,
            trailer_url = excluded.trailer_url,
            certification = excluded.certification,
            rating = excluded.rating,
            genre_ids = excluded.genre_ids,
            streamable = excluded.streamable",
        rusqlite::params![
            media.id,
            media.media_type.as_str(),
            media.title,
            media.description,
            media.release_date,
            media.poster_url,
            media.backdrop_url,
            media.logo_url,
            media.trailer_url,
            media.certification,
            media.rating,
            genre_ids,
            media.streamable,
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;
    Ok(())
}

/// Insert or rename a genre.
pub fn upsert_genre(conn: &Connection, id: i64, name: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO genres (id, name) VALUES (?1, ?2)
         ON CONFLICT (id) DO UPDATE SET name = excluded.name",
        rusqlite::params![id, name],
    )
    .map_err(|e| Error::database(e.to_string()))?;
    Ok(())
}

/// Insert or update a season of a series.
pub fn upsert_season(
    conn: &Connection,
    id: i64,
    media_id: i64,
    season_number: i64,
    release_date: Option<&str>,
    streamable: bool,
) -> Result<()> {
    conn.execute(
        "INSERT INTO tv_seasons (id, media_id, season_number, release_date, streamable)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT (id) DO UPDATE SET
            media_id = excluded.media_id,
            season_number = excluded.season_number,
            release_date = excluded.release_date,
            streamable = excluded.streamable",
        rusqlite::params![id, media_id, season_number, release_date, streamable],
    )
    .map_err(|e| Error::database(e.to_string()))?;
    Ok(())
}

/// Insert or update an episode of a season.
pub fn upsert_episode(
    conn: &Connection,
    id: i64,
    season_id: i64,
    episode_number: i64,
    title: Option<&str>,
    release_date: Option<&str>,
    streamable: bool,
) -> Result<()> {
    conn.execute(
        "INSERT INTO tv_episodes (id, season_id, episode_number, title, release_date, streamable)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT (id) DO UPDATE SET
            season_id = excluded.season_id,
            episode_number = excluded.episode_number,
            title = excluded.title,
            release_date = excluded.release_date,
            streamable = excluded.streamable",
        rusqlite::params![id, season_id, episode_number, title, release_date, streamable],
    )
    .map_err(|e| Error::database(e.to_string()))?;
    Ok(())
}
