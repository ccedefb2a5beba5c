//! Single-entry lookups: detail, genre names, and the single-item label path.

use rusqlite::{Connection, OptionalExtension};
use vt_core::{Error, LabelDates, MediaType, Result};

use super::{LABEL_JOINS, MEDIA_COLS};
use crate::models::{parse_date, Media};
use crate::sql::QueryBuilder;

/// Get a streamable entry by `(type, id)`.
pub fn get_media(conn: &Connection, media_type: MediaType, id: i64) -> Result<Option<Media>> {
    let q = format!(
        "SELECT {MEDIA_COLS} FROM media m {LABEL_JOINS}
         WHERE m.id = ?1 AND m.type = ?2 AND m.streamable = 1"
    );
    conn.query_row(&q, rusqlite::params![id, media_type.as_str()], Media::from_row)
        .optional()
        .map_err(|e| Error::database(e.to_string()))
}

/// Whether any entry, streamable or not, exists under `(type, id)`.
pub fn media_exists(conn: &Connection, media_type: MediaType, id: i64) -> Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM media WHERE id = ?1 AND type = ?2",
        rusqlite::params![id, media_type.as_str()],
        |row| row.get(0),
    )
    .map_err(|e| Error::database(e.to_string()))
}

/// Genre names for `genre_ids`, in the same order; unknown ids are skipped.
pub fn genre_names(conn: &Connection, genre_ids: &[i64]) -> Result<Vec<String>> {
    let ids = serde_json::to_string(genre_ids).map_err(|e| Error::Internal(e.to_string()))?;
    let mut qb = QueryBuilder::new();
    qb.push("SELECT g.name FROM json_each(")
        .push_bind(ids)
        .push(") j JOIN genres g ON g.id = j.value ORDER BY j.key");
    qb.query_all(conn, |row| row.get(0))
}

/// Label dates for one streamable entry, read with dedicated per-date queries.
///
/// Produces the same [`LabelDates`] as [`Media::label_dates`] on a listed row.
pub fn label_dates(
    conn: &Connection,
    media_type: MediaType,
    id: i64,
) -> Result<Option<LabelDates>> {
    let release: Option<Option<String>> = conn
        .query_row(
            "SELECT release_date FROM media WHERE id = ?1 AND type = ?2 AND streamable = 1",
            rusqlite::params![id, media_type.as_str()],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| Error::database(e.to_string()))?;

    let Some(release) = release else {
        return Ok(None);
    };

    let mut dates = LabelDates {
        release: parse_date(release.as_deref()),
        ..Default::default()
    };

    if media_type == MediaType::Tv {
        let season: Option<String> = conn
            .query_row(
                "SELECT MAX(release_date) FROM tv_seasons
                 WHERE media_id = ?1 AND streamable = 1",
                [id],
                |row| row.get(0),
            )
            .map_err(|e| Error::database(e.to_string()))?;
        let episode: Option<String> = conn
            .query_row(
                "SELECT MAX(e.release_date) FROM tv_episodes e
                 JOIN tv_seasons s ON s.id = e.season_id
                 WHERE s.media_id = ?1 AND s.streamable = 1 AND e.streamable = 1",
                [id],
                |row| row.get(0),
            )
            .map_err(|e| Error::database(e.to_string()))?;
        dates.latest_season = parse_date(season.as_deref());
        dates.latest_episode = parse_date(episode.as_deref());
    }

    Ok(Some(dates))
}
