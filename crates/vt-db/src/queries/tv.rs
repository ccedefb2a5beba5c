//! TV structure: seasons, episodes, and next-episode navigation.
//!
//! Everything here is filtered to streamable rows of a streamable series.

use rusqlite::{Connection, OptionalExtension};
use vt_core::{Error, Result};

use crate::models::{Episode, Season};
use crate::sql::QueryBuilder;

const SEASON_COLS: &str = "s.id, s.media_id, s.season_number, s.description,
    s.number_of_episodes, s.release_date, s.streamable";

const EPISODE_COLS: &str = "e.id, e.season_id, s.media_id, s.season_number,
    e.episode_number, e.title, e.description, e.duration, e.still_url,
    e.release_date, e.streamable";

/// Streamable seasons joined to their streamable series.
const SEASON_SCOPE: &str = "tv_seasons s
    JOIN media m ON m.id = s.media_id AND m.type = 'tv' AND m.streamable = 1";

/// Streamable seasons of a series, by season number.
pub fn list_seasons(conn: &Connection, media_id: i64) -> Result<Vec<Season>> {
    let mut qb = QueryBuilder::new();
    qb.push(&format!("SELECT {SEASON_COLS} FROM {SEASON_SCOPE} WHERE s.media_id = "))
        .push_bind(media_id)
        .push(" AND s.streamable = 1 ORDER BY s.season_number");
    qb.query_all(conn, Season::from_row)
}

/// Streamable episodes of one streamable season, by episode number.
pub fn list_episodes(conn: &Connection, media_id: i64, season_number: i64) -> Result<Vec<Episode>> {
    let mut qb = QueryBuilder::new();
    qb.push(&format!(
        "SELECT {EPISODE_COLS} FROM tv_episodes e JOIN {SEASON_SCOPE} ON s.id = e.season_id
         WHERE s.media_id = "
    ))
    .push_bind(media_id)
    .push(" AND s.season_number = ")
    .push_bind(season_number)
    .push(" AND s.streamable = 1 AND e.streamable = 1 ORDER BY e.episode_number");
    qb.query_all(conn, Episode::from_row)
}

/// One streamable episode together with the series title.
pub fn get_episode(
    conn: &Connection,
    media_id: i64,
    season_number: i64,
    episode_number: i64,
) -> Result<Option<(Episode, String)>> {
    let q = format!(
        "SELECT {EPISODE_COLS}, m.title FROM tv_episodes e JOIN {SEASON_SCOPE} ON s.id = e.season_id
         WHERE s.media_id = ?1 AND s.season_number = ?2 AND e.episode_number = ?3
           AND s.streamable = 1 AND e.streamable = 1"
    );
    conn.query_row(&q, [media_id, season_number, episode_number], |row| {
        Ok((Episode::from_row(row)?, row.get(11)?))
    })
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// The streamable episode that follows `(season, episode)`: the next one in
/// the same season, else the first one of the following season.
pub fn next_episode(
    conn: &Connection,
    media_id: i64,
    season_number: i64,
    episode_number: i64,
) -> Result<Option<Episode>> {
    let q = format!(
        "SELECT {EPISODE_COLS} FROM tv_episodes e JOIN {SEASON_SCOPE} ON s.id = e.season_id
         WHERE s.media_id = ?1 AND s.streamable = 1 AND e.streamable = 1
           AND ((s.season_number = ?2 AND e.episode_number > ?3) OR s.season_number > ?2)
         ORDER BY s.season_number, e.episode_number
         LIMIT 1"
    );
    conn.query_row(&q, [media_id, season_number, episode_number], Episode::from_row)
        .optional()
        .map_err(|e| Error::database(e.to_string()))
}
