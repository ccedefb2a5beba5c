//! Query modules, one per catalog concern.
//!
//! Listing queries share [`MEDIA_COLS`], [`LABEL_JOINS`] and [`VISIBLE`] so
//! every list returns rows that [`crate::models::Media::from_row`] can read
//! and that carry the dates needed for label classification.

pub mod analytics;
pub mod catalog;
pub mod contents;
pub mod genres;
pub mod media;
pub mod related;
pub mod tv;

/// Column list for [`crate::models::Media`]; requires [`LABEL_JOINS`].
pub const MEDIA_COLS: &str = "m.id, m.type, m.title, m.description, m.release_date,
    m.poster_url, m.backdrop_url, m.logo_url, m.trailer_url, m.certification,
    m.rating, m.genre_ids, m.streamable, ls.latest_season_date, le.latest_episode_date";

/// Latest streamable season and episode release dates per series.
pub const LABEL_JOINS: &str = "
    LEFT JOIN (
        SELECT s.media_id, MAX(s.release_date) AS latest_season_date
        FROM tv_seasons s
        WHERE s.streamable = 1
        GROUP BY s.media_id
    ) ls ON m.type = 'tv' AND ls.media_id = m.id
    LEFT JOIN (
        SELECT s.media_id, MAX(e.release_date) AS latest_episode_date
        FROM tv_episodes e
        JOIN tv_seasons s ON s.id = e.season_id
        WHERE s.streamable = 1 AND e.streamable = 1
        GROUP BY s.media_id
    ) le ON m.type = 'tv' AND le.media_id = m.id";

/// Listing eligibility: streamable, and for series at least one streamable season.
pub const VISIBLE: &str = "m.streamable = 1 AND (m.type = 'movie' OR EXISTS (
        SELECT 1 FROM tv_seasons vs WHERE vs.media_id = m.id AND vs.streamable = 1))";

/// Calendar year of a date column, `NULL` when the date is missing.
pub(crate) fn year_of(column: &str) -> String {
    format!("CAST(substr({column}, 1, 4) AS INTEGER)")
}
