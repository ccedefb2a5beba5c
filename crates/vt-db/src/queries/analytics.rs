//! View events and the top-viewed aggregate.
//!
//! The aggregation window is anchored to the newest recorded event rather
//! than to the current time, so a quiet log still yields a ranking.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use vt_core::{Error, MediaType, Result};

use super::{LABEL_JOINS, MEDIA_COLS, VISIBLE};
use crate::models::{Media, TopViewed};
use crate::sql::QueryBuilder;

/// Length of the top-viewed window, counted back from the newest event.
pub const WINDOW_DAYS: i64 = 7;

/// Append a view event. Returns the new row id.
pub fn record_view(
    conn: &Connection,
    media_type: MediaType,
    media_id: i64,
    at: DateTime<Utc>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO analytics_history (media_id, media_type, timestamp) VALUES (?1, ?2, ?3)",
        rusqlite::params![
            media_id,
            media_type.as_str(),
            at.format("%Y-%m-%d %H:%M:%S").to_string()
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;
    Ok(conn.last_insert_rowid())
}

/// Most viewed visible entries inside the window, optionally of one type.
pub fn top_viewed(
    conn: &Connection,
    media_type: Option<MediaType>,
    limit: i64,
) -> Result<Vec<TopViewed>> {
    let mut qb = QueryBuilder::new();
    qb.push(&format!(
        "SELECT {MEDIA_COLS}, v.views FROM (
            SELECT a.media_id, a.media_type, COUNT(*) AS views
            FROM analytics_history a
            WHERE julianday(a.timestamp) >=
                  (SELECT julianday(MAX(timestamp)) FROM analytics_history) - {WINDOW_DAYS}"
    ));
    if let Some(media_type) = media_type {
        qb.push(" AND a.media_type = ")
            .push_bind(media_type.as_str().to_string());
    }
    qb.push(&format!(
        " GROUP BY a.media_id, a.media_type
         ) v
         JOIN media m ON m.id = v.media_id AND m.type = v.media_type
         {LABEL_JOINS}
         WHERE {VISIBLE}
         ORDER BY v.views DESC, m.id ASC
         LIMIT "
    ))
    .push_bind(limit);

    qb.query_all(conn, |row| {
        Ok(TopViewed {
            media: Media::from_row(row)?,
            views: row.get(15)?,
        })
    })
}
