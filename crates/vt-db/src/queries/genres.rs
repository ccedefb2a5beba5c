//! Genre facet.

use rusqlite::Connection;
use vt_core::{Error, Result};

use crate::models::Genre;

/// All genres ordered by name.
pub fn list_genres(conn: &Connection) -> Result<Vec<Genre>> {
    let mut stmt = conn
        .prepare("SELECT id, name FROM genres ORDER BY name COLLATE NOCASE, id")
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], Genre::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}
