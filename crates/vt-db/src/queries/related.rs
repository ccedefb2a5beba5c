//! Related-content recommendations with three-tier fallback.
//!
//! Tier 1 scores candidates that share genres and have a close rating.
//! Tier 2 runs only when tier 1 is empty and drops the genre requirement.
//! Tier 3 runs only when tier 2 is empty and returns the best-rated titles
//! of the same type. The target itself is never returned.
//!
//! Scoring uses `COALESCE(rating, 0)` while eligibility excludes null
//! ratings; both are kept as-is.

use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension};
use vt_core::{Error, MediaType, Result};

use super::{year_of, LABEL_JOINS, MEDIA_COLS, VISIBLE};
use crate::models::Media;
use crate::sql::QueryBuilder;

/// Maximum rating distance accepted by tier 1.
pub const TIER1_MAX_RATING_DISTANCE: f64 = 2.5;
/// Maximum rating distance accepted by tier 2.
pub const TIER2_MAX_RATING_DISTANCE: f64 = 2.0;
/// Minimum rating accepted by tier 3.
pub const TIER3_MIN_RATING: f64 = 7.0;

pub const GENRE_WEIGHT: f64 = 0.5;
pub const RATING_WEIGHT: f64 = 0.3;
pub const TEMPORAL_WEIGHT: f64 = 0.2;
pub const MIN_GENRE_SIMILARITY: f64 = 0.3;
pub const MIN_RATING_SIMILARITY: f64 = 0.7;

/// A recommended entry and the tier that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Related {
    pub media: Media,
    pub tier: u8,
    /// Composite score; only tier 1 computes one.
    pub similarity_score: Option<f64>,
}

/// Attributes of the target used by the tiers.
#[derive(Debug)]
struct Target {
    genre_ids: String,
    genre_count: i64,
    rating: Option<f64>,
    release_year: Option<i64>,
}

fn load_target(conn: &Connection, media_type: MediaType, id: i64) -> Result<Option<Target>> {
    let q = format!(
        "SELECT genre_ids, json_array_length(genre_ids), rating, {year}
         FROM media WHERE id = ?1 AND type = ?2 AND streamable = 1",
        year = year_of("release_date")
    );
    conn.query_row(&q, rusqlite::params![id, media_type.as_str()], |row| {
        Ok(Target {
            genre_ids: row.get(0)?,
            genre_count: row.get(1)?,
            rating: row.get(2)?,
            release_year: row.get(3)?,
        })
    })
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// Up to `limit` entries related to `(media_type, id)`, best first.
///
/// Returns an empty list when the target is unknown or not streamable.
pub fn related(
    conn: &Connection,
    media_type: MediaType,
    id: i64,
    limit: i64,
) -> Result<Vec<Related>> {
    let Some(target) = load_target(conn, media_type, id)? else {
        return Ok(Vec::new());
    };

    // Tiers 1 and 2 need a target rating to measure distance against.
    if let Some(rating) = target.rating {
        let rows = genre_tier(conn, media_type, id, &target, rating, limit)?;
        if !rows.is_empty() {
            return Ok(rows);
        }
        tracing::debug!(media_type = %media_type, id, "Related tier 1 empty, falling back");

        let rows = rating_tier(conn, media_type, id, rating, limit)?;
        if !rows.is_empty() {
            return Ok(rows);
        }
        tracing::debug!(media_type = %media_type, id, "Related tier 2 empty, falling back");
    }

    top_rated_tier(conn, media_type, id, limit)
}

/// Candidate predicate shared by all tiers.
fn push_candidates(qb: &mut QueryBuilder, media_type: MediaType, id: i64) {
    qb.push(" WHERE ")
        .push(VISIBLE)
        .push(" AND m.type = ")
        .push_bind(media_type.as_str().to_string())
        .push(" AND m.id <> ")
        .push_bind(id)
        .push(" AND m.rating IS NOT NULL");
}

fn genre_tier(
    conn: &Connection,
    media_type: MediaType,
    id: i64,
    target: &Target,
    target_rating: f64,
    limit: i64,
) -> Result<Vec<Related>> {
    let mut qb = QueryBuilder::new();
    let genres = qb.bind(target.genre_ids.clone());
    let genre_count = qb.bind(target.genre_count);
    let rating = qb.bind(target_rating);
    let year = qb.bind(Value::from(target.release_year));

    let shared = format!(
        "(SELECT COUNT(*) FROM json_each(m.genre_ids) cg
          WHERE cg.value IN (SELECT tg.value FROM json_each({genres}) tg))"
    );
    let distance = format!("ABS(COALESCE(m.rating, 0) - {rating})");
    let candidate_year = year_of("m.release_date");

    qb.push(&format!(
        "SELECT *,
            {GENRE_WEIGHT} * genre_similarity
              + {RATING_WEIGHT} * rating_similarity
              + {TEMPORAL_WEIGHT} * temporal_similarity AS similarity_score
         FROM (
            SELECT {MEDIA_COLS},
                {shared} AS shared_genres,
                CAST({shared} AS REAL) / MAX(1, {genre_count}) AS genre_similarity,
                1.0 - {distance} / 10.0 AS rating_similarity,
                COALESCE(1.0 - MIN(1.0, ABS({candidate_year} - {year}) / 10.0), 0.0)
                    AS temporal_similarity
            FROM media m {LABEL_JOINS}"
    ));
    push_candidates(&mut qb, media_type, id);
    qb.push(&format!(
        " AND {distance} <= {TIER1_MAX_RATING_DISTANCE}
         ) c
         WHERE shared_genres > 0
           AND genre_similarity >= {MIN_GENRE_SIMILARITY}
           AND rating_similarity >= {MIN_RATING_SIMILARITY}
         ORDER BY similarity_score DESC, shared_genres DESC,
                  rating DESC, id ASC
         LIMIT "
    ))
    .push_bind(limit);

    qb.query_all(conn, |row| {
        Ok(Related {
            media: Media::from_row(row)?,
            tier: 1,
            similarity_score: row.get("similarity_score")?,
        })
    })
}

fn rating_tier(
    conn: &Connection,
    media_type: MediaType,
    id: i64,
    target_rating: f64,
    limit: i64,
) -> Result<Vec<Related>> {
    let mut qb = QueryBuilder::new();
    let rating = qb.bind(target_rating);
    let distance = format!("ABS(COALESCE(m.rating, 0) - {rating})");

    qb.push(&format!("SELECT {MEDIA_COLS} FROM media m {LABEL_JOINS}"));
    push_candidates(&mut qb, media_type, id);
    qb.push(&format!(
        " AND {distance} <= {TIER2_MAX_RATING_DISTANCE}
         ORDER BY (1.0 - {distance} / 10.0) DESC, m.rating DESC,
                  m.release_date DESC NULLS LAST, m.id ASC
         LIMIT "
    ))
    .push_bind(limit);

    qb.query_all(conn, |row| {
        Ok(Related {
            media: Media::from_row(row)?,
            tier: 2,
            similarity_score: None,
        })
    })
}

fn top_rated_tier(
    conn: &Connection,
    media_type: MediaType,
    id: i64,
    limit: i64,
) -> Result<Vec<Related>> {
    let mut qb = QueryBuilder::new();
    qb.push(&format!("SELECT {MEDIA_COLS} FROM media m {LABEL_JOINS}"));
    push_candidates(&mut qb, media_type, id);
    qb.push(" AND m.rating >= ")
        .push_bind(TIER3_MIN_RATING)
        .push(" ORDER BY m.rating DESC, m.release_date DESC NULLS LAST, m.id ASC LIMIT ")
        .push_bind(limit);

    qb.query_all(conn, |row| {
        Ok(Related {
            media: Media::from_row(row)?,
            tier: 3,
            similarity_score: None,
        })
    })
}
