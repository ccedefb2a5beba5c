//! Catalog search with relevance ranking, pagination, suggestions, facets and
//! "latest" lists.
//!
//! The paginated search is split into [`count_contents`] and
//! [`search_contents`] so callers can run both concurrently on separate
//! connections. Both apply the same [`ContentFilter`] through one function,
//! which keeps the two predicates identical.

use chrono::NaiveDate;
use rusqlite::Connection;
use vt_core::text::SearchTerm;
use vt_core::{Error, MediaType, Result};

use super::{year_of, LABEL_JOINS, MEDIA_COLS, VISIBLE};
use crate::models::Media;
use crate::sql::QueryBuilder;

/// Largest accepted page size.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Minimum trimmed length of a suggestions query, in characters.
pub const SUGGESTION_MIN_CHARS: usize = 3;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Sort key selected by `orderby`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Date,
    Rating,
    Az,
    Relevance,
}

impl SortKey {
    /// Parse an `orderby` value. Unknown keys yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "date" => Some(Self::Date),
            "rating" => Some(Self::Rating),
            "az" => Some(Self::Az),
            "relevance" => Some(Self::Relevance),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// An explicit ordering request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub key: SortKey,
    pub dir: SortDir,
}

impl Sort {
    /// Alphabetical sorts default to ascending, everything else to descending.
    pub fn new(key: SortKey, dir: Option<SortDir>) -> Self {
        let default = match key {
            SortKey::Az => SortDir::Asc,
            _ => SortDir::Desc,
        };
        Self {
            key,
            dir: dir.unwrap_or(default),
        }
    }
}

/// Direction of the rating threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RatingDir {
    #[default]
    Gte,
    Lte,
}

impl RatingDir {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "gte" => Some(Self::Gte),
            "lte" => Some(Self::Lte),
            _ => None,
        }
    }
}

/// Structured filters shared by the count and data queries.
#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    pub search: Option<SearchTerm>,
    pub media_type: Option<MediaType>,
    pub genre_id: Option<i64>,
    pub year: Option<i32>,
    pub rating: Option<f64>,
    pub rating_dir: RatingDir,
}

/// A validated 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Reject `page < 1`, limits outside `1..=100` and pages whose offset
    /// would overflow.
    pub fn new(page: i64, limit: i64) -> Result<Self> {
        if page < 1 {
            return Err(Error::validation("page must be greater than or equal to 1"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(Error::validation(format!(
                "limit must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        if (page - 1).checked_mul(limit).is_none() {
            return Err(Error::validation("page is out of range"));
        }
        Ok(Self { page, limit })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Pagination summary returned with every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub items_on_page: i64,
    pub limit: i64,
    pub has_more: bool,
}

impl Pagination {
    pub fn new(request: &PageRequest, total_items: i64, items_on_page: usize) -> Self {
        let total_pages = (total_items + request.limit - 1) / request.limit;
        Self {
            current_page: request.page,
            total_pages,
            total_items,
            items_on_page: items_on_page as i64,
            limit: request.limit,
            has_more: request.page < total_pages,
        }
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Append `WHERE` with visibility and every active filter.
fn push_filters(qb: &mut QueryBuilder, filter: &ContentFilter) {
    qb.push(" WHERE ").push(VISIBLE);

    if let Some(ref term) = filter.search {
        qb.push(" AND instr(vt_normalize(m.title), ")
            .push_bind(term.normalized().to_string())
            .push(") > 0");
    }
    if let Some(media_type) = filter.media_type {
        qb.push(" AND m.type = ").push_bind(media_type.as_str().to_string());
    }
    if let Some(genre_id) = filter.genre_id {
        qb.push(" AND EXISTS (SELECT 1 FROM json_each(m.genre_ids) g WHERE g.value = ")
            .push_bind(genre_id)
            .push(")");
    }
    if let Some(year) = filter.year {
        qb.push(" AND ")
            .push(&year_of("m.release_date"))
            .push(" = ")
            .push_bind(year);
    }
    if let Some(rating) = filter.rating {
        let op = match filter.rating_dir {
            RatingDir::Gte => " AND m.rating >= ",
            RatingDir::Lte => " AND m.rating <= ",
        };
        qb.push(op).push_bind(rating);
    }
}

/// Total number of entries matching `filter`.
pub fn count_contents(conn: &Connection, filter: &ContentFilter) -> Result<i64> {
    let mut qb = QueryBuilder::new();
    qb.push("SELECT COUNT(*) FROM media m");
    push_filters(&mut qb, filter);
    qb.query_one(conn, |row| row.get(0))
}

/// One page of entries matching `filter`.
///
/// Without an explicit `sort`, a text search orders by relevance, then
/// rating, then title; a plain listing orders by release date.
pub fn search_contents(
    conn: &Connection,
    filter: &ContentFilter,
    sort: Option<Sort>,
    page: &PageRequest,
) -> Result<Vec<Media>> {
    let mut qb = QueryBuilder::new();
    let relevance = match filter.search {
        Some(ref term) => {
            let normalized = qb.bind(term.normalized().to_string());
            let raw = qb.bind(term.raw().to_string());
            format!("vt_relevance(m.title, {normalized}, {raw})")
        }
        None => "NULL".to_string(),
    };

    qb.push(&format!(
        "SELECT {MEDIA_COLS}, {relevance} AS relevance FROM media m {LABEL_JOINS}"
    ));
    push_filters(&mut qb, filter);
    qb.push(" ORDER BY ")
        .push(&order_by(filter.search.is_some(), sort))
        .push(" LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset());

    qb.query_all(conn, Media::from_row)
}

fn order_by(has_search: bool, sort: Option<Sort>) -> String {
    const BY_RELEVANCE: &str = "relevance DESC, m.rating DESC NULLS LAST, m.title ASC";

    let primary = match sort {
        None if has_search => BY_RELEVANCE.to_string(),
        None => "m.release_date DESC NULLS LAST".to_string(),
        Some(Sort {
            key: SortKey::Relevance,
            dir,
        }) if has_search => {
            format!("relevance {}, m.rating DESC NULLS LAST, m.title ASC", dir.sql())
        }
        Some(Sort {
            key: SortKey::Relevance,
            ..
        }) => "m.rating DESC NULLS LAST".to_string(),
        Some(Sort {
            key: SortKey::Date,
            dir,
        }) => format!("m.release_date {} NULLS LAST", dir.sql()),
        Some(Sort {
            key: SortKey::Rating,
            dir,
        }) => format!("m.rating {} NULLS LAST", dir.sql()),
        Some(Sort { key: SortKey::Az, dir }) => {
            format!("m.title COLLATE NOCASE {}", dir.sql())
        }
    };

    // Stable tiebreak so consecutive pages never overlap.
    format!("{primary}, m.id ASC, m.type ASC")
}

// ---------------------------------------------------------------------------
// Suggestions and facets
// ---------------------------------------------------------------------------

/// Up to `limit` visible entries whose title contains `input`, exact
/// matches first, then prefix matches, then by rating and title.
pub fn suggestions(conn: &Connection, input: &str, limit: i64) -> Result<Vec<Media>> {
    let trimmed = input.trim();
    if trimmed.chars().count() < SUGGESTION_MIN_CHARS {
        return Err(Error::validation("Inserisci più di tre caratteri."));
    }
    let term = SearchTerm::parse(trimmed)?;

    let mut qb = QueryBuilder::new();
    let normalized = qb.bind(term.normalized().to_string());
    let raw = qb.bind(term.raw().to_string());
    qb.push(&format!(
        "SELECT {MEDIA_COLS} FROM media m {LABEL_JOINS}
         WHERE {VISIBLE} AND instr(vt_normalize(m.title), {normalized}) > 0
         ORDER BY CASE vt_relevance(m.title, {normalized}, {raw})
                     WHEN 100 THEN 1 WHEN 90 THEN 2 ELSE 3 END,
                  m.rating DESC NULLS LAST, m.title ASC
         LIMIT "
    ))
    .push_bind(limit);

    qb.query_all(conn, Media::from_row)
}

/// Distinct release years of streamable entries, ascending.
pub fn years(conn: &Connection) -> Result<Vec<i32>> {
    let mut qb = QueryBuilder::new();
    qb.push(&format!(
        "SELECT DISTINCT {year} AS year FROM media m
         WHERE m.streamable = 1 AND {year} IS NOT NULL
         ORDER BY year ASC",
        year = year_of("m.release_date")
    ));
    qb.query_all(conn, |row| row.get(0))
}

// ---------------------------------------------------------------------------
// Latest
// ---------------------------------------------------------------------------

/// Visible entries released, or with a streamable season released, on or
/// after `since`; newest first by the later of those dates.
pub fn latest(conn: &Connection, since: NaiveDate, limit: i64) -> Result<Vec<Media>> {
    let mut qb = QueryBuilder::new();
    let since = qb.bind(since.format("%Y-%m-%d").to_string());
    qb.push(&format!(
        "SELECT {MEDIA_COLS} FROM media m {LABEL_JOINS}
         WHERE {VISIBLE}
           AND (m.release_date >= {since}
                OR EXISTS (SELECT 1 FROM tv_seasons s
                           WHERE m.type = 'tv' AND s.media_id = m.id
                             AND s.streamable = 1 AND s.release_date >= {since}))
         ORDER BY COALESCE(ls.latest_season_date, m.release_date) DESC, m.id ASC
         LIMIT "
    ))
    .push_bind(limit);

    qb.query_all(conn, Media::from_row)
}

/// Newest entries of one type, optionally restricted to a genre.
///
/// Series are ordered by their latest streamable season, movies by release
/// date; rating breaks ties in both cases.
pub fn latest_by_type(
    conn: &Connection,
    media_type: MediaType,
    genre_id: Option<i64>,
    limit: i64,
) -> Result<Vec<Media>> {
    let filter = ContentFilter {
        media_type: Some(media_type),
        genre_id,
        ..Default::default()
    };

    let mut qb = QueryBuilder::new();
    qb.push(&format!("SELECT {MEDIA_COLS} FROM media m {LABEL_JOINS}"));
    push_filters(&mut qb, &filter);
    let order = match media_type {
        MediaType::Tv => "ls.latest_season_date DESC NULLS LAST",
        MediaType::Movie => "m.release_date DESC NULLS LAST",
    };
    qb.push(&format!(
        " ORDER BY {order}, m.rating DESC NULLS LAST, m.id ASC LIMIT "
    ))
    .push_bind(limit);

    qb.query_all(conn, Media::from_row)
}
