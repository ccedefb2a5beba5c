//! Rust structs mapping to database rows.
//!
//! Each model implements `from_row` for constructing itself from a
//! `rusqlite::Row` whose columns follow the matching `*_COLS` constant in
//! [`crate::queries`].

use chrono::NaiveDate;
use rusqlite::types::Type;
use vt_core::{Label, LabelDates, MediaType};

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

fn parse_media_type(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<MediaType> {
    let s: String = row.get(idx)?;
    s.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_genre_ids(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Vec<i64>> {
    let s: String = row.get(idx)?;
    serde_json::from_str(&s)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Parse the date part of an ISO date or timestamp column value.
pub fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?;
    let day = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

/// A catalog entry together with the dates its label is derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct Media {
    pub id: i64,
    pub media_type: MediaType,
    pub title: String,
    pub description: Option<String>,
    pub release_date: Option<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub logo_url: Option<String>,
    pub trailer_url: Option<String>,
    pub certification: Option<String>,
    pub rating: Option<f64>,
    pub genre_ids: Vec<i64>,
    pub streamable: bool,
    /// Most recent release date among streamable seasons (TV only).
    pub latest_season_date: Option<String>,
    /// Most recent release date among streamable episodes of streamable seasons.
    pub latest_episode_date: Option<String>,
}

impl Media {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            media_type: parse_media_type(row, 1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            release_date: row.get(4)?,
            poster_url: row.get(5)?,
            backdrop_url: row.get(6)?,
            logo_url: row.get(7)?,
            trailer_url: row.get(8)?,
            certification: row.get(9)?,
            rating: row.get(10)?,
            genre_ids: parse_genre_ids(row, 11)?,
            streamable: row.get(12)?,
            latest_season_date: row.get(13)?,
            latest_episode_date: row.get(14)?,
        })
    }

    pub fn label_dates(&self) -> LabelDates {
        LabelDates {
            release: parse_date(self.release_date.as_deref()),
            latest_season: parse_date(self.latest_season_date.as_deref()),
            latest_episode: parse_date(self.latest_episode_date.as_deref()),
        }
    }

    /// Label of this entry as of `today`.
    pub fn label(&self, today: NaiveDate) -> Label {
        Label::classify(self.media_type, &self.label_dates(), today)
    }
}

/// Fields written by the ingestion process.
#[derive(Debug, Clone)]
pub struct NewMedia {
    pub id: i64,
    pub media_type: MediaType,
    pub title: String,
    pub description: Option<String>,
    pub release_date: Option<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub logo_url: Option<String>,
    pub trailer_url: Option<String>,
    pub certification: Option<String>,
    pub rating: Option<f64>,
    pub genre_ids: Vec<i64>,
    pub streamable: bool,
}

impl NewMedia {
    /// A streamable entry with only the required fields set.
    pub fn new(id: i64, media_type: MediaType, title: impl Into<String>) -> Self {
        Self {
            id,
            media_type,
            title: title.into(),
            description: None,
            release_date: None,
            poster_url: None,
            backdrop_url: None,
            logo_url: None,
            trailer_url: None,
            certification: None,
            rating: None,
            genre_ids: Vec::new(),
            streamable: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Genre
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

impl Genre {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Season
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Season {
    pub id: i64,
    pub media_id: i64,
    pub season_number: i64,
    pub description: Option<String>,
    pub number_of_episodes: Option<i64>,
    pub release_date: Option<String>,
    pub streamable: bool,
}

impl Season {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            media_id: row.get(1)?,
            season_number: row.get(2)?,
            description: row.get(3)?,
            number_of_episodes: row.get(4)?,
            release_date: row.get(5)?,
            streamable: row.get(6)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Episode
// ---------------------------------------------------------------------------

/// An episode joined with its season's coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    pub id: i64,
    pub season_id: i64,
    pub media_id: i64,
    pub season_number: i64,
    pub episode_number: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration: Option<i64>,
    pub still_url: Option<String>,
    pub release_date: Option<String>,
    pub streamable: bool,
}

impl Episode {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            season_id: row.get(1)?,
            media_id: row.get(2)?,
            season_number: row.get(3)?,
            episode_number: row.get(4)?,
            title: row.get(5)?,
            description: row.get(6)?,
            duration: row.get(7)?,
            still_url: row.get(8)?,
            release_date: row.get(9)?,
            streamable: row.get(10)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// A catalog entry with its view count inside the analytics window.
#[derive(Debug, Clone, PartialEq)]
pub struct TopViewed {
    pub media: Media,
    pub views: i64,
}
