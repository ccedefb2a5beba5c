//! Route handlers for the HTTP API.
//!
//! Query strings and path segments are taken as raw strings and parsed here,
//! so malformed input produces the JSON error body of [`AppError`] rather
//! than Axum's plain-text rejection.
//!
//! [`AppError`]: crate::error::AppError

pub mod analytics;
pub mod contents;
pub mod facets;
pub mod health;
pub mod related;
pub mod tv;

use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;
use vt_core::{Error, LabelInfo, MediaType, Result};
use vt_db::models::Media;

// ---------------------------------------------------------------------------
// Shared response types
// ---------------------------------------------------------------------------

/// A catalog entry as returned by every listing endpoint.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MediaResponse {
    pub id: i64,
    #[serde(rename = "type")]
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
    pub label_info: LabelInfo,
}

impl MediaResponse {
    pub fn from_model(media: &Media, today: NaiveDate) -> Self {
        Self {
            id: media.id,
            media_type: media.media_type,
            title: media.title.clone(),
            description: media.description.clone(),
            release_date: media.release_date.clone(),
            poster_url: media.poster_url.clone(),
            backdrop_url: media.backdrop_url.clone(),
            logo_url: media.logo_url.clone(),
            trailer_url: media.trailer_url.clone(),
            certification: media.certification.clone(),
            rating: media.rating,
            genre_ids: media.genre_ids.clone(),
            label_info: media.label(today).into(),
        }
    }

    pub fn list(media: &[Media], today: NaiveDate) -> Vec<Self> {
        media.iter().map(|m| Self::from_model(m, today)).collect()
    }
}

// ---------------------------------------------------------------------------
// Parameter parsing
// ---------------------------------------------------------------------------

/// Treat an empty query value the same as a missing one.
fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parse an optional numeric parameter, rejecting malformed values.
pub(crate) fn parse_opt<T: FromStr>(name: &str, value: Option<&str>) -> Result<Option<T>> {
    present(value)
        .map(|v| {
            v.parse()
                .map_err(|_| Error::validation(format!("Invalid {name}: {v}")))
        })
        .transpose()
}

/// Parse an optional float parameter that must be finite.
pub(crate) fn parse_finite(name: &str, value: Option<&str>) -> Result<Option<f64>> {
    match parse_opt::<f64>(name, value)? {
        Some(v) if !v.is_finite() => Err(Error::validation(format!("Invalid {name}: {v}"))),
        other => Ok(other),
    }
}

/// Parse an optional `type` parameter.
pub(crate) fn parse_type_opt(value: Option<&str>) -> Result<Option<MediaType>> {
    present(value).map(MediaType::from_str).transpose()
}

/// Parse the `{type}` and `{id}` path segments.
pub(crate) fn parse_target(media_type: &str, id: &str) -> Result<(MediaType, i64)> {
    let media_type = media_type.parse()?;
    let id = id
        .parse()
        .map_err(|_| Error::validation(format!("Invalid id: {id}")))?;
    Ok((media_type, id))
}

/// Parse a numeric path segment.
pub(crate) fn parse_segment(name: &str, value: &str) -> Result<i64> {
    value
        .parse()
        .map_err(|_| Error::validation(format!("Invalid {name}: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_are_absent() {
        assert_eq!(parse_opt::<i64>("year", Some("")).unwrap(), None);
        assert_eq!(parse_opt::<i64>("year", Some("  ")).unwrap(), None);
        assert_eq!(parse_opt::<i64>("year", None).unwrap(), None);
        assert_eq!(parse_opt::<i64>("year", Some("2020")).unwrap(), Some(2020));
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = parse_opt::<i64>("genreId", Some("abc")).unwrap_err();
        assert_eq!(err.http_status(), 400);
        assert_eq!(err.to_string(), "Invalid genreId: abc");
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        for raw in ["NaN", "inf", "-inf", "infinity"] {
            let err = parse_finite("rating", Some(raw)).unwrap_err();
            assert_eq!(err.http_status(), 400, "value {raw}");
        }
        assert_eq!(parse_finite("rating", Some("7.5")).unwrap(), Some(7.5));
        assert_eq!(parse_finite("rating", Some("")).unwrap(), None);
    }

    #[test]
    fn target_requires_exact_type() {
        assert_eq!(parse_target("tv", "7").unwrap(), (MediaType::Tv, 7));
        assert!(parse_target("TV", "7").is_err());
        assert!(parse_target("film", "7").is_err());
        assert!(parse_target("movie", "x").is_err());
        assert_eq!(parse_type_opt(Some("")).unwrap(), None);
        assert!(parse_type_opt(Some("anime")).is_err());
    }
}
