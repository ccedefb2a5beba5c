//! Catalog domain enums: content type and "new content" labels.
//!
//! Enums serialize in lowercase and implement `Display` manually for a
//! consistent string representation in SQL parameters and URLs.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::Error;

// ---------------------------------------------------------------------------
// MediaType
// ---------------------------------------------------------------------------

/// Content type discriminant of a catalog entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = Error;

    /// Strict parse: only the exact strings `movie` and `tv` are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(Self::Movie),
            "tv" => Ok(Self::Tv),
            _ => Err(Error::validation(
                "Type parameter must be either \"tv\" or \"movie\"",
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Label
// ---------------------------------------------------------------------------

/// Days a TV series' own release date counts as a new release.
pub const TV_RELEASE_WINDOW_DAYS: i64 = 14;
/// Days a movie's release date counts as a new release.
pub const MOVIE_RELEASE_WINDOW_DAYS: i64 = 7;
/// Days the latest streamable season counts as new.
pub const SEASON_WINDOW_DAYS: i64 = 14;
/// Days the latest streamable episode counts as new.
pub const EPISODE_WINDOW_DAYS: i64 = 7;

/// "New content" classification of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    NewRelease,
    NewSeason,
    NewEpisode,
    None,
}

/// Release dates that feed label classification.
///
/// `latest_season` and `latest_episode` only consider streamable seasons and
/// episodes; they are always `None` for movies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelDates {
    pub release: Option<NaiveDate>,
    pub latest_season: Option<NaiveDate>,
    pub latest_episode: Option<NaiveDate>,
}

impl Label {
    /// Classify an entry relative to `today`. First match wins: own release,
    /// then latest season, then latest episode. Movies only check release.
    pub fn classify(media_type: MediaType, dates: &LabelDates, today: NaiveDate) -> Self {
        match media_type {
            MediaType::Movie => {
                if within(dates.release, today, MOVIE_RELEASE_WINDOW_DAYS) {
                    Self::NewRelease
                } else {
                    Self::None
                }
            }
            MediaType::Tv => {
                if within(dates.release, today, TV_RELEASE_WINDOW_DAYS) {
                    Self::NewRelease
                } else if within(dates.latest_season, today, SEASON_WINDOW_DAYS) {
                    Self::NewSeason
                } else if within(dates.latest_episode, today, EPISODE_WINDOW_DAYS) {
                    Self::NewEpisode
                } else {
                    Self::None
                }
            }
        }
    }

    /// Display text shown on the card badge.
    pub fn text(&self) -> Option<&'static str> {
        match self {
            Self::NewRelease => Some("Nuova uscita"),
            Self::NewSeason => Some("Nuova stagione"),
            Self::NewEpisode => Some("Nuovo episodio"),
            Self::None => None,
        }
    }
}

/// `date` falls in `[today - days, today]`.
fn within(date: Option<NaiveDate>, today: NaiveDate, days: i64) -> bool {
    match date {
        Some(d) => d <= today && d >= today - Duration::days(days),
        None => false,
    }
}

/// Wire form of a [`Label`]: `{"label": true, "text": ...}` or `{"label": false}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LabelInfo {
    pub label: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl From<Label> for LabelInfo {
    fn from(label: Label) -> Self {
        match label.text() {
            Some(text) => Self {
                label: true,
                text: Some(text.to_string()),
            },
            None => Self {
                label: false,
                text: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn today() -> NaiveDate {
        day("2024-06-15")
    }

    #[test]
    fn media_type_parse_is_strict() {
        assert_eq!("movie".parse::<MediaType>().unwrap(), MediaType::Movie);
        assert_eq!("tv".parse::<MediaType>().unwrap(), MediaType::Tv);
        assert!("TV".parse::<MediaType>().is_err());
        assert!("series".parse::<MediaType>().is_err());
        let err = "".parse::<MediaType>().unwrap_err();
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn media_type_serde_lowercase() {
        assert_eq!(serde_json::to_string(&MediaType::Tv).unwrap(), "\"tv\"");
        assert_eq!(MediaType::Movie.to_string(), "movie");
    }

    #[test]
    fn movie_release_window_is_seven_days() {
        let dates = |r| LabelDates {
            release: Some(day(r)),
            ..Default::default()
        };
        assert_eq!(
            Label::classify(MediaType::Movie, &dates("2024-06-08"), today()),
            Label::NewRelease
        );
        assert_eq!(
            Label::classify(MediaType::Movie, &dates("2024-06-07"), today()),
            Label::None
        );
        assert_eq!(
            Label::classify(MediaType::Movie, &dates("2024-06-15"), today()),
            Label::NewRelease
        );
    }

    #[test]
    fn future_release_is_not_new() {
        let dates = LabelDates {
            release: Some(day("2024-06-16")),
            ..Default::default()
        };
        assert_eq!(Label::classify(MediaType::Movie, &dates, today()), Label::None);
    }

    #[test]
    fn movies_ignore_season_and_episode_dates() {
        let dates = LabelDates {
            release: Some(day("2020-01-01")),
            latest_season: Some(today()),
            latest_episode: Some(today()),
        };
        assert_eq!(Label::classify(MediaType::Movie, &dates, today()), Label::None);
    }

    #[test]
    fn tv_release_takes_priority_over_season() {
        let dates = LabelDates {
            release: Some(day("2024-06-01")),
            latest_season: Some(day("2024-06-14")),
            latest_episode: Some(day("2024-06-15")),
        };
        assert_eq!(
            Label::classify(MediaType::Tv, &dates, today()),
            Label::NewRelease
        );
    }

    #[test]
    fn tv_season_then_episode() {
        let season = LabelDates {
            release: Some(day("2019-01-01")),
            latest_season: Some(day("2024-06-01")),
            latest_episode: Some(day("2024-06-15")),
        };
        assert_eq!(
            Label::classify(MediaType::Tv, &season, today()),
            Label::NewSeason
        );

        let episode = LabelDates {
            release: Some(day("2019-01-01")),
            latest_season: Some(day("2024-05-31")),
            latest_episode: Some(day("2024-06-08")),
        };
        assert_eq!(
            Label::classify(MediaType::Tv, &episode, today()),
            Label::NewEpisode
        );

        let stale = LabelDates {
            latest_episode: Some(day("2024-06-07")),
            ..episode
        };
        assert_eq!(Label::classify(MediaType::Tv, &stale, today()), Label::None);
    }

    #[test]
    fn label_info_wire_shape() {
        let on = serde_json::to_value(LabelInfo::from(Label::NewSeason)).unwrap();
        assert_eq!(on, serde_json::json!({"label": true, "text": "Nuova stagione"}));

        let off = serde_json::to_value(LabelInfo::from(Label::None)).unwrap();
        assert_eq!(off, serde_json::json!({"label": false}));
    }
}
