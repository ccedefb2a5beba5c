//! TV structure handlers: seasons, episodes and next-episode navigation.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use vt_core::{Error, MediaType};
use vt_db::models::{Episode, Season};
use vt_db::queries::tv;

use super::{parse_segment, parse_target};
use crate::context::AppContext;
use crate::error::AppError;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SeasonResponse {
    pub id: i64,
    pub media_id: i64,
    pub season_number: i64,
    pub description: Option<String>,
    pub number_of_episodes: Option<i64>,
    pub release_date: Option<String>,
}

impl From<Season> for SeasonResponse {
    fn from(s: Season) -> Self {
        Self {
            id: s.id,
            media_id: s.media_id,
            season_number: s.season_number,
            description: s.description,
            number_of_episodes: s.number_of_episodes,
            release_date: s.release_date,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct EpisodeResponse {
    pub id: i64,
    pub media_id: i64,
    pub season_id: i64,
    pub season_number: i64,
    pub episode_number: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Runtime in minutes.
    pub duration: Option<i64>,
    pub still_url: Option<String>,
    pub release_date: Option<String>,
    /// Series title; only set on single-episode lookups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_title: Option<String>,
}

impl EpisodeResponse {
    fn from_model(e: Episode, media_title: Option<String>) -> Self {
        Self {
            id: e.id,
            media_id: e.media_id,
            season_id: e.season_id,
            season_number: e.season_number,
            episode_number: e.episode_number,
            title: e.title,
            description: e.description,
            duration: e.duration,
            still_url: e.still_url,
            release_date: e.release_date,
            media_title,
        }
    }
}

/// Parse `{type}/{id}` and require a series.
fn series_id(media_type: &str, id: &str) -> vt_core::Result<i64> {
    match parse_target(media_type, id)? {
        (MediaType::Tv, id) => Ok(id),
        (MediaType::Movie, _) => Err(Error::validation("Invalid type")),
    }
}

/// GET /api/contents/{type}/{id}/seasons
#[utoipa::path(
    get,
    path = "/api/contents/{type}/{id}/seasons",
    params(
        ("type" = String, Path, description = "Must be tv"),
        ("id" = i64, Path, description = "Series ID")
    ),
    responses(
        (status = 200, description = "Streamable seasons", body = Vec<SeasonResponse>),
        (status = 400, description = "Invalid type")
    )
)]
pub async fn list_seasons(
    State(ctx): State<AppContext>,
    Path((media_type, id)): Path<(String, String)>,
) -> Result<Json<Vec<SeasonResponse>>, AppError> {
    let id = series_id(&media_type, &id)?;
    let seasons = ctx.with_conn(move |conn| tv::list_seasons(conn, id)).await?;
    Ok(Json(seasons.into_iter().map(SeasonResponse::from).collect()))
}

/// GET /api/contents/{type}/{id}/episodes/{season}
#[utoipa::path(
    get,
    path = "/api/contents/{type}/{id}/episodes/{season}",
    params(
        ("type" = String, Path, description = "Must be tv"),
        ("id" = i64, Path, description = "Series ID"),
        ("season" = i64, Path, description = "Season number")
    ),
    responses(
        (status = 200, description = "Streamable episodes of the season", body = Vec<EpisodeResponse>),
        (status = 400, description = "Invalid type or season")
    )
)]
pub async fn list_episodes(
    State(ctx): State<AppContext>,
    Path((media_type, id, season)): Path<(String, String, String)>,
) -> Result<Json<Vec<EpisodeResponse>>, AppError> {
    let id = series_id(&media_type, &id)?;
    let season = parse_segment("season", &season)?;

    let episodes = ctx
        .with_conn(move |conn| tv::list_episodes(conn, id, season))
        .await?;
    Ok(Json(
        episodes
            .into_iter()
            .map(|e| EpisodeResponse::from_model(e, None))
            .collect(),
    ))
}

/// GET /api/contents/{type}/{id}/episode/{season}/{episode}
#[utoipa::path(
    get,
    path = "/api/contents/{type}/{id}/episode/{season}/{episode}",
    params(
        ("type" = String, Path, description = "Must be tv"),
        ("id" = i64, Path, description = "Series ID"),
        ("season" = i64, Path, description = "Season number"),
        ("episode" = i64, Path, description = "Episode number")
    ),
    responses(
        (status = 200, description = "Episode with series title", body = EpisodeResponse),
        (status = 400, description = "Invalid type, season or episode"),
        (status = 404, description = "Episode not found")
    )
)]
pub async fn get_episode(
    State(ctx): State<AppContext>,
    Path((media_type, id, season, episode)): Path<(String, String, String, String)>,
) -> Result<Json<EpisodeResponse>, AppError> {
    let id = series_id(&media_type, &id)?;
    let season = parse_segment("season", &season)?;
    let episode = parse_segment("episode", &episode)?;

    let (found, title) = ctx
        .with_conn(move |conn| tv::get_episode(conn, id, season, episode))
        .await?
        .ok_or_else(|| Error::not_found("episode", format!("tv/{id} S{season}E{episode}")))?;
    Ok(Json(EpisodeResponse::from_model(found, Some(title))))
}

/// GET /api/contents/{type}/{id}/next-episode/{season}/{episode}
#[utoipa::path(
    get,
    path = "/api/contents/{type}/{id}/next-episode/{season}/{episode}",
    params(
        ("type" = String, Path, description = "Must be tv"),
        ("id" = i64, Path, description = "Series ID"),
        ("season" = i64, Path, description = "Current season number"),
        ("episode" = i64, Path, description = "Current episode number")
    ),
    responses(
        (status = 200, description = "The following episode", body = EpisodeResponse),
        (status = 400, description = "Invalid type, season or episode"),
        (status = 404, description = "No following episode")
    )
)]
pub async fn next_episode(
    State(ctx): State<AppContext>,
    Path((media_type, id, season, episode)): Path<(String, String, String, String)>,
) -> Result<Json<EpisodeResponse>, AppError> {
    let id = series_id(&media_type, &id)?;
    let season = parse_segment("season", &season)?;
    let episode = parse_segment("episode", &episode)?;

    let next = ctx
        .with_conn(move |conn| tv::next_episode(conn, id, season, episode))
        .await?
        .ok_or_else(|| {
            Error::not_found("episode", format!("tv/{id} after S{season}E{episode}"))
        })?;
    Ok(Json(EpisodeResponse::from_model(next, None)))
}
