//! View analytics: top-viewed lists and the legacy view-recording endpoint.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use vt_core::{Error, MediaType};
use vt_db::models::TopViewed;
use vt_db::queries::{analytics, media};

use super::MediaResponse;
use crate::context::AppContext;
use crate::error::AppError;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TopViewedResponse {
    #[serde(flatten)]
    pub media: MediaResponse,
    /// Views inside the seven-day window ending at the newest event.
    pub views: i64,
}

fn to_response(rows: &[TopViewed], today: chrono::NaiveDate) -> Vec<TopViewedResponse> {
    rows.iter()
        .map(|r| TopViewedResponse {
            media: MediaResponse::from_model(&r.media, today),
            views: r.views,
        })
        .collect()
}

/// GET /api/analytics
#[utoipa::path(
    get,
    path = "/api/analytics",
    responses(
        (status = 200, description = "Most viewed entries of any type", body = Vec<TopViewedResponse>)
    )
)]
pub async fn top_overall(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<TopViewedResponse>>, AppError> {
    let limit = i64::from(ctx.config.catalog.top_viewed_limit);
    let rows = ctx
        .with_conn(move |conn| analytics::top_viewed(conn, None, limit))
        .await?;
    Ok(Json(to_response(&rows, ctx.today())))
}

/// GET /api/analytics/top/{type}
#[utoipa::path(
    get,
    path = "/api/analytics/top/{type}",
    params(("type" = String, Path, description = "movie or tv")),
    responses(
        (status = 200, description = "Most viewed entries of the type", body = Vec<TopViewedResponse>),
        (status = 400, description = "Invalid type")
    )
)]
pub async fn top_by_type(
    State(ctx): State<AppContext>,
    Path(media_type): Path<String>,
) -> Result<Json<Vec<TopViewedResponse>>, AppError> {
    let media_type: MediaType = media_type.parse()?;
    let limit = i64::from(ctx.config.catalog.top_viewed_limit);
    let rows = ctx
        .with_conn(move |conn| analytics::top_viewed(conn, Some(media_type), limit))
        .await?;
    Ok(Json(to_response(&rows, ctx.today())))
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RecordViewRequest {
    pub id: i64,
    #[serde(rename = "type")]
    pub media_type: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /api/analytics
///
/// Deprecated; views are expected to come from the player backend.
#[utoipa::path(
    post,
    path = "/api/analytics",
    request_body = RecordViewRequest,
    responses(
        (status = 201, description = "View recorded", body = MessageResponse),
        (status = 400, description = "Invalid type"),
        (status = 404, description = "Unknown entry")
    )
)]
pub async fn record_view(
    State(ctx): State<AppContext>,
    Json(body): Json<RecordViewRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let media_type: MediaType = body.media_type.parse()?;
    let id = body.id;

    ctx.with_conn(move |conn| {
        if !media::media_exists(conn, media_type, id)? {
            return Err(Error::not_found("media", format!("{media_type}/{id}")));
        }
        analytics::record_view(conn, media_type, id, chrono::Utc::now())
    })
    .await?;

    tracing::debug!(media_type = %media_type, id, "View recorded");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Record inserito".into(),
        }),
    ))
}
