//! Related-content handler.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use vt_db::queries::contents::MAX_PAGE_SIZE;
use vt_db::queries::related;

use super::{parse_opt, parse_target, MediaResponse};
use crate::context::AppContext;
use crate::error::AppError;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct RelatedParams {
    /// Maximum number of results, clamped to 1..=100.
    pub limit: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RelatedResponse {
    #[serde(flatten)]
    pub media: MediaResponse,
    /// Fallback tier that produced this entry (1, 2 or 3).
    pub tier: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
}

/// GET /api/contents/correlati/{type}/{id}
#[utoipa::path(
    get,
    path = "/api/contents/correlati/{type}/{id}",
    params(
        ("type" = String, Path, description = "movie or tv"),
        ("id" = i64, Path, description = "Target entry ID"),
        RelatedParams
    ),
    responses(
        (status = 200, description = "Related entries, best first", body = Vec<RelatedResponse>),
        (status = 400, description = "Invalid type, id or limit")
    )
)]
pub async fn list_related(
    State(ctx): State<AppContext>,
    Path((media_type, id)): Path<(String, String)>,
    Query(params): Query<RelatedParams>,
) -> Result<Json<Vec<RelatedResponse>>, AppError> {
    let (media_type, id) = parse_target(&media_type, &id)?;
    let limit = parse_opt("limit", params.limit.as_deref())?
        .unwrap_or(i64::from(ctx.config.catalog.related_default_limit))
        .clamp(1, MAX_PAGE_SIZE);

    let rows = ctx
        .with_conn(move |conn| related::related(conn, media_type, id, limit))
        .await?;

    let today = ctx.today();
    Ok(Json(
        rows.iter()
            .map(|r| RelatedResponse {
                media: MediaResponse::from_model(&r.media, today),
                tier: r.tier,
                similarity_score: r.similarity_score,
            })
            .collect(),
    ))
}
