//! Filter facets: genres and release years.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use vt_db::queries::{contents, genres};

use crate::context::AppContext;
use crate::error::AppError;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct GenreResponse {
    pub id: i64,
    pub name: String,
}

/// GET /api/contents/genres
#[utoipa::path(
    get,
    path = "/api/contents/genres",
    responses(
        (status = 200, description = "All genres by name", body = Vec<GenreResponse>)
    )
)]
pub async fn list_genres(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<GenreResponse>>, AppError> {
    let rows = ctx.with_conn(genres::list_genres).await?;
    Ok(Json(
        rows.into_iter()
            .map(|g| GenreResponse { id: g.id, name: g.name })
            .collect(),
    ))
}

/// GET /api/contents/years
#[utoipa::path(
    get,
    path = "/api/contents/years",
    responses(
        (status = 200, description = "Distinct release years, ascending", body = Vec<i32>)
    )
)]
pub async fn list_years(State(ctx): State<AppContext>) -> Result<Json<Vec<i32>>, AppError> {
    Ok(Json(ctx.with_conn(contents::years).await?))
}
