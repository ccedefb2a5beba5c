//! Catalog search, detail, labels, suggestions and latest-list handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use vt_core::text::SearchTerm;
use vt_core::{Error, Label, LabelInfo, MediaType};
use vt_db::queries::contents::{
    self, ContentFilter, PageRequest, Pagination, RatingDir, Sort, SortDir, SortKey,
};
use vt_db::queries::media;

use super::{parse_finite, parse_opt, parse_target, parse_type_opt, MediaResponse};
use crate::context::AppContext;
use crate::error::AppError;

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/contents`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct ContentsParams {
    /// Free-text title search; must not be blank when present.
    pub search: Option<String>,
    /// `movie` or `tv`.
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    #[serde(rename = "genreId")]
    pub genre_id: Option<String>,
    pub year: Option<String>,
    pub rating: Option<String>,
    /// `gte` (default) or `lte`.
    pub rating_dir: Option<String>,
    /// `date`, `rating`, `az` or `relevance`.
    pub orderby: Option<String>,
    /// `asc` or `desc`.
    pub order_dir: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResponse {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub items_on_page: i64,
    pub limit: i64,
    pub has_more: bool,
}

impl From<Pagination> for PaginationResponse {
    fn from(p: Pagination) -> Self {
        Self {
            current_page: p.current_page,
            total_pages: p.total_pages,
            total_items: p.total_items,
            items_on_page: p.items_on_page,
            limit: p.limit,
            has_more: p.has_more,
        }
    }
}

/// Echo of the active text search.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchInfo {
    pub query: String,
    pub normalized_query: String,
    pub total_results: i64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentsResponse {
    pub data: Vec<MediaResponse>,
    pub pagination: PaginationResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_info: Option<SearchInfo>,
}

/// Turn raw parameters into a filter, sort and page request.
fn parse_contents(
    params: &ContentsParams,
    ctx: &AppContext,
) -> vt_core::Result<(ContentFilter, Option<Sort>, PageRequest)> {
    let search = params
        .search
        .as_deref()
        .map(SearchTerm::parse)
        .transpose()?;

    let filter = ContentFilter {
        search,
        media_type: parse_type_opt(params.media_type.as_deref())?,
        genre_id: parse_opt("genreId", params.genre_id.as_deref())?,
        year: parse_opt("year", params.year.as_deref())?,
        rating: parse_finite("rating", params.rating.as_deref())?,
        rating_dir: params
            .rating_dir
            .as_deref()
            .and_then(RatingDir::parse)
            .unwrap_or_default(),
    };

    // Unknown sort keys fall back to the default ordering.
    let sort = params.orderby.as_deref().and_then(SortKey::parse).map(|key| {
        Sort::new(key, params.order_dir.as_deref().and_then(SortDir::parse))
    });

    let catalog = &ctx.config.catalog;
    let page = parse_opt("page", params.page.as_deref())?.unwrap_or(1);
    let limit = parse_opt("limit", params.limit.as_deref())?
        .unwrap_or(i64::from(catalog.default_page_size));
    let request = PageRequest::new(page, limit)?;
    if request.limit > i64::from(catalog.max_page_size) {
        return Err(Error::validation(format!(
            "limit must be between 1 and {}",
            catalog.max_page_size
        )));
    }

    Ok((filter, sort, request))
}

/// GET /api/contents
#[utoipa::path(
    get,
    path = "/api/contents",
    params(ContentsParams),
    responses(
        (status = 200, description = "One page of matching entries", body = ContentsResponse),
        (status = 400, description = "Invalid pagination, filter or empty search")
    )
)]
pub async fn list_contents(
    State(ctx): State<AppContext>,
    Query(params): Query<ContentsParams>,
) -> Result<Json<ContentsResponse>, AppError> {
    let (filter, sort, request) = parse_contents(&params, &ctx)?;

    let count_filter = filter.clone();
    let data_filter = filter.clone();
    let (total, rows) = tokio::try_join!(
        ctx.with_conn(move |conn| contents::count_contents(conn, &count_filter)),
        ctx.with_conn(move |conn| contents::search_contents(conn, &data_filter, sort, &request)),
    )?;

    tracing::debug!(
        total,
        page = request.page,
        returned = rows.len(),
        search = ?filter.search.as_ref().map(|s| s.raw()),
        "Contents listed"
    );

    let today = ctx.today();
    let pagination = Pagination::new(&request, total, rows.len());
    let search_info = filter.search.map(|term| SearchInfo {
        query: term.raw().to_string(),
        normalized_query: term.normalized().to_string(),
        total_results: total,
    });

    Ok(Json(ContentsResponse {
        data: MediaResponse::list(&rows, today),
        pagination: pagination.into(),
        search_info,
    }))
}

// ---------------------------------------------------------------------------
// Detail and labels
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ContentDetailResponse {
    #[serde(flatten)]
    pub media: MediaResponse,
    /// Genre names in the order of `genre_ids`.
    pub genres_array: Vec<String>,
}

/// GET /api/contents/{type}/{id}
#[utoipa::path(
    get,
    path = "/api/contents/{type}/{id}",
    params(
        ("type" = String, Path, description = "movie or tv"),
        ("id" = i64, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Entry detail", body = ContentDetailResponse),
        (status = 400, description = "Invalid type"),
        (status = 404, description = "Entry not found")
    )
)]
pub async fn get_content(
    State(ctx): State<AppContext>,
    Path((media_type, id)): Path<(String, String)>,
) -> Result<Json<ContentDetailResponse>, AppError> {
    let (media_type, id) = parse_target(&media_type, &id)?;

    let (entry, genres) = ctx
        .with_conn(move |conn| {
            let entry = media::get_media(conn, media_type, id)?
                .ok_or_else(|| Error::not_found("media", format!("{media_type}/{id}")))?;
            let genres = media::genre_names(conn, &entry.genre_ids)?;
            Ok((entry, genres))
        })
        .await?;

    Ok(Json(ContentDetailResponse {
        media: MediaResponse::from_model(&entry, ctx.today()),
        genres_array: genres,
    }))
}

/// GET /api/contents/{type}/{id}/labels
#[utoipa::path(
    get,
    path = "/api/contents/{type}/{id}/labels",
    params(
        ("type" = String, Path, description = "movie or tv"),
        ("id" = i64, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Label of the entry", body = LabelInfo),
        (status = 400, description = "Invalid type"),
        (status = 404, description = "Entry not found")
    )
)]
pub async fn get_labels(
    State(ctx): State<AppContext>,
    Path((media_type, id)): Path<(String, String)>,
) -> Result<Json<LabelInfo>, AppError> {
    let (media_type, id) = parse_target(&media_type, &id)?;

    let dates = ctx
        .with_conn(move |conn| media::label_dates(conn, media_type, id))
        .await?
        .ok_or_else(|| Error::not_found("media", format!("{media_type}/{id}")))?;

    Ok(Json(Label::classify(media_type, &dates, ctx.today()).into()))
}

// ---------------------------------------------------------------------------
// Suggestions
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SuggestionsParams {
    /// At least three characters after trimming.
    pub search: Option<String>,
}

/// Lightweight entry shown in the search dropdown.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct Suggestion {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub release_date: Option<String>,
    pub rating: Option<f64>,
    pub poster_url: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<Suggestion>,
}

/// GET /api/contents/suggestions
#[utoipa::path(
    get,
    path = "/api/contents/suggestions",
    params(SuggestionsParams),
    responses(
        (status = 200, description = "Title suggestions", body = SuggestionsResponse),
        (status = 400, description = "Fewer than three characters")
    )
)]
pub async fn suggestions(
    State(ctx): State<AppContext>,
    Query(params): Query<SuggestionsParams>,
) -> Result<Json<SuggestionsResponse>, AppError> {
    let input = params.search.unwrap_or_default();
    let limit = i64::from(ctx.config.catalog.suggestions_limit);

    let rows = ctx
        .with_conn(move |conn| contents::suggestions(conn, &input, limit))
        .await?;

    let suggestions = rows
        .into_iter()
        .map(|m| Suggestion {
            id: m.id,
            title: m.title,
            media_type: m.media_type,
            release_date: m.release_date,
            rating: m.rating,
            poster_url: m.poster_url,
        })
        .collect();

    Ok(Json(SuggestionsResponse { suggestions }))
}

// ---------------------------------------------------------------------------
// Latest
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct LatestParams {
    /// Genre filter; `genreId` is accepted as well.
    #[serde(alias = "genreId")]
    pub genre: Option<String>,
    pub limit: Option<String>,
}

/// Clamp a requested list size into `1..=MAX_PAGE_SIZE`.
fn list_limit(raw: Option<&str>, default: u32) -> vt_core::Result<i64> {
    let limit = parse_opt("limit", raw)?.unwrap_or(i64::from(default));
    Ok(limit.clamp(1, contents::MAX_PAGE_SIZE))
}

/// GET /api/contents/latest
#[utoipa::path(
    get,
    path = "/api/contents/latest",
    params(("limit" = Option<i64>, Query, description = "Maximum number of entries")),
    responses(
        (status = 200, description = "Recently released entries", body = Vec<MediaResponse>)
    )
)]
pub async fn latest(
    State(ctx): State<AppContext>,
    Query(params): Query<LatestParams>,
) -> Result<Json<Vec<MediaResponse>>, AppError> {
    let catalog = &ctx.config.catalog;
    let limit = list_limit(params.limit.as_deref(), catalog.latest_default_limit)?;
    let today = ctx.today();
    let since = today - chrono::Duration::days(i64::from(catalog.latest_window_days));

    let rows = ctx
        .with_conn(move |conn| contents::latest(conn, since, limit))
        .await?;
    Ok(Json(MediaResponse::list(&rows, today)))
}

/// GET /api/contents/latest/{type}
#[utoipa::path(
    get,
    path = "/api/contents/latest/{type}",
    params(
        ("type" = String, Path, description = "movie or tv"),
        LatestParams
    ),
    responses(
        (status = 200, description = "Newest entries of one type", body = Vec<MediaResponse>),
        (status = 400, description = "Invalid type or genre")
    )
)]
pub async fn latest_by_type(
    State(ctx): State<AppContext>,
    Path(media_type): Path<String>,
    Query(params): Query<LatestParams>,
) -> Result<Json<Vec<MediaResponse>>, AppError> {
    let media_type: MediaType = media_type.parse()?;
    let genre_id = parse_opt("genre", params.genre.as_deref())?;
    let limit = list_limit(
        params.limit.as_deref(),
        ctx.config.catalog.latest_default_limit,
    )?;

    let rows = ctx
        .with_conn(move |conn| contents::latest_by_type(conn, media_type, genre_id, limit))
        .await?;
    Ok(Json(MediaResponse::list(&rows, ctx.today())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use vt_core::config::Config;

    fn ctx() -> AppContext {
        let db = vt_db::pool::init_memory_pool().unwrap();
        AppContext::new(db, Arc::new(Config::default()))
    }

    #[test]
    fn defaults_apply_when_params_missing() {
        let (filter, sort, page) = parse_contents(&ContentsParams::default(), &ctx()).unwrap();
        assert!(filter.search.is_none());
        assert!(sort.is_none());
        assert_eq!(page, PageRequest { page: 1, limit: 50 });
    }

    #[test]
    fn blank_search_is_rejected() {
        let params = ContentsParams {
            search: Some("   ".into()),
            ..Default::default()
        };
        let err = parse_contents(&params, &ctx()).unwrap_err();
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn pagination_bounds_are_enforced() {
        for (page, limit) in [("0", "10"), ("1", "0"), ("1", "101"), ("x", "10")] {
            let params = ContentsParams {
                page: Some(page.into()),
                limit: Some(limit.into()),
                ..Default::default()
            };
            assert!(parse_contents(&params, &ctx()).is_err(), "{page}/{limit}");
        }
    }

    #[test]
    fn unknown_sort_is_ignored() {
        let params = ContentsParams {
            orderby: Some("popularity".into()),
            order_dir: Some("sideways".into()),
            ..Default::default()
        };
        let (_, sort, _) = parse_contents(&params, &ctx()).unwrap();
        assert!(sort.is_none());

        let params = ContentsParams {
            orderby: Some("az".into()),
            ..Default::default()
        };
        let (_, sort, _) = parse_contents(&params, &ctx()).unwrap();
        assert_eq!(sort, Some(Sort::new(SortKey::Az, Some(SortDir::Asc))));
    }

    #[test]
    fn list_limit_is_clamped() {
        assert_eq!(list_limit(None, 25).unwrap(), 25);
        assert_eq!(list_limit(Some("500"), 25).unwrap(), 100);
        assert_eq!(list_limit(Some("-3"), 25).unwrap(), 1);
        assert!(list_limit(Some("many"), 25).is_err());
    }
}
