//! Axum router construction.
//!
//! Builds the full application router with all route groups, middleware
//! layers, and the OpenAPI document.

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::context::AppContext;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health_check,
        routes::contents::list_contents,
        routes::contents::get_content,
        routes::contents::get_labels,
        routes::contents::suggestions,
        routes::contents::latest,
        routes::contents::latest_by_type,
        routes::tv::list_seasons,
        routes::tv::list_episodes,
        routes::tv::get_episode,
        routes::tv::next_episode,
        routes::related::list_related,
        routes::facets::list_genres,
        routes::facets::list_years,
        routes::analytics::top_overall,
        routes::analytics::top_by_type,
        routes::analytics::record_view,
    ),
    components(schemas(
        routes::MediaResponse,
        routes::contents::ContentsResponse,
        routes::contents::PaginationResponse,
        routes::contents::SearchInfo,
        routes::contents::ContentDetailResponse,
        routes::contents::Suggestion,
        routes::contents::SuggestionsResponse,
        routes::tv::SeasonResponse,
        routes::tv::EpisodeResponse,
        routes::related::RelatedResponse,
        routes::facets::GenreResponse,
        routes::analytics::TopViewedResponse,
        routes::analytics::RecordViewRequest,
        routes::analytics::MessageResponse,
        vt_core::LabelInfo,
        vt_core::MediaType,
    ))
)]
struct ApiDoc;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let contents = Router::new()
        .route("/", get(routes::contents::list_contents))
        // Static segments take priority over `{type}`.
        .route("/suggestions", get(routes::contents::suggestions))
        .route("/genres", get(routes::facets::list_genres))
        .route("/years", get(routes::facets::list_years))
        .route("/latest", get(routes::contents::latest))
        .route("/latest/{type}", get(routes::contents::latest_by_type))
        .route(
            "/correlati/{type}/{id}",
            get(routes::related::list_related),
        )
        .route("/{type}/{id}", get(routes::contents::get_content))
        .route("/{type}/{id}/labels", get(routes::contents::get_labels))
        .route("/{type}/{id}/seasons", get(routes::tv::list_seasons))
        .route(
            "/{type}/{id}/episodes/{season}",
            get(routes::tv::list_episodes),
        )
        .route(
            "/{type}/{id}/episode/{season}/{episode}",
            get(routes::tv::get_episode),
        )
        .route(
            "/{type}/{id}/next-episode/{season}/{episode}",
            get(routes::tv::next_episode),
        );

    let analytics = Router::new()
        .route(
            "/",
            get(routes::analytics::top_overall).post(routes::analytics::record_view),
        )
        .route("/top/{type}", get(routes::analytics::top_by_type));

    let api = Router::new()
        .nest("/contents", contents)
        .nest("/analytics", analytics);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api)
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use vt_core::config::Config;

    fn app() -> Router {
        let db = vt_db::pool::init_memory_pool().unwrap();
        build_router(AppContext::new(db, Arc::new(Config::default())))
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, body) = get_json("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn static_segments_win_over_type() {
        let (status, body) = get_json("/api/contents/genres").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());

        let (status, _) = get_json("/api/contents/latest/movie").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = get_json("/api/contents/correlati/movie/1").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn request_id_is_echoed() {
        let response = app()
            .oneshot(
                Request::get("/health")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()["x-request-id"], "abc-123");
    }

    #[tokio::test]
    async fn openapi_document_lists_routes() {
        let (status, body) = get_json("/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/contents"].is_object());
        assert!(body["paths"]["/api/contents/correlati/{type}/{id}"].is_object());
    }
}
