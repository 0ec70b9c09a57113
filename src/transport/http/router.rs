use crate::app::{HealthStatus, ReviewAdded};
use crate::domain::model::{ReviewSummary, TeacherSummary};
use crate::transport::http::handlers::{health, teachers};
use crate::transport::http::types::{AddReviewRequest, AppState, CreateTeacherRequest, ErrorBody};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, get_service, post};
use axum::{Json, Router};
use std::any::Any;
use std::path::Path;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::test_handler,
        teachers::list_teachers_handler,
        teachers::create_teacher_handler,
        teachers::add_review_handler
    ),
    components(schemas(
        HealthStatus,
        TeacherSummary,
        ReviewSummary,
        ReviewAdded,
        CreateTeacherRequest,
        AddReviewRequest,
        ErrorBody
    ))
)]
pub struct ApiDoc;

async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// API routes only.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/test", get(health::test_handler))
        .route(
            "/api/teachers",
            get(teachers::list_teachers_handler).post(teachers::create_teacher_handler),
        )
        .route("/api/teachers/:id/reviews", post(teachers::add_review_handler))
        .route("/api-docs/openapi.json", get(openapi_handler))
        .with_state(app_state)
}

/// The full application: API routes, static files from `static_dir` with `index.html` as
/// the catch-all, plus CORS, request tracing and panic recovery.
///
/// Any GET that no API route answers gets the entry document, including GETs on paths
/// that only accept POST.
pub fn build_app(app_state: AppState, static_dir: &Path) -> Router {
    let index = ServeFile::new(static_dir.join("index.html"));
    let static_files = ServeDir::new(static_dir).fallback(index.clone());

    create_router(app_state)
        .route("/api/teachers/:id/reviews", get_service(index))
        .fallback_service(static_files)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(%detail, "request handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new("internal server error")),
    )
        .into_response()
}
