use crate::app::ReviewAdded;
use crate::domain::model::{NewReview, NewTeacher, Rating, TeacherSummary, ValidationError};
use crate::transport::http::error::ApiError;
use crate::transport::http::types::{AddReviewRequest, AppState, CreateTeacherRequest, ErrorBody};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value as JsonValue;
use tracing::info;

fn parse_rating(rating: Option<&JsonValue>) -> Result<Rating, ValidationError> {
    match rating {
        None | Some(JsonValue::Null) => Err(ValidationError::Empty { field: "rating" }),
        Some(v) => Rating::parse(v),
    }
}

#[utoipa::path(
    get,
    path = "/api/teachers",
    responses(
        (status = 200, description = "Teachers ordered by average rating, highest first", body = [TeacherSummary]),
        (status = 500, description = "Database error", body = ErrorBody)
    )
)]
pub async fn list_teachers_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<TeacherSummary>>, ApiError> {
    info!("fetching teachers");
    let teachers = state.service.list_teachers().await?;
    Ok(Json(teachers))
}

#[utoipa::path(
    post,
    path = "/api/teachers",
    request_body = CreateTeacherRequest,
    responses(
        (status = 200, description = "Teacher created with its first review", body = TeacherSummary),
        (status = 400, description = "Missing field or teacher already exists", body = ErrorBody),
        (status = 422, description = "Invalid JSON body", body = ErrorBody),
        (status = 500, description = "Database error", body = ErrorBody)
    )
)]
pub async fn create_teacher_handler(
    State(state): State<AppState>,
    request: Result<Json<CreateTeacherRequest>, JsonRejection>,
) -> Result<Json<TeacherSummary>, ApiError> {
    let Json(request) = request?;
    info!(name = %request.name, "adding new teacher");

    let rating = parse_rating(request.rating.as_ref())?;
    let input = NewTeacher::new(&request.name, &request.description, rating, &request.reason)?;
    let created = state.service.create_teacher(input).await?;
    Ok(Json(created))
}

#[utoipa::path(
    post,
    path = "/api/teachers/{id}/reviews",
    params(
        ("id" = i64, Path, description = "Teacher id")
    ),
    request_body = AddReviewRequest,
    responses(
        (status = 200, description = "Review added, average recomputed", body = ReviewAdded),
        (status = 400, description = "Missing field or malformed id", body = ErrorBody),
        (status = 404, description = "Unknown teacher", body = ErrorBody),
        (status = 422, description = "Invalid JSON body", body = ErrorBody),
        (status = 500, description = "Database error", body = ErrorBody)
    )
)]
pub async fn add_review_handler(
    State(state): State<AppState>,
    teacher_id: Result<Path<i64>, PathRejection>,
    request: Result<Json<AddReviewRequest>, JsonRejection>,
) -> Result<Json<ReviewAdded>, ApiError> {
    let Path(teacher_id) = teacher_id?;
    let Json(request) = request?;
    info!(teacher_id, "adding review");

    let rating = parse_rating(request.rating.as_ref())?;
    let input = NewReview::new(rating, &request.reason)?;
    let added = state.service.add_review(teacher_id, input).await?;
    Ok(Json(added))
}
