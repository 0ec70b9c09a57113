//! Maps service failures onto HTTP responses.

use crate::app::ServiceError;
use crate::domain::model::ValidationError;
use crate::storage::StoreError;
use crate::transport::http::types::ErrorBody;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[derive(Debug)]
pub enum ApiError {
    Service(ServiceError),
    /// Body was not valid JSON for the endpoint (422).
    InvalidBody(JsonRejection),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::InvalidBody(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody::new(format!("Invalid JSON body: {}", e.body_text())),
            ),
            Self::Service(ServiceError::Validation(e)) => {
                (StatusCode::BAD_REQUEST, ErrorBody::new(e.to_string()))
            }
            Self::Service(e @ ServiceError::DuplicateTeacher { teacher_id }) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::for_teacher(e.to_string(), teacher_id),
            ),
            Self::Service(e @ ServiceError::TeacherNotFound { teacher_id }) => (
                StatusCode::NOT_FOUND,
                ErrorBody::for_teacher(e.to_string(), teacher_id),
            ),
            Self::Service(ServiceError::Store(e)) => {
                tracing::error!(error = %e, "database error");
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::new(e.to_string()))
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        Self::Service(e)
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Service(e.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Service(e.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::InvalidBody(e)
    }
}

impl From<PathRejection> for ApiError {
    fn from(e: PathRejection) -> Self {
        Self::Service(ValidationError::InvalidTeacherId(e.body_text()).into())
    }
}
