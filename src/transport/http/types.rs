use crate::app::ReviewService;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ReviewService>,
}

impl AppState {
    pub fn new(service: ReviewService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Body of `POST /api/teachers`. Missing fields are reported as validation errors.
#[derive(Deserialize, Debug, Default, ToSchema)]
#[serde(default)]
pub struct CreateTeacherRequest {
    pub name: String,
    pub description: String,
    /// Number or numeric string.
    #[schema(value_type = f64)]
    pub rating: Option<JsonValue>,
    pub reason: String,
}

/// Body of `POST /api/teachers/{id}/reviews`.
#[derive(Deserialize, Debug, Default, ToSchema)]
#[serde(default)]
pub struct AddReviewRequest {
    #[schema(value_type = f64)]
    pub rating: Option<JsonValue>,
    pub reason: String,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<i64>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            teacher_id: None,
        }
    }

    pub fn for_teacher(error: impl Into<String>, teacher_id: i64) -> Self {
        Self {
            error: error.into(),
            teacher_id: Some(teacher_id),
        }
    }
}
