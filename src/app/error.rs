use crate::domain::model::ValidationError;
use crate::storage::StoreError;
use thiserror::Error;

/// Failures surfaced by [`crate::app::ReviewService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Teacher already exists")]
    DuplicateTeacher { teacher_id: i64 },

    #[error("Teacher not found")]
    TeacherNotFound { teacher_id: i64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}
