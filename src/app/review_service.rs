//! The teacher/review service.
//!
//! Implements the four public operations on top of [`Store`]. Every multi-step write runs
//! in one store transaction, and `avgRating` is always recomputed from the stored reviews.

use crate::app::error::ServiceError;
use crate::domain::model::{
    today_review_date, NewReview, NewTeacher, Rating, ReviewSummary, TeacherSummary,
};
use crate::storage::{Store, StoreError, StoreTx};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

/// Liveness payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthStatus {
    pub message: String,
    #[schema(value_type = String)]
    pub timestamp: DateTime<Utc>,
}

/// Result of appending a review.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAdded {
    pub success: bool,
    pub new_avg: f64,
}

#[derive(Clone, Debug)]
pub struct ReviewService {
    store: Store,
}

impl ReviewService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn health_check(&self) -> HealthStatus {
        HealthStatus {
            message: "API is working!".to_string(),
            timestamp: Utc::now(),
        }
    }

    /// All teachers, highest average first.
    pub async fn list_teachers(&self) -> Result<Vec<TeacherSummary>, ServiceError> {
        let rows = self.store.list_teachers_with_reviews().await?;
        info!(count = rows.len(), "fetched teachers");
        Ok(rows.into_iter().map(TeacherSummary::from).collect())
    }

    /// Creates a teacher together with its first review.
    ///
    /// Fails with [`ServiceError::DuplicateTeacher`] if a teacher with the same name (ignoring
    /// case) exists; nothing is written in that case.
    pub async fn create_teacher(&self, input: NewTeacher) -> Result<TeacherSummary, ServiceError> {
        let mut tx = self.store.begin().await?;

        if let Some(existing) = tx.find_teacher_by_name(&input.name).await? {
            warn!(name = %input.name, teacher_id = existing.id, "teacher already exists");
            return Err(ServiceError::DuplicateTeacher {
                teacher_id: existing.id,
            });
        }

        let rating = input.rating.value();
        let inserted = tx
            .insert_teacher(&input.name, &input.description, rating as f64)
            .await;
        let teacher_id = match inserted {
            Ok(id) => id,
            Err(e) if e.is_unique_violation() => {
                drop(tx);
                return Err(self.duplicate_after_race(&input.name, e).await);
            }
            Err(e) => return Err(e.into()),
        };
        info!(teacher_id, name = %input.name, "teacher added");

        let date = today_review_date();
        let avg_rating = record_review(&mut tx, teacher_id, input.rating, &input.reason, &date).await?;
        tx.commit().await?;

        Ok(TeacherSummary {
            id: teacher_id,
            name: input.name,
            description: input.description,
            avg_rating,
            reviews: vec![ReviewSummary {
                rating,
                reason: input.reason,
                date,
            }],
            review_count: 1,
        })
    }

    /// Appends a review and returns the teacher's recomputed average.
    pub async fn add_review(
        &self,
        teacher_id: i64,
        input: NewReview,
    ) -> Result<ReviewAdded, ServiceError> {
        let mut tx = self.store.begin().await?;

        if tx.find_teacher_by_id(teacher_id).await?.is_none() {
            warn!(teacher_id, "review for unknown teacher");
            return Err(ServiceError::TeacherNotFound { teacher_id });
        }

        let date = today_review_date();
        let new_avg = record_review(&mut tx, teacher_id, input.rating, &input.reason, &date).await?;
        tx.commit().await?;

        info!(teacher_id, new_avg, "average rating updated");
        Ok(ReviewAdded {
            success: true,
            new_avg,
        })
    }

    /// A concurrent create won the unique index; report it like a regular duplicate.
    async fn duplicate_after_race(&self, name: &str, cause: StoreError) -> ServiceError {
        let winner = match self.store.begin().await {
            Ok(mut tx) => tx.find_teacher_by_name(name).await,
            Err(e) => Err(e),
        };
        match winner {
            Ok(Some(teacher)) => ServiceError::DuplicateTeacher {
                teacher_id: teacher.id,
            },
            Ok(None) => ServiceError::Store(cause),
            Err(e) => ServiceError::Store(e),
        }
    }
}

/// Inserts a review and writes the recomputed average back to the teacher.
async fn record_review(
    tx: &mut StoreTx,
    teacher_id: i64,
    rating: Rating,
    reason: &str,
    date: &str,
) -> Result<f64, StoreError> {
    tx.insert_review(teacher_id, rating.value(), reason, date)
        .await?;
    let new_avg = tx
        .average_rating(teacher_id)
        .await?
        .unwrap_or(rating.value() as f64);
    tx.update_teacher_avg_rating(teacher_id, new_avg).await?;
    Ok(new_avg)
}
