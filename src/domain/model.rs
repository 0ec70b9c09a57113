//! Teacher and review records, plus the validated inputs the service accepts.

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;
use utoipa::ToSchema;

/// A teacher row as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Teacher {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Derived mean of the teacher's review ratings. `None` if the column held NULL.
    pub avg_rating: Option<f64>,
    pub created_at: Option<NaiveDateTime>,
}

/// A review row as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub id: i64,
    pub teacher_id: i64,
    pub rating: i64,
    pub reason: String,
    pub date: String,
    pub created_at: Option<NaiveDateTime>,
}

/// One listing row: a teacher with every review attached to it.
#[derive(Debug, Clone)]
pub struct TeacherWithReviews {
    pub teacher: Teacher,
    pub review_count: usize,
    pub reviews: Vec<Review>,
}

/// Public shape of a review inside a teacher listing.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ReviewSummary {
    pub rating: i64,
    pub reason: String,
    /// Locale-formatted calendar date, e.g. `10/18/2026`.
    pub date: String,
}

impl From<Review> for ReviewSummary {
    fn from(review: Review) -> Self {
        Self {
            rating: review.rating,
            reason: review.reason,
            date: review.date,
        }
    }
}

/// Public shape of a teacher, as returned by listing and creation.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherSummary {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub avg_rating: f64,
    pub reviews: Vec<ReviewSummary>,
    pub review_count: usize,
}

impl From<TeacherWithReviews> for TeacherSummary {
    fn from(row: TeacherWithReviews) -> Self {
        let avg_rating = match row.teacher.avg_rating {
            Some(v) if v.is_finite() => v,
            _ => 0.0,
        };
        Self {
            id: row.teacher.id,
            name: row.teacher.name,
            description: row.teacher.description,
            avg_rating,
            review_count: row.review_count,
            reviews: row.reviews.into_iter().map(ReviewSummary::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Empty { field: &'static str },

    #[error("rating must be a number, got {0}")]
    InvalidRating(String),

    #[error("invalid teacher id: {0}")]
    InvalidTeacherId(String),
}

/// A review score. Stored as an integer; the 1-5 range is advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rating(i64);

impl Rating {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(self) -> i64 {
        self.0
    }

    /// Accepts a JSON number or a numeric string. Fractional input is truncated toward zero.
    pub fn parse(value: &JsonValue) -> Result<Self, ValidationError> {
        let number = match value {
            JsonValue::Number(n) => n.as_i64().map(|i| i as f64).or_else(|| n.as_f64()),
            JsonValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match number {
            Some(n) if n.is_finite() && n.abs() < i64::MAX as f64 => Ok(Self(n.trunc() as i64)),
            _ => Err(ValidationError::InvalidRating(value.to_string())),
        }
    }
}

impl From<i64> for Rating {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(trimmed.to_string())
}

/// Validated input for creating a teacher together with its first review.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTeacher {
    pub name: String,
    pub description: String,
    pub rating: Rating,
    pub reason: String,
}

impl NewTeacher {
    pub fn new(
        name: &str,
        description: &str,
        rating: impl Into<Rating>,
        reason: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required("name", name)?,
            description: required("description", description)?,
            rating: rating.into(),
            reason: required("reason", reason)?,
        })
    }
}

/// Validated input for appending a review to an existing teacher.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub rating: Rating,
    pub reason: String,
}

impl NewReview {
    pub fn new(rating: impl Into<Rating>, reason: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            rating: rating.into(),
            reason: required("reason", reason)?,
        })
    }
}

/// Formats a date the way an en-US short date reads: `M/D/YYYY`, no padding.
pub fn review_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

/// Today's local date, formatted for a new review.
pub fn today_review_date() -> String {
    review_date(Local::now().date_naive())
}
