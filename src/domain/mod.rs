pub mod model;

pub use model::{
    review_date, today_review_date, NewReview, NewTeacher, Rating, Review, ReviewSummary, Teacher,
    TeacherSummary, TeacherWithReviews, ValidationError,
};
