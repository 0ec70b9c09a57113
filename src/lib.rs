pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::{ReviewService, ServiceError};
pub use domain::model::{NewReview, NewTeacher, Rating, TeacherSummary};
pub use infra::config::Config;
pub use storage::{Store, StoreError};
