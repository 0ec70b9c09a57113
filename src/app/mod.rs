pub mod error;
pub mod review_service;

pub use error::ServiceError;
pub use review_service::{HealthStatus, ReviewAdded, ReviewService};
