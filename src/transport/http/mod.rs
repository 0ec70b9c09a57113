pub mod error;
pub mod router;
pub mod types;
pub mod handlers {
    pub mod health;
    pub mod teachers;
}

pub use error::ApiError;
pub use router::{build_app, create_router, ApiDoc};
pub use types::AppState;
