//! Persistence layer: the two-table SQLite store behind the review service.

pub mod error;
pub mod sqlite;

pub use error::{StoreError, StoreResultExt};
pub use sqlite::{Store, StoreTx};
