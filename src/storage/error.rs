use thiserror::Error;

/// Any failure raised by the persistence layer.
///
/// Carries a short description of the failed step alongside the driver error.
#[derive(Debug, Error)]
#[error("{context}: {source}")]
pub struct StoreError {
    context: &'static str,
    #[source]
    source: sqlx::Error,
}

impl StoreError {
    pub fn new(context: &'static str, source: sqlx::Error) -> Self {
        Self { context, source }
    }

    pub fn context(&self) -> &'static str {
        self.context
    }

    /// True when the statement was rejected by a UNIQUE index.
    pub fn is_unique_violation(&self) -> bool {
        match &self.source {
            sqlx::Error::Database(db) => db.is_unique_violation(),
            _ => false,
        }
    }
}

pub trait StoreResultExt<T> {
    fn store_context(self, context: &'static str) -> Result<T, StoreError>;
}

impl<T> StoreResultExt<T> for Result<T, sqlx::Error> {
    fn store_context(self, context: &'static str) -> Result<T, StoreError> {
        self.map_err(|e| StoreError::new(context, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_includes_context_and_cause() {
        let err: Result<(), _> = Err(sqlx::Error::RowNotFound);
        let err = err.store_context("failed to load teacher").unwrap_err();
        assert_eq!(err.context(), "failed to load teacher");
        assert!(err.to_string().starts_with("failed to load teacher: "));
        assert!(!err.is_unique_violation());
    }
}
