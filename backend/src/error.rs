//! Application error types with GraphQL error conversion.

use std::sync::Arc;

use async_graphql::ErrorExtensions;
use thiserror::Error;

/// Errors raised by repositories and resolvers.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A batched load failed; the error is shared by every waiting resolver.
    #[error("Database error: {0}")]
    BatchLoad(#[from] Arc<sqlx::Error>),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{0}")]
    Validation(String),

    #[error("Invalid ID: {0}")]
    InvalidId(String),
}

impl AppError {
    /// Machine-readable code placed in the GraphQL error extensions.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) | AppError::BatchLoad(_) => "INTERNAL",
            AppError::NotFound { .. } => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InvalidId(_) => "BAD_USER_INPUT",
        }
    }

    /// Whether the error belongs in a mutation payload rather than the
    /// GraphQL `errors` array.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, AppError::NotFound { .. } | AppError::Validation(_))
    }
}

impl ErrorExtensions for AppError {
    fn extend(&self) -> async_graphql::Error {
        let code = self.code();
        // Driver messages stay in the log
        let message = match self {
            AppError::Database(_) | AppError::BatchLoad(_) => {
                tracing::error!(error = %self, "Database error while resolving request");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        async_graphql::Error::new(message).extend_with(|_, e| e.set("code", code))
    }
}

/// Parse a GraphQL `ID` into a row id.
pub fn parse_id(id: &async_graphql::ID) -> Result<i64, AppError> {
    id.parse::<i64>()
        .map_err(|_| AppError::InvalidId(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(&async_graphql::ID::from("42")).unwrap(), 42);
        assert_matches!(
            parse_id(&async_graphql::ID::from("forty-two")),
            Err(AppError::InvalidId(raw)) if raw == "forty-two"
        );
    }

    #[test]
    fn test_error_codes() {
        let err = AppError::InvalidId("x".into()).extend();
        let code = err.extensions.as_ref().and_then(|e| e.get("code")).cloned();
        assert_eq!(code, Some(async_graphql::Value::from("BAD_USER_INPUT")));

        let err = AppError::Database(sqlx::Error::RowNotFound).extend();
        assert_eq!(err.message, "Internal server error");
        let code = err.extensions.as_ref().and_then(|e| e.get("code")).cloned();
        assert_eq!(code, Some(async_graphql::Value::from("INTERNAL")));

        let shared = Arc::new(sqlx::Error::PoolClosed);
        let err = AppError::from(shared).extend();
        assert_eq!(err.message, "Internal server error");
        let code = err.extensions.as_ref().and_then(|e| e.get("code")).cloned();
        assert_eq!(code, Some(async_graphql::Value::from("INTERNAL")));

        assert!(AppError::Validation("too long".into()).is_user_facing());
        assert!(!AppError::InvalidId("x".into()).is_user_facing());
    }
}
