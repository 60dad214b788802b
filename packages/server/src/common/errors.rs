use thiserror::Error;

/// Postgres SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Errors returned by domain actions.
///
/// Models return `anyhow::Result`; actions convert into this taxonomy so the
/// HTTP and socket layers can map each failure to a status without string
/// matching.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(anyhow::Error),
}

pub type DomainResult<T> = std::result::Result<T, DomainError>;

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        if matches!(err, sqlx::Error::RowNotFound) {
            return Self::NotFound {
                entity: "Record",
                id: "unknown".to_string(),
            };
        }

        if let Some(db) = err.as_database_error() {
            if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return Self::Conflict(
                    db.constraint()
                        .map(|c| format!("Duplicate value violates {}", c))
                        .unwrap_or_else(|| "Duplicate value".to_string()),
                );
            }
        }

        Self::Internal(err.into())
    }
}

impl From<anyhow::Error> for DomainError {
    fn from(err: anyhow::Error) -> Self {
        // Model functions bubble sqlx errors through anyhow; recover the
        // constraint information before falling back to Internal.
        match err.downcast::<sqlx::Error>() {
            Ok(sqlx_err) => Self::from(sqlx_err),
            Err(other) => Self::Internal(other),
        }
    }
}
