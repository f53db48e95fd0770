use thiserror::Error;

pub type HrResult<T> = Result<T, HrError>;

/// Failures raised by a [`crate::Repository`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} record '{key}' already exists")]
    Duplicate { kind: &'static str, key: String },
    #[error("{kind} record '{key}' was modified concurrently (expected version {expected})")]
    StaleVersion {
        kind: &'static str,
        key: String,
        expected: i64,
    },
    #[error("{kind} record '{key}' does not exist")]
    Missing { kind: &'static str, key: String },
    #[error("storage backend failure: {0}")]
    Backend(String),
    #[error("failed to encode or decode record: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Caller-facing error taxonomy shared by every engine.
///
/// `Validation` and `Conflict` are expected outcomes that a front end turns
/// into a user-facing message; `NotFound` is kept apart so callers can
/// answer with the right status. Only `Store` signals an infrastructure
/// problem.
#[derive(Debug, Error)]
pub enum HrError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },
    #[error(transparent)]
    Store(StoreError),
}

impl HrError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

impl From<StoreError> for HrError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { .. } | StoreError::StaleVersion { .. } => {
                HrError::Conflict(err.to_string())
            }
            StoreError::Missing { kind, key } => HrError::NotFound { entity: kind, key },
            other => HrError::Store(other),
        }
    }
}
