use infoloss_data::{DataError, DataType};

/// Result alias for domain-share and cardinality construction.
pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// Interval shares need a ratio-scaled type.
    #[error("cannot derive interval shares for data type {0}")]
    UnknownDataType(DataType),

    /// A hierarchy and its dictionary disagree.
    #[error("inconsistent hierarchy encoding: {0}")]
    Inconsistent(String),

    /// Persisted shares that cannot be restored.
    #[error("cannot restore persisted shares: {0}")]
    Serialization(String),

    #[error(transparent)]
    Data(#[from] DataError),
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}
