//! Errors raised while assembling the encoded input of the metric engine.

/// Result alias used across the data crate.
pub type DataResult<T> = Result<T, DataError>;

/// An error in the input data model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataError {
    /// A hierarchy table without rows or with rows of differing length.
    #[error("hierarchy for attribute '{attribute}' is malformed: {reason}")]
    MalformedHierarchy {
        /// The attribute the hierarchy belongs to.
        attribute: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A data value that does not appear on the lowest level of its hierarchy.
    #[error("value '{value}' of attribute '{attribute}' is not covered by its hierarchy")]
    ValueNotInHierarchy {
        /// The attribute being encoded.
        attribute: String,
        /// The offending value.
        value: String,
    },

    /// An attribute referenced by the definition or configuration is unknown.
    #[error("unknown attribute '{0}'")]
    UnknownAttribute(String),

    /// A quasi-identifier without a hierarchy.
    #[error("no hierarchy defined for quasi-identifier '{0}'")]
    MissingHierarchy(String),

    /// A row whose width differs from the header.
    #[error("row {row} has {actual} cells, expected {expected}")]
    RowWidth {
        /// Index of the row.
        row: usize,
        /// Number of header columns.
        expected: usize,
        /// Number of cells found.
        actual: usize,
    },

    /// A transformation that does not fit the hierarchies.
    #[error("invalid transformation: {0}")]
    InvalidTransformation(String),

    /// A value that cannot be interpreted by a functional hierarchy.
    #[error("cannot parse '{value}' as {expected}")]
    Parse {
        /// The offending value.
        value: String,
        /// The expected kind of value.
        expected: &'static str,
    },

    /// A row index beyond the end of the data.
    #[error("row {row} is out of range for {rows} rows")]
    RowOutOfRange {
        /// The offending index.
        row: usize,
        /// Number of rows in the data.
        rows: usize,
    },

    /// An equivalence class without the value distribution of an analyzed attribute.
    #[error("equivalence class carries no distribution for attribute '{0}'")]
    MissingDistribution(String),

    /// An invalid configuration parameter.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A configuration document that could not be read.
    #[error("cannot read configuration: {0}")]
    ConfigurationFormat(String),
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::ConfigurationFormat(err.to_string())
    }
}
