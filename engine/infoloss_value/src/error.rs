/// Result alias for operations on information-loss values.
pub type LossResult<T> = Result<T, LossError>;

/// Invariant violations when combining information-loss values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LossError {
    /// Two values of different concrete kinds were compared or merged.
    #[error("incompatible information loss: expected {expected}, found {actual}")]
    IncompatibleClass {
        expected: &'static str,
        actual: &'static str,
    },

    /// Vectors of different length were combined.
    #[error("dimension mismatch: expected {expected}, found {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
