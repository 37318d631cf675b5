use infoloss_data::DataError;
use infoloss_domain::DomainError;
use infoloss_value::LossError;

/// Result alias for metric operations.
pub type MetricResult<T> = Result<T, MetricError>;

#[derive(Debug, thiserror::Error)]
pub enum MetricError {
    /// Evaluation, bounds or extrema requested before `initialize`.
    #[error("metric '{0}' must be initialized first")]
    NotInitialized(&'static str),

    #[error("invalid metric configuration: {0}")]
    Configuration(String),

    /// The metric does not implement the requested operation.
    #[error("metric '{metric}' does not support {operation}")]
    Unsupported {
        metric: &'static str,
        operation: &'static str,
    },

    #[error(transparent)]
    Loss(#[from] LossError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Data(#[from] DataError),
}
