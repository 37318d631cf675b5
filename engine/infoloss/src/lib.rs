//! Information-loss metric engine.
//!
//! Re-exports the data model, domain shares, loss values and metrics, and adds a factory
//! that builds any metric from a serializable [`MetricKind`].

pub mod factory;

pub use factory::{create_metric, MetricKind};

pub use infoloss_data as data;
pub use infoloss_domain as domain;
pub use infoloss_metric as metric;
pub use infoloss_value as value;

pub use infoloss_data::{AnonymizationConfig, DataManager, EquivalenceClasses, Transformation};
pub use infoloss_metric::{Metric, MetricConfiguration, MetricError, MetricResult};
pub use infoloss_value::{InformationLoss, LossWithBound};
