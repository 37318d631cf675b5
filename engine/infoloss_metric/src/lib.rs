//! Information-loss metrics.
//!
//! Every metric implements [`Metric`]: it is initialized once with the encoded dataset
//! and then evaluates transformations from their equivalence classes, returning a loss
//! and, where one exists, a lower bound usable for pruning the generalization lattice.

#![warn(missing_debug_implementations)]

pub mod base;
pub mod config;
pub mod description;
pub mod error;
pub mod matcher;
pub mod metric;
pub mod metrics;
pub mod precomputed;
pub mod score;

#[cfg(test)]
mod fixtures;

pub use base::{MultiDimensionalState, SingleDimensionalState};
pub use config::MetricConfiguration;
pub use description::{ElementData, MetricDescription};
pub use error::{MetricError, MetricResult};
pub use matcher::TupleMatcher;
pub use metric::Metric;
pub use metrics::*;
pub use precomputed::{distinct_value_ratio, PotentiallyPrecomputed};
pub use score::ScoreNumber;
