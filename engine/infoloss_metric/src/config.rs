//! Per-metric configuration.

use serde::{Deserialize, Serialize};

use infoloss_value::AggregateFunction;

use crate::error::{MetricError, MetricResult};

/// Options a metric is created with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricConfiguration {
    /// Use the monotonic variant where one exists.
    pub monotonic: bool,
    /// Trade-off between generalization (`1.0`) and suppression (`0.0`).
    pub gs_factor: f64,
    /// Allow the precomputed variant.
    pub precomputed: bool,
    /// Largest ratio of distinct values to rows for which the precomputed variant is used.
    pub precomputation_threshold: f64,
    pub aggregate_function: AggregateFunction,
}

impl Default for MetricConfiguration {
    fn default() -> Self {
        MetricConfiguration {
            monotonic: false,
            gs_factor: 0.5,
            precomputed: false,
            precomputation_threshold: 0.0,
            aggregate_function: AggregateFunction::default(),
        }
    }
}

impl MetricConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_monotonic(mut self, monotonic: bool) -> Self {
        self.monotonic = monotonic;
        self
    }

    pub fn with_gs_factor(mut self, gs_factor: f64) -> Self {
        self.gs_factor = gs_factor;
        self
    }

    /// Enables the precomputed variant below `threshold`.
    pub fn with_precomputation(mut self, threshold: f64) -> Self {
        self.precomputed = true;
        self.precomputation_threshold = threshold;
        self
    }

    pub fn with_aggregate_function(mut self, function: AggregateFunction) -> Self {
        self.aggregate_function = function;
        self
    }

    pub fn validate(&self) -> MetricResult<()> {
        if !(0.0..=1.0).contains(&self.gs_factor) {
            return Err(MetricError::Configuration(format!(
                "gs factor {} is outside [0, 1]",
                self.gs_factor
            )));
        }
        if !(0.0..=1.0).contains(&self.precomputation_threshold) {
            return Err(MetricError::Configuration(format!(
                "precomputation threshold {} is outside [0, 1]",
                self.precomputation_threshold
            )));
        }
        Ok(())
    }

    /// Weight of generalized rows.
    pub fn g_factor(&self) -> f64 {
        if self.gs_factor <= 0.5 {
            1.0
        } else {
            1.0 - 2.0 * (self.gs_factor - 0.5)
        }
    }

    /// Weight of suppressed rows.
    pub fn s_factor(&self) -> f64 {
        if self.gs_factor <= 0.5 {
            2.0 * self.gs_factor
        } else {
            1.0
        }
    }
}
