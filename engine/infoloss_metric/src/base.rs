//! State shared by the concrete metrics: dimensions, weights, factors and extrema.

use std::sync::Arc;

use infoloss_data::{AnonymizationConfig, DataError, DataManager, Transformation};
use infoloss_value::{AggregateFunction, InformationLoss, LossError};

use crate::config::MetricConfiguration;
use crate::error::{MetricError, MetricResult};

/// Digits kept when rounding accumulated losses.
const ROUNDING: f64 = 1e10;

/// Rounds away accumulation noise so that equal losses compare equal and tiny negative
/// results become zero.
pub(crate) fn round(value: f64) -> f64 {
    let rounded = (value * ROUNDING).round() / ROUNDING;
    if rounded.is_finite() {
        rounded.max(0.0)
    } else {
        value
    }
}

/// Rejects transformations whose width or levels do not fit the hierarchies.
fn check_levels(transformation: &Transformation, heights: &[usize]) -> MetricResult<()> {
    if transformation.dimensions() != heights.len() {
        return Err(LossError::DimensionMismatch {
            expected: heights.len(),
            actual: transformation.dimensions(),
        }
        .into());
    }
    for (dimension, (&level, &height)) in transformation
        .generalization()
        .iter()
        .zip(heights)
        .enumerate()
    {
        if level >= height {
            return Err(DataError::InvalidTransformation(format!(
                "level {level} of dimension {dimension} exceeds height {height}"
            ))
            .into());
        }
    }
    Ok(())
}

fn heights(manager: &DataManager) -> Vec<usize> {
    manager.hierarchies().iter().map(|h| h.height()).collect()
}

/// Parameters of the privacy model that shape scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ScoreParameters {
    pub k: usize,
    pub reliable: bool,
    pub private: bool,
}

impl ScoreParameters {
    pub fn from_config(config: &AnonymizationConfig) -> Self {
        ScoreParameters {
            k: config.privacy.minimal_class_size.unwrap_or(1).max(1),
            reliable: config.reliable,
            private: config.privacy.differential_privacy.is_some(),
        }
    }

    /// Scores are only meaningful under differential privacy.
    pub fn require_private(&self) -> MetricResult<()> {
        if self.private {
            Ok(())
        } else {
            Err(MetricError::Configuration(
                "scores require differential privacy parameters".to_string(),
            ))
        }
    }
}

/// Dimensions, normalized weights and extrema of a metric with one value per
/// quasi-identifier.
#[derive(Debug, Clone)]
pub struct MultiDimensionalState {
    name: &'static str,
    function: AggregateFunction,
    g_factor: f64,
    s_factor: f64,
    dimensions: usize,
    heights: Vec<usize>,
    weights: Arc<[f64]>,
    rows: f64,
    min: Option<Vec<f64>>,
    max: Option<Vec<f64>>,
    initialized: bool,
}

impl MultiDimensionalState {
    pub fn new(name: &'static str, configuration: &MetricConfiguration) -> Self {
        MultiDimensionalState {
            name,
            function: configuration.aggregate_function,
            g_factor: configuration.g_factor(),
            s_factor: configuration.s_factor(),
            dimensions: 0,
            heights: Vec::new(),
            weights: Arc::from(Vec::new()),
            rows: 0.0,
            min: None,
            max: None,
            initialized: false,
        }
    }

    /// Reads dimensions and weights; weights are scaled so that the largest is 1.
    pub fn initialize(&mut self, manager: &DataManager, config: &AnonymizationConfig) {
        let raw: Vec<f64> = manager
            .quasi_identifiers()
            .iter()
            .map(|attribute| config.attribute_weight(attribute))
            .collect();
        let largest = raw.iter().copied().fold(0.0, f64::max);
        let weights: Vec<f64> = if largest > 0.0 {
            raw.iter().map(|w| w / largest).collect()
        } else {
            vec![1.0; raw.len()]
        };
        self.dimensions = weights.len();
        self.heights = heights(manager);
        self.weights = weights.into();
        self.rows = manager.effective_rows() as f64;
        self.initialized = true;
    }

    /// Registers the extrema used to normalize relative values.
    pub fn set_min_max(&mut self, min: Vec<f64>, max: Vec<f64>) -> MetricResult<()> {
        for bound in [&min, &max] {
            if bound.len() != self.dimensions {
                return Err(LossError::DimensionMismatch {
                    expected: self.dimensions,
                    actual: bound.len(),
                }
                .into());
            }
        }
        self.min = Some(min);
        self.max = Some(max);
        Ok(())
    }

    pub fn ensure_initialized(&self) -> MetricResult<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(MetricError::NotInitialized(self.name))
        }
    }

    /// Checks that the metric is initialized and the transformation fits its hierarchies.
    pub fn check(&self, transformation: &Transformation) -> MetricResult<()> {
        self.ensure_initialized()?;
        check_levels(transformation, &self.heights)
    }

    pub fn create_loss(&self, values: Vec<f64>) -> MetricResult<InformationLoss> {
        Ok(InformationLoss::multi(
            values,
            Arc::clone(&self.weights),
            self.function,
        )?)
    }

    pub fn min_loss(&self) -> MetricResult<InformationLoss> {
        self.ensure_initialized()?;
        match &self.min {
            Some(min) => self.create_loss(min.clone()),
            None => Err(MetricError::NotInitialized(self.name)),
        }
    }

    pub fn max_loss(&self) -> MetricResult<InformationLoss> {
        self.ensure_initialized()?;
        match &self.max {
            Some(max) => self.create_loss(max.clone()),
            None => Err(MetricError::NotInitialized(self.name)),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Number of rows statistics are computed over.
    pub fn rows(&self) -> f64 {
        self.rows
    }

    pub fn g_factor(&self) -> f64 {
        self.g_factor
    }

    pub fn s_factor(&self) -> f64 {
        self.s_factor
    }

    pub fn function(&self) -> AggregateFunction {
        self.function
    }
}

/// Row count and extrema of a metric with one scalar value.
#[derive(Debug, Clone)]
pub struct SingleDimensionalState {
    name: &'static str,
    dimensions: usize,
    heights: Vec<usize>,
    rows: f64,
    min: f64,
    max: f64,
    initialized: bool,
}

impl SingleDimensionalState {
    pub fn new(name: &'static str) -> Self {
        SingleDimensionalState {
            name,
            dimensions: 0,
            heights: Vec::new(),
            rows: 0.0,
            min: 0.0,
            max: 0.0,
            initialized: false,
        }
    }

    pub fn initialize(&mut self, manager: &DataManager, min: f64, max: f64) {
        self.dimensions = manager.quasi_identifiers().len();
        self.heights = heights(manager);
        self.rows = manager.effective_rows() as f64;
        self.min = min;
        self.max = max;
        self.initialized = true;
    }

    pub fn ensure_initialized(&self) -> MetricResult<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(MetricError::NotInitialized(self.name))
        }
    }

    pub fn check(&self, transformation: &Transformation) -> MetricResult<()> {
        self.ensure_initialized()?;
        check_levels(transformation, &self.heights)
    }

    /// Updates the extrema once they can be computed.
    pub fn set_min_max(&mut self, min: f64, max: f64) {
        self.min = min;
        self.max = max;
    }

    pub fn min_loss(&self) -> MetricResult<InformationLoss> {
        self.ensure_initialized()?;
        Ok(InformationLoss::single(self.min))
    }

    pub fn max_loss(&self) -> MetricResult<InformationLoss> {
        self.ensure_initialized()?;
        Ok(InformationLoss::single(self.max))
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn rows(&self) -> f64 {
        self.rows
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}
