//! Precision: the generalization level relative to the hierarchy height, per attribute.

use log::{debug, trace};

use infoloss_data::{
    AnonymizationConfig, DataManager, EquivalenceClass, EquivalenceClasses, Transformation,
};
use infoloss_value::{InformationLoss, LossWithBound};

use crate::base::{round, MultiDimensionalState};
use crate::config::MetricConfiguration;
use crate::description::MetricDescription;
use crate::error::MetricResult;
use crate::metric::Metric;

const NAME: &str = "Precision";

const DESCRIPTION: MetricDescription = MetricDescription::named(NAME)
    .with_monotonic_variant()
    .with_attribute_weights()
    .with_gs_factor()
    .with_aggregate_function();

#[derive(Debug)]
pub struct PrecisionMetric {
    configuration: MetricConfiguration,
    state: MultiDimensionalState,
    max_levels: Vec<usize>,
}

impl PrecisionMetric {
    pub fn new(configuration: MetricConfiguration) -> Self {
        PrecisionMetric {
            state: MultiDimensionalState::new(NAME, &configuration),
            configuration,
            max_levels: Vec::new(),
        }
    }

    /// Per-row loss of a released value on `level` of `dimension`.
    fn generalized(&self, dimension: usize, level: usize) -> f64 {
        let max = self.max_levels[dimension];
        if max == 0 {
            0.0
        } else {
            self.state.g_factor() * level as f64 / max as f64
        }
    }

    /// Per-row loss of a suppressed value. The monotonic variant treats it as generalized.
    fn suppressed(&self, dimension: usize, level: usize) -> f64 {
        if self.configuration.monotonic {
            self.generalized(dimension, level)
        } else {
            self.state.s_factor()
        }
    }

    fn accumulate(
        &self,
        transformation: &Transformation,
        class: &EquivalenceClass,
        loss: &mut [f64],
        bound: &mut [f64],
    ) {
        let count = class.count as f64;
        for d in 0..loss.len() {
            let level = transformation.level(d);
            let generalized = self.generalized(d, level);
            let value = if class.is_not_outlier {
                generalized
            } else {
                self.suppressed(d, level)
            };
            loss[d] += count * value;
            bound[d] += count * if self.configuration.monotonic {
                value
            } else {
                generalized.min(self.state.s_factor())
            };
        }
    }

    fn normalize(&self, values: Vec<f64>) -> Vec<f64> {
        let rows = self.state.rows();
        values
            .into_iter()
            .map(|v| if rows > 0.0 { round(v / rows) } else { 0.0 })
            .collect()
    }
}

impl Metric for PrecisionMetric {
    fn description(&self) -> MetricDescription {
        DESCRIPTION
    }

    fn configuration(&self) -> &MetricConfiguration {
        &self.configuration
    }

    fn initialize(
        &mut self,
        manager: &DataManager,
        config: &AnonymizationConfig,
    ) -> MetricResult<()> {
        self.configuration.validate()?;
        self.state.initialize(manager, config);
        self.max_levels = manager.hierarchies().iter().map(|h| h.max_level()).collect();
        let dimensions = self.state.dimensions();
        self.state
            .set_min_max(vec![0.0; dimensions], vec![1.0; dimensions])?;
        debug!(
            "{NAME}: heights {:?}, monotonic {}",
            self.max_levels, self.configuration.monotonic
        );
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.state.is_initialized()
    }

    fn information_loss(
        &self,
        transformation: &Transformation,
        classes: &EquivalenceClasses,
    ) -> MetricResult<LossWithBound> {
        self.state.check(transformation)?;
        trace!("{NAME}: evaluating {transformation} over {} classes", classes.len());
        let dimensions = self.state.dimensions();
        let mut loss = vec![0.0; dimensions];
        let mut bound = vec![0.0; dimensions];
        for class in classes {
            self.accumulate(transformation, class, &mut loss, &mut bound);
        }
        Ok(LossWithBound::new(
            self.state.create_loss(self.normalize(loss))?,
            Some(self.state.create_loss(self.normalize(bound))?),
        ))
    }

    fn information_loss_of_class(
        &self,
        transformation: &Transformation,
        class: &EquivalenceClass,
    ) -> MetricResult<LossWithBound> {
        self.state.check(transformation)?;
        let dimensions = self.state.dimensions();
        let mut loss = vec![0.0; dimensions];
        let mut bound = vec![0.0; dimensions];
        self.accumulate(transformation, class, &mut loss, &mut bound);
        Ok(LossWithBound::new(
            self.state.create_loss(loss)?,
            Some(self.state.create_loss(bound)?),
        ))
    }

    fn lower_bound(&self, transformation: &Transformation) -> MetricResult<Option<InformationLoss>> {
        self.state.check(transformation)?;
        if !self.configuration.monotonic {
            return Ok(None);
        }
        let values = (0..self.state.dimensions())
            .map(|d| round(self.generalized(d, transformation.level(d))))
            .collect();
        Ok(Some(self.state.create_loss(values)?))
    }

    fn minimal_information_loss(&self) -> MetricResult<InformationLoss> {
        self.state.min_loss()
    }

    fn maximal_information_loss(&self) -> MetricResult<InformationLoss> {
        self.state.max_loss()
    }

    fn is_monotonic_with_suppression(&self) -> bool {
        self.configuration.monotonic
    }
}
