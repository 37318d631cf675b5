//! Runtime choice between an on-the-fly and a precomputed variant of a metric.

use std::collections::HashSet;

use log::debug;

use infoloss_data::{
    AnonymizationConfig, DataManager, EquivalenceClass, EquivalenceClasses, Transformation,
};
use infoloss_value::{InformationLoss, LossWithBound};

use crate::config::MetricConfiguration;
use crate::description::{ElementData, MetricDescription};
use crate::error::{MetricError, MetricResult};
use crate::metric::Metric;

/// Largest ratio of distinct values to rows over all quasi-identifiers.
pub fn distinct_value_ratio(manager: &DataManager) -> f64 {
    let rows = manager.effective_rows();
    if rows == 0 {
        return 0.0;
    }
    let data = manager.data_generalized();
    (0..data.columns())
        .map(|column| {
            let distinct: HashSet<i32> = (0..data.rows())
                .filter(|&row| manager.is_included(row))
                .map(|row| data.get(row, column))
                .collect();
            distinct.len() as f64 / rows as f64
        })
        .fold(0.0, f64::max)
}

/// Delegates to a precomputed variant when the data has few distinct values relative to
/// its size, and to the on-the-fly variant otherwise.
///
/// Precomputation pays off when many rows share values: the precomputed tables grow with
/// the number of distinct values, the evaluation cost of the default variant with the
/// number of classes.
#[derive(Debug)]
pub struct PotentiallyPrecomputed {
    default: Box<dyn Metric>,
    precomputed: Box<dyn Metric>,
    threshold: f64,
    selected: Option<bool>,
}

impl PotentiallyPrecomputed {
    /// Pairs two variants of the same metric.
    pub fn new(
        default: Box<dyn Metric>,
        precomputed: Box<dyn Metric>,
        threshold: f64,
    ) -> MetricResult<Self> {
        if default.name() != precomputed.name() {
            return Err(MetricError::Configuration(format!(
                "cannot combine '{}' with precomputed '{}'",
                default.name(),
                precomputed.name()
            )));
        }
        let (a, b) = (default.configuration(), precomputed.configuration());
        if a.aggregate_function != b.aggregate_function || a.monotonic != b.monotonic {
            return Err(MetricError::Configuration(format!(
                "variants of '{}' are configured differently",
                default.name()
            )));
        }
        Ok(PotentiallyPrecomputed {
            default,
            precomputed,
            threshold,
            selected: None,
        })
    }

    fn active(&self) -> MetricResult<&dyn Metric> {
        match self.selected {
            Some(true) => Ok(self.precomputed.as_ref()),
            Some(false) => Ok(self.default.as_ref()),
            None => Err(MetricError::NotInitialized(self.default.name())),
        }
    }
}

impl Metric for PotentiallyPrecomputed {
    fn description(&self) -> MetricDescription {
        self.default.description()
    }

    fn configuration(&self) -> &MetricConfiguration {
        self.default.configuration()
    }

    fn initialize(
        &mut self,
        manager: &DataManager,
        config: &AnonymizationConfig,
    ) -> MetricResult<()> {
        let ratio = distinct_value_ratio(manager);
        let precompute = ratio <= self.threshold;
        debug!(
            "{}: distinct value ratio {ratio:.4}, threshold {}, precomputed: {precompute}",
            self.default.name(),
            self.threshold
        );
        if precompute {
            self.precomputed.initialize(manager, config)?;
        } else {
            self.default.initialize(manager, config)?;
        }
        self.selected = Some(precompute);
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.selected.is_some()
    }

    fn information_loss(
        &self,
        transformation: &Transformation,
        classes: &EquivalenceClasses,
    ) -> MetricResult<LossWithBound> {
        self.active()?.information_loss(transformation, classes)
    }

    fn information_loss_of_class(
        &self,
        transformation: &Transformation,
        class: &EquivalenceClass,
    ) -> MetricResult<LossWithBound> {
        self.active()?.information_loss_of_class(transformation, class)
    }

    fn lower_bound(&self, transformation: &Transformation) -> MetricResult<Option<InformationLoss>> {
        self.active()?.lower_bound(transformation)
    }

    fn lower_bound_with_classes(
        &self,
        transformation: &Transformation,
        classes: &EquivalenceClasses,
    ) -> MetricResult<Option<InformationLoss>> {
        self.active()?.lower_bound_with_classes(transformation, classes)
    }

    fn score(
        &self,
        transformation: &Transformation,
        classes: &EquivalenceClasses,
    ) -> MetricResult<InformationLoss> {
        self.active()?.score(transformation, classes)
    }

    fn score_sensitivity(&self) -> MetricResult<f64> {
        self.active()?.score_sensitivity()
    }

    fn minimal_information_loss(&self) -> MetricResult<InformationLoss> {
        self.active()?.minimal_information_loss()
    }

    fn maximal_information_loss(&self) -> MetricResult<InformationLoss> {
        self.active()?.maximal_information_loss()
    }

    fn is_monotonic_with_generalization(&self) -> bool {
        self.default.is_monotonic_with_generalization()
    }

    fn is_monotonic_with_suppression(&self) -> bool {
        self.default.is_monotonic_with_suppression()
    }

    fn is_precomputed(&self) -> bool {
        self.selected == Some(true)
    }

    fn render(&self, config: &AnonymizationConfig) -> ElementData {
        match self.active() {
            Ok(metric) => metric.render(config),
            Err(_) => self.default.render(config),
        }
    }
}
