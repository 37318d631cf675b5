//! The contract every information-loss metric implements.

use std::fmt;

use infoloss_data::{
    AnonymizationConfig, DataManager, EquivalenceClass, EquivalenceClasses, Transformation,
};
use infoloss_value::{InformationLoss, LossWithBound};

use crate::config::MetricConfiguration;
use crate::description::{ElementData, MetricDescription};
use crate::error::{MetricError, MetricResult};

/// An information-loss metric.
///
/// A metric is created from a [`MetricConfiguration`], initialized once with the encoded
/// dataset, and then evaluated for many transformations. Everything built during
/// initialization is read-only afterwards, so one initialized metric can be shared by
/// threads evaluating different transformations.
pub trait Metric: Send + Sync + fmt::Debug {
    fn description(&self) -> MetricDescription;

    fn configuration(&self) -> &MetricConfiguration;

    fn name(&self) -> &'static str {
        self.description().name
    }

    /// Builds the tables the metric needs. Must be called exactly once before evaluation.
    fn initialize(
        &mut self,
        manager: &DataManager,
        config: &AnonymizationConfig,
    ) -> MetricResult<()>;

    fn is_initialized(&self) -> bool;

    /// Loss of a transformation given its equivalence classes, with a bound for pruning.
    fn information_loss(
        &self,
        transformation: &Transformation,
        classes: &EquivalenceClasses,
    ) -> MetricResult<LossWithBound>;

    /// Unnormalized contribution of a single class.
    fn information_loss_of_class(
        &self,
        _transformation: &Transformation,
        _class: &EquivalenceClass,
    ) -> MetricResult<LossWithBound> {
        Err(MetricError::Unsupported {
            metric: self.name(),
            operation: "per-class evaluation",
        })
    }

    /// Bound that depends on the generalization levels only.
    fn lower_bound(&self, _transformation: &Transformation) -> MetricResult<Option<InformationLoss>> {
        Ok(None)
    }

    /// Bound computed from the classes while ignoring suppression.
    fn lower_bound_with_classes(
        &self,
        transformation: &Transformation,
        classes: &EquivalenceClasses,
    ) -> MetricResult<Option<InformationLoss>> {
        Ok(self.information_loss(transformation, classes)?.lower_bound)
    }

    /// Score for differentially private selection; higher is better.
    fn score(
        &self,
        _transformation: &Transformation,
        _classes: &EquivalenceClasses,
    ) -> MetricResult<InformationLoss> {
        Err(MetricError::Unsupported {
            metric: self.name(),
            operation: "scores",
        })
    }

    /// Largest change of the score when one row is added or removed.
    fn score_sensitivity(&self) -> MetricResult<f64> {
        Err(MetricError::Unsupported {
            metric: self.name(),
            operation: "scores",
        })
    }

    fn minimal_information_loss(&self) -> MetricResult<InformationLoss>;

    fn maximal_information_loss(&self) -> MetricResult<InformationLoss>;

    fn is_monotonic_with_generalization(&self) -> bool {
        true
    }

    fn is_monotonic_with_suppression(&self) -> bool;

    /// Whether pruning on this metric is sound for the given suppression limit.
    fn is_monotonic(&self, suppression_limit: f64) -> bool {
        if suppression_limit == 0.0 {
            self.is_monotonic_with_generalization()
        } else {
            self.is_monotonic_with_generalization() && self.is_monotonic_with_suppression()
        }
    }

    fn is_precomputed(&self) -> bool {
        false
    }

    /// Key/value report of the metric for certificates.
    fn render(&self, config: &AnonymizationConfig) -> ElementData {
        render_default(self.description(), self.configuration(), self.is_precomputed(), config)
    }
}

pub(crate) fn render_default(
    description: MetricDescription,
    configuration: &MetricConfiguration,
    precomputed: bool,
    config: &AnonymizationConfig,
) -> ElementData {
    let mut element = ElementData::new("Quality model").with_property("Name", description.name);
    if description.monotonic_variant_supported {
        element = element.with_property("Monotonic", configuration.monotonic);
    }
    if description.gs_factor_supported {
        element = element.with_property("Generalization/suppression factor", configuration.gs_factor);
    }
    if description.aggregate_function_supported {
        element = element.with_property("Aggregate function", configuration.aggregate_function);
    }
    if description.precomputation_supported {
        element = element.with_property("Precomputed", precomputed);
    }
    if description.attribute_weights_supported && !config.attribute_weights.is_empty() {
        let mut weights = ElementData::new("Attribute weights");
        for (attribute, weight) in &config.attribute_weights {
            weights = weights.with_property(attribute.clone(), weight);
        }
        element = element.with_child(weights);
    }
    element
}
