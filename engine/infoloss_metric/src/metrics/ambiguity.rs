//! Ambiguity: the number of original tuples a released tuple could stand for.

use log::{debug, trace};

use infoloss_data::{
    AnonymizationConfig, DataManager, EquivalenceClass, EquivalenceClasses, Transformation,
};
use infoloss_domain::{create_domain_shares, DomainShare};
use infoloss_value::{InformationLoss, LossWithBound};

use crate::base::{round, SingleDimensionalState};
use crate::config::MetricConfiguration;
use crate::description::MetricDescription;
use crate::error::MetricResult;
use crate::metric::Metric;

const NAME: &str = "Ambiguity";

const DESCRIPTION: MetricDescription = MetricDescription::named(NAME);

#[derive(Debug)]
pub struct AmbiguityMetric {
    configuration: MetricConfiguration,
    state: SingleDimensionalState,
    shares: Vec<Box<dyn DomainShare>>,
    /// Product of all domain sizes: the ambiguity of a suppressed row.
    domain: f64,
}

impl AmbiguityMetric {
    pub fn new(configuration: MetricConfiguration) -> Self {
        AmbiguityMetric {
            configuration,
            state: SingleDimensionalState::new(NAME),
            shares: Vec::new(),
            domain: 1.0,
        }
    }

    fn released(&self, transformation: &Transformation, class: &EquivalenceClass) -> f64 {
        self.shares
            .iter()
            .enumerate()
            .map(|(d, share)| {
                share.share(class.key[d], transformation.level(d)) * share.domain_size()
            })
            .product()
    }

    fn contribution(
        &self,
        transformation: &Transformation,
        class: &EquivalenceClass,
    ) -> (f64, f64) {
        let count = class.count as f64;
        let released = count * self.released(transformation, class);
        if class.is_not_outlier {
            (released, released)
        } else {
            (count * self.domain, released)
        }
    }

    fn normalize(&self, value: f64) -> f64 {
        let max = self.state.rows() * self.domain;
        if max > 0.0 {
            round(value / max)
        } else {
            0.0
        }
    }
}

impl Metric for AmbiguityMetric {
    fn description(&self) -> MetricDescription {
        DESCRIPTION
    }

    fn configuration(&self) -> &MetricConfiguration {
        &self.configuration
    }

    fn initialize(
        &mut self,
        manager: &DataManager,
        _config: &AnonymizationConfig,
    ) -> MetricResult<()> {
        self.shares = create_domain_shares(manager)?;
        self.domain = self.shares.iter().map(|s| s.domain_size()).product();
        let min = if self.domain > 0.0 { 1.0 / self.domain } else { 0.0 };
        self.state.initialize(manager, min, 1.0);
        debug!("{NAME}: {} possible tuples", self.domain);
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
        let (loss, bound) = classes
            .iter()
            .filter(|c| c.count > 0)
            .map(|c| self.contribution(transformation, c))
            .fold((0.0, 0.0), |(l, b), (cl, cb)| (l + cl, b + cb));
        Ok(LossWithBound::new(
            InformationLoss::single(self.normalize(loss)),
            Some(InformationLoss::single(self.normalize(bound))),
        ))
    }

    fn information_loss_of_class(
        &self,
        transformation: &Transformation,
        class: &EquivalenceClass,
    ) -> MetricResult<LossWithBound> {
        self.state.check(transformation)?;
        let (loss, bound) = self.contribution(transformation, class);
        Ok(LossWithBound::new(
            InformationLoss::single(loss),
            Some(InformationLoss::single(bound)),
        ))
    }

    fn minimal_information_loss(&self) -> MetricResult<InformationLoss> {
        self.state.min_loss()
    }

    fn maximal_information_loss(&self) -> MetricResult<InformationLoss> {
        self.state.max_loss()
    }

    fn is_monotonic_with_suppression(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{group, people_manager};
    use approx::assert_relative_eq;

    #[test]
    fn test_possible_tuples() {
        let manager = people_manager();
        let mut metric = AmbiguityMetric::new(MetricConfiguration::default());
        metric
            .initialize(&manager, &AnonymizationConfig::default())
            .unwrap();

        // Ages generalized to groups of four, sex kept: 4 tuples per row out of 16.
        let transformation = Transformation::new(vec![1, 0]);
        let loss = metric
            .information_loss(&transformation, &group(&manager, &transformation, 0))
            .unwrap();
        assert_relative_eq!(loss.information_loss.value(), 0.25);

        let bottom = Transformation::new(vec![0, 0]);
        let loss = metric
            .information_loss(&bottom, &group(&manager, &bottom, 100))
            .unwrap();
        assert_relative_eq!(loss.information_loss.value(), 1.0);
        assert_relative_eq!(loss.lower_bound.unwrap().value(), 1.0 / 16.0);
        assert_relative_eq!(metric.minimal_information_loss().unwrap().value(), 1.0 / 16.0);
    }
}
