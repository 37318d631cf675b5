//! Height: the sum of the generalization levels of a transformation.

use log::debug;

use infoloss_data::{
    AnonymizationConfig, DataManager, EquivalenceClass, EquivalenceClasses, Transformation,
};
use infoloss_value::{InformationLoss, LossWithBound};

use crate::base::SingleDimensionalState;
use crate::config::MetricConfiguration;
use crate::description::MetricDescription;
use crate::error::MetricResult;
use crate::metric::Metric;

const NAME: &str = "Height";

const DESCRIPTION: MetricDescription = MetricDescription::named(NAME);

#[derive(Debug)]
pub struct HeightMetric {
    configuration: MetricConfiguration,
    state: SingleDimensionalState,
}

impl HeightMetric {
    pub fn new(configuration: MetricConfiguration) -> Self {
        HeightMetric {
            configuration,
            state: SingleDimensionalState::new(NAME),
        }
    }

    fn height(&self, transformation: &Transformation) -> MetricResult<LossWithBound> {
        self.state.check(transformation)?;
        let loss = InformationLoss::single(transformation.total_level() as f64);
        Ok(LossWithBound::new(loss.clone(), Some(loss)))
    }
}

impl Metric for HeightMetric {
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
        let max: usize = manager.hierarchies().iter().map(|h| h.max_level()).sum();
        self.state.initialize(manager, 0.0, max as f64);
        debug!("{NAME}: lattice height {max}");
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.state.is_initialized()
    }

    fn information_loss(
        &self,
        transformation: &Transformation,
        _classes: &EquivalenceClasses,
    ) -> MetricResult<LossWithBound> {
        self.height(transformation)
    }

    fn information_loss_of_class(
        &self,
        transformation: &Transformation,
        _class: &EquivalenceClass,
    ) -> MetricResult<LossWithBound> {
        self.height(transformation)
    }

    fn lower_bound(&self, transformation: &Transformation) -> MetricResult<Option<InformationLoss>> {
        Ok(Some(self.height(transformation)?.information_loss))
    }

    fn minimal_information_loss(&self) -> MetricResult<InformationLoss> {
        self.state.min_loss()
    }

    fn maximal_information_loss(&self) -> MetricResult<InformationLoss> {
        self.state.max_loss()
    }

    fn is_monotonic_with_suppression(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::people_manager;

    #[test]
    fn test_sum_of_levels() {
        let mut metric = HeightMetric::new(MetricConfiguration::default());
        metric
            .initialize(&people_manager(), &AnonymizationConfig::default())
            .unwrap();
        let loss = metric
            .information_loss(&Transformation::new(vec![2, 1]), &EquivalenceClasses::new())
            .unwrap();
        assert_eq!(loss.information_loss.value(), 3.0);
        assert_eq!(metric.maximal_information_loss().unwrap().value(), 3.0);
        assert!(metric.is_monotonic(0.5));
    }
}
