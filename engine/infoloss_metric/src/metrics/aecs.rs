//! Average equivalence class size. Suppressed rows form one additional class.

use log::{debug, trace};
use num_rational::BigRational;

use infoloss_data::{
    AnonymizationConfig, DataManager, EquivalenceClass, EquivalenceClasses, Transformation,
};
use infoloss_value::{InformationLoss, LossWithBound};

use crate::base::{ScoreParameters, SingleDimensionalState};
use crate::config::MetricConfiguration;
use crate::description::MetricDescription;
use crate::error::{MetricError, MetricResult};
use crate::metric::Metric;
use crate::score::ScoreNumber;

const NAME: &str = "Average equivalence class size";

const DESCRIPTION: MetricDescription = MetricDescription::named(NAME).with_score();

#[derive(Debug)]
pub struct AecsMetric {
    configuration: MetricConfiguration,
    state: SingleDimensionalState,
    scores: Option<ScoreParameters>,
}

impl AecsMetric {
    pub fn new(configuration: MetricConfiguration) -> Self {
        AecsMetric {
            configuration,
            state: SingleDimensionalState::new(NAME),
            scores: None,
        }
    }

    fn average(&self, classes: usize) -> f64 {
        let rows = self.state.rows();
        if classes == 0 {
            rows
        } else {
            rows / classes as f64
        }
    }
}

impl Metric for AecsMetric {
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
        let rows = manager.effective_rows() as f64;
        self.state.initialize(manager, 1.0, rows.max(1.0));
        self.scores = Some(ScoreParameters::from_config(config));
        debug!("{NAME}: {rows} rows");
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
        let mut released = 0;
        let mut all = 0;
        let mut suppressed = false;
        for class in classes.iter().filter(|c| c.count > 0) {
            all += 1;
            if class.is_not_outlier {
                released += 1;
            } else {
                suppressed = true;
            }
        }
        let loss = self.average(released + usize::from(suppressed));
        Ok(LossWithBound::new(
            InformationLoss::single(loss),
            Some(InformationLoss::single(self.average(all))),
        ))
    }

    fn information_loss_of_class(
        &self,
        transformation: &Transformation,
        class: &EquivalenceClass,
    ) -> MetricResult<LossWithBound> {
        self.state.check(transformation)?;
        let loss = InformationLoss::single(class.count as f64);
        Ok(LossWithBound::new(loss.clone(), Some(loss)))
    }

    /// The number of released classes.
    fn score(
        &self,
        transformation: &Transformation,
        classes: &EquivalenceClasses,
    ) -> MetricResult<InformationLoss> {
        self.state.check(transformation)?;
        let scores = self.scores.ok_or(MetricError::NotInitialized(NAME))?;
        scores.require_private()?;
        let released = classes
            .iter()
            .filter(|c| c.is_not_outlier && c.count > 0)
            .count();
        Ok(if scores.reliable {
            BigRational::from_count(released).into_loss()
        } else {
            f64::from_count(released).into_loss()
        })
    }

    fn score_sensitivity(&self) -> MetricResult<f64> {
        self.state.ensure_initialized()?;
        Ok(1.0)
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
