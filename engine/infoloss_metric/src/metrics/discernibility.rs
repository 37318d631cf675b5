//! Discernibility: every row is charged the size of the class it cannot be told apart from.
//!
//! The monotonic variant (DM*) charges suppressed rows like released ones. The default
//! variant charges every suppressed row the size of the whole dataset.

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

const NAME: &str = "Discernibility";

const DESCRIPTION: MetricDescription = MetricDescription::named(NAME)
    .with_monotonic_variant()
    .with_score();

/// Largest change of the score when one row is added or removed.
const SENSITIVITY: f64 = 5.0;

#[derive(Debug)]
pub struct DiscernibilityMetric {
    configuration: MetricConfiguration,
    state: SingleDimensionalState,
    scores: Option<ScoreParameters>,
}

impl DiscernibilityMetric {
    pub fn new(configuration: MetricConfiguration) -> Self {
        DiscernibilityMetric {
            configuration,
            state: SingleDimensionalState::new(NAME),
            scores: None,
        }
    }

    /// DM*, which ignores suppression.
    pub fn monotonic(configuration: MetricConfiguration) -> Self {
        Self::new(configuration.with_monotonic(true))
    }

    fn contribution(&self, class: &EquivalenceClass) -> (f64, f64) {
        let count = class.count as f64;
        let bound = count * count;
        if class.is_not_outlier || self.configuration.monotonic {
            (bound, bound)
        } else {
            (count * self.state.rows(), bound)
        }
    }

    /// `-(sum of c^2 / (c - 1) over released classes + suppressed rows)`, with classes of
    /// one row charged one.
    fn score_with<S: ScoreNumber>(&self, classes: &EquivalenceClasses) -> S {
        let mut total = S::zero();
        for class in classes.iter().filter(|c| c.count > 0) {
            total = total
                + if !class.is_not_outlier {
                    S::from_count(class.count)
                } else if class.count == 1 {
                    S::one()
                } else {
                    S::ratio(class.count * class.count, class.count - 1)
                };
        }
        -total
    }
}

impl Metric for DiscernibilityMetric {
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
        self.state.initialize(manager, rows, rows * rows);
        self.scores = Some(ScoreParameters::from_config(config));
        debug!(
            "{NAME}: {rows} rows, monotonic {}",
            self.configuration.monotonic
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
        let (loss, bound) = classes
            .iter()
            .map(|c| self.contribution(c))
            .fold((0.0, 0.0), |(l, b), (cl, cb)| (l + cl, b + cb));
        Ok(LossWithBound::new(
            InformationLoss::single(loss),
            Some(InformationLoss::single(bound)),
        ))
    }

    fn information_loss_of_class(
        &self,
        transformation: &Transformation,
        class: &EquivalenceClass,
    ) -> MetricResult<LossWithBound> {
        self.state.check(transformation)?;
        let (loss, bound) = self.contribution(class);
        Ok(LossWithBound::new(
            InformationLoss::single(loss),
            Some(InformationLoss::single(bound)),
        ))
    }

    fn score(
        &self,
        transformation: &Transformation,
        classes: &EquivalenceClasses,
    ) -> MetricResult<InformationLoss> {
        self.state.check(transformation)?;
        let scores = self.scores.ok_or(MetricError::NotInitialized(NAME))?;
        scores.require_private()?;
        Ok(if scores.reliable {
            self.score_with::<BigRational>(classes).into_loss()
        } else {
            self.score_with::<f64>(classes).into_loss()
        })
    }

    fn score_sensitivity(&self) -> MetricResult<f64> {
        self.state.ensure_initialized()?;
        Ok(SENSITIVITY)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{group, zip_manager};
    use pretty_assertions::assert_eq;

    fn classes() -> EquivalenceClasses {
        vec![
            EquivalenceClass::new(vec![0], 3),
            EquivalenceClass::new(vec![1], 3),
            EquivalenceClass::new(vec![2], 2).suppressed(),
        ]
        .into_iter()
        .collect()
    }

    fn initialized(metric: DiscernibilityMetric, config: &AnonymizationConfig) -> DiscernibilityMetric {
        let mut metric = metric;
        metric.initialize(&zip_manager(), config).unwrap();
        metric
    }

    #[test]
    fn test_suppressed_rows_are_charged_the_dataset_size() {
        let metric = initialized(
            DiscernibilityMetric::new(MetricConfiguration::default()),
            &AnonymizationConfig::default(),
        );
        let loss = metric
            .information_loss(&Transformation::new(vec![0]), &classes())
            .unwrap();
        assert_eq!(loss.information_loss.value(), 9.0 + 9.0 + 2.0 * 8.0);
        assert_eq!(loss.lower_bound.map(|b| b.value()), Some(22.0));
    }

    #[test]
    fn test_monotonic_variant_ignores_suppression() {
        let metric = initialized(
            DiscernibilityMetric::monotonic(MetricConfiguration::default()),
            &AnonymizationConfig::default(),
        );
        assert!(metric.is_monotonic(0.1));
        let loss = metric
            .information_loss(&Transformation::new(vec![0]), &classes())
            .unwrap();
        assert_eq!(loss.information_loss.value(), 22.0);
    }

    #[test]
    fn test_extrema() {
        let metric = initialized(
            DiscernibilityMetric::new(MetricConfiguration::default()),
            &AnonymizationConfig::default(),
        );
        assert_eq!(metric.minimal_information_loss().unwrap().value(), 8.0);
        assert_eq!(metric.maximal_information_loss().unwrap().value(), 64.0);
        let manager = zip_manager();
        let top = Transformation::new(vec![2]);
        let loss = metric
            .information_loss(&top, &group(&manager, &top, 0))
            .unwrap();
        assert_eq!(loss.information_loss.value(), 64.0);
    }

    #[test]
    fn test_exact_score() {
        let config = AnonymizationConfig::default()
            .with_differential_privacy(1.0, 1e-5)
            .with_reliable(true);
        let metric = initialized(
            DiscernibilityMetric::new(MetricConfiguration::default()),
            &config,
        );
        let score = metric
            .score(&Transformation::new(vec![0]), &classes())
            .unwrap();
        // 9/2 + 9/2 + 2
        let expected = InformationLoss::reliable_score(-BigRational::from_integer(11.into()));
        assert_eq!(score, expected);
        assert_eq!(metric.score_sensitivity().unwrap(), 5.0);
    }

    #[test]
    fn test_score_requires_differential_privacy() {
        let metric = initialized(
            DiscernibilityMetric::new(MetricConfiguration::default()),
            &AnonymizationConfig::default(),
        );
        assert!(matches!(
            metric.score(&Transformation::new(vec![0]), &classes()),
            Err(MetricError::Configuration(_))
        ));
    }
}
