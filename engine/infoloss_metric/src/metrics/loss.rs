//! Loss: the fraction of each attribute's domain a released value stands for.

use std::sync::OnceLock;

use log::{debug, trace};
use num_rational::BigRational;

use infoloss_data::{
    AnonymizationConfig, DataManager, EquivalenceClass, EquivalenceClasses,
    GeneralizationHierarchy, Transformation,
};
use infoloss_domain::{
    create_domain_shares, create_reliable_shares, Cardinalities, DomainShare, DomainShareReliable,
};
use infoloss_value::{InformationLoss, LossWithBound};

use crate::base::{round, MultiDimensionalState, ScoreParameters};
use crate::config::MetricConfiguration;
use crate::description::MetricDescription;
use crate::error::{MetricError, MetricResult};
use crate::metric::Metric;
use crate::precomputed::PotentiallyPrecomputed;
use crate::score::ScoreNumber;

const NAME: &str = "Loss";

const DESCRIPTION: MetricDescription = MetricDescription::named(NAME)
    .with_attribute_weights()
    .with_gs_factor()
    .with_precomputation()
    .with_aggregate_function()
    .with_score();

/// Loss computed from the equivalence classes.
#[derive(Debug)]
pub struct LossMetric {
    configuration: MetricConfiguration,
    state: MultiDimensionalState,
    shares: Vec<Box<dyn DomainShare>>,
    reliable: Vec<DomainShareReliable>,
    scores: Option<ScoreParameters>,
}

impl LossMetric {
    pub fn new(configuration: MetricConfiguration) -> Self {
        LossMetric {
            state: MultiDimensionalState::new(NAME, &configuration),
            configuration,
            shares: Vec::new(),
            reliable: Vec::new(),
            scores: None,
        }
    }

    /// The metric, wrapped in a precomputation switch if the configuration asks for it.
    pub fn potentially_precomputed(
        configuration: MetricConfiguration,
    ) -> MetricResult<Box<dyn Metric>> {
        if !configuration.precomputed {
            return Ok(Box::new(LossMetric::new(configuration)));
        }
        let threshold = configuration.precomputation_threshold;
        Ok(Box::new(PotentiallyPrecomputed::new(
            Box::new(LossMetric::new(configuration.clone())),
            Box::new(LossMetricPrecomputed::new(configuration)),
            threshold,
        )?))
    }

    fn share(&self, dimension: usize, value: i32, level: usize) -> f64 {
        self.shares[dimension].share(value, level)
    }

    /// Contribution of a suppressed class with the given count and share.
    fn suppressed(&self, count: f64, share: f64) -> f64 {
        let s_factor = self.state.s_factor();
        if s_factor == 1.0 {
            count
        } else {
            count * share + s_factor * (count - count * share)
        }
    }

    /// Adds the contribution of one class to `loss` and `bound`.
    fn accumulate(
        &self,
        transformation: &Transformation,
        class: &EquivalenceClass,
        loss: &mut [f64],
        bound: &mut [f64],
    ) {
        if class.count == 0 {
            return;
        }
        let count = class.count as f64;
        let g_factor = self.state.g_factor();
        for dimension in 0..loss.len() {
            let share = self.share(
                dimension,
                class.key[dimension],
                transformation.level(dimension),
            );
            bound[dimension] += count * share * g_factor;
            loss[dimension] += if class.is_not_outlier {
                count * share * g_factor
            } else {
                self.suppressed(count, share)
            };
        }
    }

    /// Per-dimension sums before normalization.
    pub fn raw_information_loss(
        &self,
        transformation: &Transformation,
        classes: &EquivalenceClasses,
    ) -> MetricResult<Vec<f64>> {
        self.state.check(transformation)?;
        let dimensions = self.state.dimensions();
        let mut loss = vec![0.0; dimensions];
        let mut bound = vec![0.0; dimensions];
        for class in classes {
            self.accumulate(transformation, class, &mut loss, &mut bound);
        }
        Ok(loss)
    }

    /// Maps a per-dimension sum to `[0, 1]`: zero for ungeneralized data, one for data
    /// generalized to the top.
    fn normalize(&self, aggregate: f64, dimension: usize) -> f64 {
        let rows = self.state.rows();
        let min = self.state.g_factor() * rows / self.shares[dimension].domain_size();
        let result = (aggregate - min) / (rows - min);
        if result.is_finite() && result >= 0.0 {
            round(result)
        } else {
            0.0
        }
    }

    fn create(&self, loss: Vec<f64>, bound: Vec<f64>) -> MetricResult<LossWithBound> {
        let loss = loss
            .iter()
            .enumerate()
            .map(|(d, &v)| self.normalize(v, d))
            .collect();
        let bound = bound
            .iter()
            .enumerate()
            .map(|(d, &v)| self.normalize(v, d))
            .collect();
        Ok(LossWithBound::new(
            self.state.create_loss(loss)?,
            Some(self.state.create_loss(bound)?),
        ))
    }

    /// Negated sum of the mean share of released rows plus one per suppressed row.
    ///
    /// Adding a row changes the sum by at most `k`: either by at most one, or by moving a
    /// class of `k - 1` suppressed rows into a released class of `k` rows.
    fn score_with<S: ScoreNumber>(
        &self,
        transformation: &Transformation,
        classes: &EquivalenceClasses,
        share: impl Fn(usize, i32, usize) -> S,
    ) -> S {
        let dimensions = self.state.dimensions();
        let mut total = S::zero();
        if dimensions == 0 {
            return total;
        }
        for class in classes.iter().filter(|c| c.count > 0) {
            let count = S::from_count(class.count);
            if class.is_not_outlier {
                let mut sum = S::zero();
                for d in 0..dimensions {
                    sum = sum + share(d, class.key[d], transformation.level(d));
                }
                total = total + count * sum / S::from_count(dimensions);
            } else {
                total = total + count;
            }
        }
        -total
    }

    fn initialize_state(
        &mut self,
        manager: &DataManager,
        config: &AnonymizationConfig,
    ) -> MetricResult<()> {
        self.configuration.validate()?;
        self.state.initialize(manager, config);
        self.shares = create_domain_shares(manager)?;
        let scores = ScoreParameters::from_config(config);
        if scores.reliable {
            self.reliable = create_reliable_shares(manager)?;
        }
        self.scores = Some(scores);
        let dimensions = self.state.dimensions();
        self.state
            .set_min_max(vec![0.0; dimensions], vec![1.0; dimensions])?;
        Ok(())
    }
}

impl Metric for LossMetric {
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
        self.initialize_state(manager, config)?;
        debug!(
            "{NAME}: {} dimensions, gFactor {}, sFactor {}, domain sizes {:?}",
            self.state.dimensions(),
            self.state.g_factor(),
            self.state.s_factor(),
            self.shares.iter().map(|s| s.domain_size()).collect::<Vec<_>>()
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
        self.create(loss, bound)
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

    fn score(
        &self,
        transformation: &Transformation,
        classes: &EquivalenceClasses,
    ) -> MetricResult<InformationLoss> {
        self.state.check(transformation)?;
        let scores = self.scores.ok_or(MetricError::NotInitialized(NAME))?;
        scores.require_private()?;
        Ok(if scores.reliable {
            self.score_with::<BigRational>(transformation, classes, |d, value, level| {
                self.reliable[d].share_exact(value, level)
            })
            .into_loss()
        } else {
            self.score_with::<f64>(transformation, classes, |d, value, level| {
                self.share(d, value, level)
            })
            .into_loss()
        })
    }

    fn score_sensitivity(&self) -> MetricResult<f64> {
        let scores = self.scores.ok_or(MetricError::NotInitialized(NAME))?;
        Ok(scores.k as f64)
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

/// Loss computed from cached per-level totals.
///
/// The total share of all rows on a level is computed once from the value frequencies;
/// an evaluation only visits suppressed classes to replace their generalization loss
/// with the suppression penalty.
#[derive(Debug)]
pub struct LossMetricPrecomputed {
    inner: LossMetric,
    hierarchies: Vec<GeneralizationHierarchy>,
    cardinalities: Option<Cardinalities>,
    totals: Vec<Vec<OnceLock<f64>>>,
}

impl LossMetricPrecomputed {
    pub fn new(configuration: MetricConfiguration) -> Self {
        LossMetricPrecomputed {
            inner: LossMetric::new(configuration),
            hierarchies: Vec::new(),
            cardinalities: None,
            totals: Vec::new(),
        }
    }

    /// Sum of the shares of all rows on `level`.
    fn total(&self, cardinalities: &Cardinalities, dimension: usize, level: usize) -> f64 {
        *self.totals[dimension][level].get_or_init(|| {
            let hierarchy = &self.hierarchies[dimension];
            (0..hierarchy.leaves() as i32)
                .map(|leaf| {
                    let count = cardinalities.get(dimension, leaf, 0);
                    if count == 0 {
                        0.0
                    } else {
                        count as f64 * self.inner.share(dimension, hierarchy.get(leaf, level), level)
                    }
                })
                .sum()
        })
    }
}

impl Metric for LossMetricPrecomputed {
    fn description(&self) -> MetricDescription {
        DESCRIPTION
    }

    fn configuration(&self) -> &MetricConfiguration {
        &self.inner.configuration
    }

    fn initialize(
        &mut self,
        manager: &DataManager,
        config: &AnonymizationConfig,
    ) -> MetricResult<()> {
        self.inner.initialize_state(manager, config)?;
        self.hierarchies = manager.hierarchies().to_vec();
        self.cardinalities = Some(Cardinalities::from_manager(manager));
        self.totals = self
            .hierarchies
            .iter()
            .map(|h| (0..h.height()).map(|_| OnceLock::new()).collect())
            .collect();
        debug!(
            "{NAME}: precomputed variant with {} dimensions",
            self.hierarchies.len()
        );
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.cardinalities.is_some()
    }

    fn information_loss(
        &self,
        transformation: &Transformation,
        classes: &EquivalenceClasses,
    ) -> MetricResult<LossWithBound> {
        self.inner.state.check(transformation)?;
        let cardinalities = self
            .cardinalities
            .as_ref()
            .ok_or(MetricError::NotInitialized(NAME))?;
        let g_factor = self.inner.state.g_factor();
        let dimensions = self.inner.state.dimensions();

        let bound: Vec<f64> = (0..dimensions)
            .map(|d| g_factor * self.total(cardinalities, d, transformation.level(d)))
            .collect();
        let mut loss = bound.clone();
        for class in classes.iter().filter(|c| !c.is_not_outlier && c.count > 0) {
            let count = class.count as f64;
            for (d, value) in loss.iter_mut().enumerate() {
                let share = self
                    .inner
                    .share(d, class.key[d], transformation.level(d));
                *value += self.inner.suppressed(count, share) - count * share * g_factor;
            }
        }
        self.inner.create(loss, bound)
    }

    fn information_loss_of_class(
        &self,
        transformation: &Transformation,
        class: &EquivalenceClass,
    ) -> MetricResult<LossWithBound> {
        self.inner.information_loss_of_class(transformation, class)
    }

    fn score(
        &self,
        transformation: &Transformation,
        classes: &EquivalenceClasses,
    ) -> MetricResult<InformationLoss> {
        self.inner.score(transformation, classes)
    }

    fn score_sensitivity(&self) -> MetricResult<f64> {
        self.inner.score_sensitivity()
    }

    fn minimal_information_loss(&self) -> MetricResult<InformationLoss> {
        self.inner.minimal_information_loss()
    }

    fn maximal_information_loss(&self) -> MetricResult<InformationLoss> {
        self.inner.maximal_information_loss()
    }

    fn is_monotonic_with_suppression(&self) -> bool {
        false
    }

    fn is_precomputed(&self) -> bool {
        true
    }
}
