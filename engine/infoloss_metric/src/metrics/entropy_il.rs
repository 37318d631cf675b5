//! Entropy-based information loss.
//!
//! A released value that stands for `n` original values costs `log2(n)` bits per row.
//! The sum over rows and attributes is divided by its value when every row is suppressed.

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

const NAME: &str = "Entropy-based information loss";

const DESCRIPTION: MetricDescription = MetricDescription::named(NAME);

#[derive(Debug)]
pub struct EntropyBasedMetric {
    configuration: MetricConfiguration,
    state: SingleDimensionalState,
    shares: Vec<Box<dyn DomainShare>>,
    /// `log2` of each domain size.
    bits: Vec<f64>,
}

impl EntropyBasedMetric {
    pub fn new(configuration: MetricConfiguration) -> Self {
        EntropyBasedMetric {
            configuration,
            state: SingleDimensionalState::new(NAME),
            shares: Vec::new(),
            bits: Vec::new(),
        }
    }

    /// Bits lost per row of a released class.
    fn released(&self, transformation: &Transformation, class: &EquivalenceClass) -> f64 {
        self.shares
            .iter()
            .enumerate()
            .map(|(d, share)| {
                let level = transformation.level(d);
                (share.share(class.key[d], level) * share.domain_size()).log2()
            })
            .sum()
    }

    fn suppressed(&self) -> f64 {
        self.bits.iter().sum()
    }

    /// Unnormalized loss and bound of one class.
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
            (count * self.suppressed(), released)
        }
    }

    fn normalize(&self, value: f64) -> f64 {
        let max = self.state.rows() * self.suppressed();
        if max > 0.0 {
            round(value / max)
        } else {
            0.0
        }
    }
}

impl Metric for EntropyBasedMetric {
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
        self.bits = self.shares.iter().map(|s| s.domain_size().log2()).collect();
        self.state.initialize(manager, 0.0, 1.0);
        debug!("{NAME}: {} bits per suppressed row", self.suppressed());
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
