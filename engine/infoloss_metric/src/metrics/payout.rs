//! Publisher payout under a game-theoretic attack model.
//!
//! Every released row earns the publisher `benefit * (1 - IL)`, where `IL` is the
//! entropy-based information loss of its class. If attacking the row pays off for the
//! adversary, the publisher additionally expects to lose `loss * success`. Suppressed
//! rows earn nothing. The metric reports the payout missing to the ideal
//! `rows * benefit`.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use infoloss_data::{
    AnonymizationConfig, DataManager, EquivalenceClass, EquivalenceClasses, Transformation,
};
use infoloss_domain::{create_domain_shares, DomainShare};
use infoloss_value::{InformationLoss, LossWithBound};

use crate::base::{round, SingleDimensionalState};
use crate::config::MetricConfiguration;
use crate::description::{ElementData, MetricDescription};
use crate::error::{MetricError, MetricResult};
use crate::metric::{render_default, Metric};

const NAME: &str = "Publisher payout";

const DESCRIPTION: MetricDescription = MetricDescription::named(NAME);

/// Monetary parameters of the attack model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoutConfiguration {
    /// Benefit of publishing one row without information loss.
    pub publisher_benefit: f64,
    /// Loss of the publisher when a row is re-identified.
    pub publisher_loss: f64,
    /// Gain of the adversary from a successful attack.
    pub adversary_gain: f64,
    /// Cost of the adversary for attacking one row.
    pub adversary_cost: f64,
    /// Journalist model: success probabilities are taken from the population.
    pub journalist: bool,
}

impl Default for PayoutConfiguration {
    fn default() -> Self {
        PayoutConfiguration {
            publisher_benefit: 1200.0,
            publisher_loss: 300.0,
            adversary_gain: 300.0,
            adversary_cost: 4.0,
            journalist: false,
        }
    }
}

impl PayoutConfiguration {
    pub fn validate(&self) -> MetricResult<()> {
        let values = [
            ("publisher benefit", self.publisher_benefit),
            ("publisher loss", self.publisher_loss),
            ("adversary gain", self.adversary_gain),
            ("adversary cost", self.adversary_cost),
        ];
        for (name, value) in values {
            if !value.is_finite() || value < 0.0 {
                return Err(MetricError::Configuration(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Expected payout of one row with the given information loss and success probability.
    pub fn payout(&self, information_loss: f64, success: f64) -> f64 {
        let benefit = self.publisher_benefit * (1.0 - information_loss);
        if self.adversary_gain * success - self.adversary_cost > 0.0 {
            benefit - self.publisher_loss * success
        } else {
            benefit
        }
    }
}

#[derive(Debug)]
pub struct PublisherPayoutMetric {
    configuration: MetricConfiguration,
    payout: PayoutConfiguration,
    state: SingleDimensionalState,
    shares: Vec<Box<dyn DomainShare>>,
    /// Bits of a fully generalized row.
    bits: f64,
}

impl PublisherPayoutMetric {
    pub fn new(configuration: MetricConfiguration, payout: PayoutConfiguration) -> Self {
        PublisherPayoutMetric {
            configuration,
            payout,
            state: SingleDimensionalState::new(NAME),
            shares: Vec::new(),
            bits: 0.0,
        }
    }

    pub fn payout_configuration(&self) -> &PayoutConfiguration {
        &self.payout
    }

    /// Normalized entropy-based loss of one row of a released class.
    fn row_loss(&self, transformation: &Transformation, class: &EquivalenceClass) -> f64 {
        if self.bits <= 0.0 {
            return 0.0;
        }
        let bits: f64 = self
            .shares
            .iter()
            .enumerate()
            .map(|(d, share)| {
                (share.share(class.key[d], transformation.level(d)) * share.domain_size()).log2()
            })
            .sum();
        round(bits / self.bits).min(1.0)
    }

    fn success(&self, class: &EquivalenceClass) -> f64 {
        let size = if self.payout.journalist {
            class.pcount
        } else {
            class.count
        };
        1.0 / size.max(1) as f64
    }

    /// Payout of all rows of a class.
    fn class_payout(&self, transformation: &Transformation, class: &EquivalenceClass) -> f64 {
        if !class.is_not_outlier {
            return 0.0;
        }
        let loss = self.row_loss(transformation, class);
        class.count as f64 * self.payout.payout(loss, self.success(class))
    }
}

impl Metric for PublisherPayoutMetric {
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
        self.payout.validate()?;
        self.shares = create_domain_shares(manager)?;
        self.bits = self.shares.iter().map(|s| s.domain_size().log2()).sum();
        let rows = manager.effective_rows() as f64;
        let max = rows * (self.payout.publisher_benefit + self.payout.publisher_loss);
        self.state.initialize(manager, 0.0, max);
        debug!("{NAME}: {:?}, {rows} rows", self.payout);
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
        let mut payout = 0.0;
        let mut bound = 0.0;
        for class in classes.iter().filter(|c| c.count > 0) {
            payout += self.class_payout(transformation, class);
            bound += class.count as f64
                * self.payout.publisher_benefit
                * self.row_loss(transformation, class);
        }
        let loss = round(self.state.rows() * self.payout.publisher_benefit - payout);
        Ok(LossWithBound::new(
            InformationLoss::single(loss),
            Some(InformationLoss::single(round(bound))),
        ))
    }

    fn information_loss_of_class(
        &self,
        transformation: &Transformation,
        class: &EquivalenceClass,
    ) -> MetricResult<LossWithBound> {
        self.state.check(transformation)?;
        let ideal = class.count as f64 * self.payout.publisher_benefit;
        Ok(LossWithBound::without_bound(InformationLoss::single(
            ideal - self.class_payout(transformation, class),
        )))
    }

    fn minimal_information_loss(&self) -> MetricResult<InformationLoss> {
        self.state.min_loss()
    }

    fn maximal_information_loss(&self) -> MetricResult<InformationLoss> {
        self.state.max_loss()
    }

    fn is_monotonic_with_generalization(&self) -> bool {
        false
    }

    fn is_monotonic_with_suppression(&self) -> bool {
        false
    }

    fn render(&self, config: &AnonymizationConfig) -> ElementData {
        render_default(self.description(), self.configuration(), false, config)
            .with_property("Publisher benefit", self.payout.publisher_benefit)
            .with_property("Publisher loss", self.payout.publisher_loss)
            .with_property("Adversary gain", self.payout.adversary_gain)
            .with_property("Adversary cost", self.payout.adversary_cost)
            .with_property(
                "Attacker model",
                if self.payout.journalist { "Journalist" } else { "Prosecutor" },
            )
    }
}
