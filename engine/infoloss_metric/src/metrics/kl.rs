//! Kullback-Leibler divergence between the input distribution and the distribution
//! implied by the output.
//!
//! A released class spreads its rows uniformly over the area of its generalized tuple,
//! that is over the product of the number of original values each generalized value
//! stands for. Suppressed rows are spread over the whole domain.

use std::collections::HashMap;

use log::{debug, trace};

use infoloss_data::{AnonymizationConfig, DataManager, EquivalenceClasses, Transformation};
use infoloss_domain::{create_domain_shares, DomainShare};
use infoloss_value::{InformationLoss, LossWithBound};

use crate::base::{round, SingleDimensionalState};
use crate::config::MetricConfiguration;
use crate::description::MetricDescription;
use crate::error::{MetricError, MetricResult};
use crate::matcher::TupleMatcher;
use crate::metric::Metric;

const NAME: &str = "KL-Divergence";

const DESCRIPTION: MetricDescription = MetricDescription::named(NAME);

/// A distinct input tuple: one row holding it and the number of rows that do.
#[derive(Debug, Clone, Copy)]
struct InputTuple {
    representative: usize,
    count: usize,
}

#[derive(Debug)]
pub struct KlDivergenceMetric {
    configuration: MetricConfiguration,
    state: SingleDimensionalState,
    shares: Vec<Box<dyn DomainShare>>,
    matcher: Option<TupleMatcher>,
    /// Distinct tuples of the included rows, in order of first occurrence.
    tuples: Vec<InputTuple>,
    /// Product of all domain sizes.
    domain: f64,
}

impl KlDivergenceMetric {
    pub fn new(configuration: MetricConfiguration) -> Self {
        KlDivergenceMetric {
            configuration,
            state: SingleDimensionalState::new(NAME),
            shares: Vec::new(),
            matcher: None,
            tuples: Vec::new(),
            domain: 1.0,
        }
    }

    fn area(&self, key: &[i32], transformation: &Transformation) -> f64 {
        self.shares
            .iter()
            .enumerate()
            .map(|(d, share)| share.share(key[d], transformation.level(d)) * share.domain_size())
            .product()
    }

    /// Divergence if every row was suppressed.
    fn suppressed_divergence(&self) -> f64 {
        let rows = self.state.rows();
        round(
            self.tuples
                .iter()
                .map(|tuple| {
                    let p = tuple.count as f64 / rows;
                    p * (p * self.domain).log2()
                })
                .sum(),
        )
    }
}

impl Metric for KlDivergenceMetric {
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

        let data = manager.data_generalized();
        let mut index: HashMap<&[i32], usize> = HashMap::new();
        let mut tuples: Vec<InputTuple> = Vec::new();
        for row in (0..data.rows()).filter(|&r| manager.is_included(r)) {
            let position = *index.entry(data.row(row)).or_insert_with(|| {
                tuples.push(InputTuple {
                    representative: row,
                    count: 0,
                });
                tuples.len() - 1
            });
            tuples[position].count += 1;
        }
        self.tuples = tuples;
        self.matcher = Some(TupleMatcher::new(manager));

        self.state.initialize(manager, 0.0, 0.0);
        let max = self.suppressed_divergence();
        self.state.set_min_max(0.0, max);
        debug!(
            "{NAME}: {} distinct tuples, domain of {} tuples",
            self.tuples.len(),
            self.domain
        );
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.matcher.is_some()
    }

    fn information_loss(
        &self,
        transformation: &Transformation,
        classes: &EquivalenceClasses,
    ) -> MetricResult<LossWithBound> {
        self.state.check(transformation)?;
        let matcher = self
            .matcher
            .as_ref()
            .ok_or(MetricError::NotInitialized(NAME))?;
        trace!(
            "{NAME}: evaluating {transformation} for {} tuples",
            self.tuples.len()
        );
        let rows = self.state.rows();
        // Rows of suppressed classes and rows missing from the classes.
        let released: usize = classes
            .iter()
            .filter(|c| c.is_not_outlier)
            .map(|c| c.count)
            .sum();
        let suppressed = (rows as usize).saturating_sub(released);
        let mut divergence = 0.0;
        for tuple in &self.tuples {
            let p = tuple.count as f64 / rows;
            let q = match matcher.get_class(tuple.representative, transformation, classes) {
                Some(class) if class.is_not_outlier && class.count > 0 => {
                    class.count as f64 / (rows * self.area(&class.key, transformation))
                }
                _ if suppressed > 0 => suppressed as f64 / (rows * self.domain),
                _ => {
                    return Err(MetricError::Configuration(format!(
                        "row {} is neither released nor suppressed",
                        tuple.representative
                    )))
                }
            };
            divergence += p * (p / q).log2();
        }
        Ok(LossWithBound::without_bound(InformationLoss::single(round(
            divergence,
        ))))
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
}
