//! Classification accuracy of a majority-vote classifier trained on the output.
//!
//! Within a released class every row is predicted the most frequent value of each
//! response variable; misclassified rows are penalized. For a response variable that is
//! also a quasi-identifier the vote runs over the original values of the class rows, and
//! the correctly predicted rows are additionally penalized in proportion to the distinct
//! values lost by its generalization. Suppressed rows are always penalized.

use std::collections::HashMap;

use log::{debug, trace};
use num_rational::BigRational;

use infoloss_data::{
    AnonymizationConfig, DataManager, Distribution, EquivalenceClass, EquivalenceClasses,
    Transformation,
};
use infoloss_value::{InformationLoss, LossWithBound};

use crate::base::{round, ScoreParameters, SingleDimensionalState};
use crate::config::MetricConfiguration;
use crate::description::MetricDescription;
use crate::error::{MetricError, MetricResult};
use crate::matcher::TupleMatcher;
use crate::metric::Metric;
use crate::score::ScoreNumber;

const NAME: &str = "Classification accuracy";

const DESCRIPTION: MetricDescription = MetricDescription::named(NAME).with_score();

/// Where the values of a response variable are found.
#[derive(Debug, Clone)]
enum ResponseVariable {
    /// Index into the class distributions.
    Analyzed(usize),
    /// Quasi-identifier index and the number of distinct values per level.
    QuasiIdentifier(usize, Vec<usize>),
}

/// Original values of the quasi-identifying response variables, per generalized key and
/// quasi-identifier.
type Votes = HashMap<Vec<i32>, HashMap<usize, Distribution>>;

#[derive(Debug)]
pub struct ClassificationMetric {
    configuration: MetricConfiguration,
    state: SingleDimensionalState,
    responses: Vec<ResponseVariable>,
    scores: Option<ScoreParameters>,
    /// Present when a response variable is a quasi-identifier.
    matcher: Option<TupleMatcher>,
    included: Vec<usize>,
}

impl ClassificationMetric {
    pub fn new(configuration: MetricConfiguration) -> Self {
        ClassificationMetric {
            configuration,
            state: SingleDimensionalState::new(NAME),
            responses: Vec::new(),
            scores: None,
            matcher: None,
            included: Vec::new(),
        }
    }

    /// Distributions of the original values of every quasi-identifying response variable
    /// among the rows of each class.
    fn votes(&self, transformation: &Transformation) -> Votes {
        let mut votes = Votes::new();
        let Some(matcher) = &self.matcher else {
            return votes;
        };
        for &row in &self.included {
            let entry = votes.entry(matcher.key(row, transformation)).or_default();
            for response in &self.responses {
                if let ResponseVariable::QuasiIdentifier(dimension, _) = response {
                    entry
                        .entry(*dimension)
                        .or_default()
                        .add(matcher.value(row, *dimension), 1);
                }
            }
        }
        votes
    }

    /// Penalty of one class, summed over all response variables.
    fn penalty<S: ScoreNumber>(
        &self,
        transformation: &Transformation,
        class: &EquivalenceClass,
        votes: &Votes,
    ) -> MetricResult<S> {
        let count = S::from_count(class.count);
        let mut penalty = S::zero();
        for response in &self.responses {
            if !class.is_not_outlier {
                penalty = penalty + count.clone();
                continue;
            }
            penalty = penalty
                + match response {
                    ResponseVariable::Analyzed(index) => {
                        let distribution = class.distributions.get(*index).ok_or_else(|| {
                            MetricError::Configuration(format!(
                                "class {:?} carries no distribution of response variable {index}",
                                class.key
                            ))
                        })?;
                        let majority = distribution.mode().map_or(0, |(_, n)| n);
                        S::from_count(class.count.saturating_sub(majority))
                    }
                    ResponseVariable::QuasiIdentifier(dimension, distinct) => {
                        let majority = votes
                            .get(&class.key)
                            .and_then(|values| values.get(dimension))
                            .and_then(Distribution::mode)
                            .map_or(class.count, |(_, n)| n.min(class.count));
                        let wrong = S::from_count(class.count - majority);
                        let level = transformation.level(*dimension);
                        if distinct[0] <= 1 {
                            wrong
                        } else {
                            let scale = S::ratio(distinct[level] - 1, distinct[0] - 1);
                            wrong + S::from_count(majority) * (S::one() - scale)
                        }
                    }
                };
        }
        Ok(penalty)
    }

    fn total_penalty<S: ScoreNumber>(
        &self,
        transformation: &Transformation,
        classes: &EquivalenceClasses,
    ) -> MetricResult<S> {
        let votes = self.votes(transformation);
        let mut total = S::zero();
        for class in classes.iter().filter(|c| c.count > 0) {
            total = total + self.penalty::<S>(transformation, class, &votes)?;
        }
        Ok(total)
    }
}

impl Metric for ClassificationMetric {
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
        let variables = manager.definition().response_variables();
        if variables.is_empty() {
            return Err(MetricError::Configuration(
                "classification accuracy requires at least one response variable".to_string(),
            ));
        }
        let mut responses = Vec::with_capacity(variables.len());
        for variable in variables {
            let response = if let Some(dimension) = manager.index_of_quasi_identifier(variable) {
                let hierarchy = &manager.hierarchies()[dimension];
                let distinct = (0..hierarchy.height())
                    .map(|level| hierarchy.distinct_values(level))
                    .collect();
                ResponseVariable::QuasiIdentifier(dimension, distinct)
            } else if let Some(index) = manager.index_of_analyzed(variable) {
                ResponseVariable::Analyzed(index)
            } else {
                return Err(MetricError::Configuration(format!(
                    "response variable '{variable}' is not part of the data"
                )));
            };
            responses.push(response);
        }
        let quasi_identifying = responses
            .iter()
            .any(|r| matches!(r, ResponseVariable::QuasiIdentifier(..)));
        self.matcher = quasi_identifying.then(|| TupleMatcher::new(manager));
        self.included = if quasi_identifying {
            (0..manager.rows()).filter(|&r| manager.is_included(r)).collect()
        } else {
            Vec::new()
        };
        self.responses = responses;
        self.scores = Some(ScoreParameters::from_config(config));
        self.state.initialize(manager, 0.0, 1.0);
        debug!("{NAME}: response variables {variables:?}");
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
        let penalty: f64 = self.total_penalty(transformation, classes)?;
        let max = self.state.rows() * self.responses.len() as f64;
        let loss = if max > 0.0 { round(penalty / max) } else { 0.0 };
        Ok(LossWithBound::without_bound(InformationLoss::single(loss)))
    }

    /// The negated penalty.
    fn score(
        &self,
        transformation: &Transformation,
        classes: &EquivalenceClasses,
    ) -> MetricResult<InformationLoss> {
        self.state.check(transformation)?;
        let scores = self.scores.ok_or(MetricError::NotInitialized(NAME))?;
        scores.require_private()?;
        Ok(if scores.reliable {
            (-self.total_penalty::<BigRational>(transformation, classes)?).into_loss()
        } else {
            (-self.total_penalty::<f64>(transformation, classes)?).into_loss()
        })
    }

    fn score_sensitivity(&self) -> MetricResult<f64> {
        let scores = self.scores.ok_or(MetricError::NotInitialized(NAME))?;
        Ok((scores.k * self.responses.len()) as f64)
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
