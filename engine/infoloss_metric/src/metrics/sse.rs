//! Sum of squared errors between original values and their generalized group.
//!
//! For every attribute, level and generalized value the average distance of the rows in
//! the group to the group is computed once: for ratio-scaled attributes the squared
//! distance to the group centroid divided by the squared range of the attribute, for all
//! others the probability that two rows of the group differ (Gini impurity).
//!
//! Microaggregated attributes add one dimension each. Their error is read from the value
//! distribution of every class: the squared distance of each value to the class mean or
//! median over the squared range, or for the mode the share of values that differ from it.

use std::collections::HashMap;

use log::{debug, trace};

use infoloss_data::{
    AnonymizationConfig, DataError, DataManager, DataType, Distribution, EquivalenceClass,
    EquivalenceClasses, GeneralizationHierarchy, MicroaggregationFunction, Transformation,
};
use infoloss_domain::Cardinalities;
use infoloss_value::{InformationLoss, LossWithBound};

use crate::base::{round, SingleDimensionalState};
use crate::config::MetricConfiguration;
use crate::description::MetricDescription;
use crate::error::{MetricError, MetricResult};
use crate::metric::Metric;

const NAME: &str = "Sum of squared errors";

const DESCRIPTION: MetricDescription = MetricDescription::named(NAME).with_microaggregation();

/// Average distance per generalized value, for one attribute and level.
type LevelDistances = HashMap<i32, f64>;

/// An analyzed attribute replaced by an aggregate within each class.
#[derive(Debug)]
struct Aggregated {
    attribute: String,
    /// Column in the analyzed matrix and index of the class distribution.
    column: usize,
    function: MicroaggregationFunction,
    /// Numeric value per code, present for the numeric functions.
    numbers: Option<Vec<f64>>,
    range: f64,
    /// Error of one row when its class is suppressed.
    suppressed: f64,
}

impl Aggregated {
    /// Summed error of the rows described by `distribution`.
    fn error(&self, distribution: &Distribution) -> f64 {
        match &self.numbers {
            Some(numbers) => {
                if self.range <= 0.0 {
                    return 0.0;
                }
                let members: Vec<(f64, usize)> = distribution
                    .iter()
                    .filter(|&(_, n)| n > 0)
                    .map(|(code, n)| (numbers[code as usize], n))
                    .collect();
                let center = match self.function {
                    MicroaggregationFunction::Median => median(&members),
                    _ => mean(&members),
                };
                members
                    .iter()
                    .map(|&(x, n)| n as f64 * (x - center) * (x - center))
                    .sum::<f64>()
                    / (self.range * self.range)
            }
            None => distribution
                .mode()
                .map_or(0.0, |(_, n)| (distribution.total() - n) as f64),
        }
    }

    fn distribution<'a>(&self, class: &'a EquivalenceClass) -> MetricResult<&'a Distribution> {
        class
            .distributions
            .get(self.column)
            .ok_or_else(|| DataError::MissingDistribution(self.attribute.clone()).into())
    }
}

fn mean(members: &[(f64, usize)]) -> f64 {
    let total: usize = members.iter().map(|&(_, n)| n).sum();
    if total == 0 {
        return 0.0;
    }
    members.iter().map(|&(x, n)| x * n as f64).sum::<f64>() / total as f64
}

/// Lower weighted median.
fn median(members: &[(f64, usize)]) -> f64 {
    let mut sorted = members.to_vec();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
    let total: usize = sorted.iter().map(|&(_, n)| n).sum();
    let mut seen = 0;
    for (x, n) in sorted {
        seen += n;
        if 2 * seen >= total {
            return x;
        }
    }
    0.0
}

fn centroid_distance(members: &[(f64, usize)], range: f64) -> f64 {
    let total: usize = members.iter().map(|&(_, n)| n).sum();
    if total == 0 || range <= 0.0 {
        return 0.0;
    }
    let total = total as f64;
    let mean = members.iter().map(|&(x, n)| x * n as f64).sum::<f64>() / total;
    let squared: f64 = members
        .iter()
        .map(|&(x, n)| n as f64 * (x - mean) * (x - mean))
        .sum();
    squared / (total * range * range)
}

fn gini_impurity(members: &[(f64, usize)]) -> f64 {
    let total: usize = members.iter().map(|&(_, n)| n).sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - members
        .iter()
        .map(|&(_, n)| {
            let p = n as f64 / total;
            p * p
        })
        .sum::<f64>()
}

/// Distances of every level of one attribute.
fn attribute_distances(
    hierarchy: &GeneralizationHierarchy,
    cardinalities: &Cardinalities,
    column: usize,
    numbers: Option<&[f64]>,
) -> Vec<LevelDistances> {
    let leaves: Vec<(i32, usize)> = (0..hierarchy.leaves() as i32)
        .map(|leaf| (leaf, cardinalities.get(column, leaf, 0)))
        .filter(|&(_, n)| n > 0)
        .collect();
    let range = numbers.map_or(0.0, |numbers| {
        let present = leaves.iter().map(|&(leaf, _)| numbers[leaf as usize]);
        let (min, max) = present.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
            (lo.min(x), hi.max(x))
        });
        if min.is_finite() && max.is_finite() {
            max - min
        } else {
            0.0
        }
    });

    (0..hierarchy.height())
        .map(|level| {
            let mut groups: HashMap<i32, Vec<(f64, usize)>> = HashMap::new();
            for &(leaf, n) in &leaves {
                let x = numbers.map_or(leaf as f64, |numbers| numbers[leaf as usize]);
                groups
                    .entry(hierarchy.get(leaf, level))
                    .or_default()
                    .push((x, n));
            }
            groups
                .into_iter()
                .map(|(group, members)| {
                    let distance = match numbers {
                        Some(_) => centroid_distance(&members, range),
                        None => gini_impurity(&members),
                    };
                    (group, distance)
                })
                .collect()
        })
        .collect()
}

#[derive(Debug)]
pub struct SseMetric {
    configuration: MetricConfiguration,
    state: SingleDimensionalState,
    /// `[attribute][level]`.
    distances: Vec<Vec<LevelDistances>>,
    /// Distance of a suppressed row per attribute.
    suppressed: Vec<f64>,
    aggregated: Vec<Aggregated>,
}

impl SseMetric {
    pub fn new(configuration: MetricConfiguration) -> Self {
        SseMetric {
            configuration,
            state: SingleDimensionalState::new(NAME),
            distances: Vec::new(),
            suppressed: Vec::new(),
            aggregated: Vec::new(),
        }
    }

    fn distance(&self, dimension: usize, level: usize, value: i32) -> f64 {
        self.distances[dimension][level]
            .get(&value)
            .copied()
            .unwrap_or(0.0)
    }

    /// Error of a class if released and if suppressed. A suppressed class without
    /// distributions is only charged as suppressed.
    fn contribution(
        &self,
        transformation: &Transformation,
        class: &EquivalenceClass,
    ) -> MetricResult<(f64, f64)> {
        let count = class.count as f64;
        let mut released: f64 = (0..self.distances.len())
            .map(|d| self.distance(d, transformation.level(d), class.key[d]))
            .sum::<f64>()
            * count;
        let mut suppressed = count * self.suppressed.iter().sum::<f64>();
        for aggregated in &self.aggregated {
            suppressed += count * aggregated.suppressed;
            released += match aggregated.distribution(class) {
                Ok(distribution) => aggregated.error(distribution),
                Err(_) if !class.is_not_outlier => count * aggregated.suppressed,
                Err(err) => return Err(err),
            };
        }
        Ok((released, suppressed))
    }

    fn dimensions(&self) -> usize {
        self.distances.len() + self.aggregated.len()
    }

    fn normalize(&self, value: f64) -> f64 {
        let max = self.state.rows() * self.dimensions() as f64;
        if max > 0.0 {
            round(value / max)
        } else {
            0.0
        }
    }
}

impl Metric for SseMetric {
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
        let cardinalities = Cardinalities::from_manager(manager);
        let mut distances = Vec::with_capacity(manager.hierarchies().len());
        for (column, hierarchy) in manager.hierarchies().iter().enumerate() {
            let attribute = &manager.quasi_identifiers()[column];
            let data_type = manager.definition().data_type(attribute);
            let numbers = if data_type.is_ratio_scaled() {
                Some(leaf_numbers(manager, column, hierarchy, data_type)?)
            } else {
                None
            };
            distances.push(attribute_distances(
                hierarchy,
                &cardinalities,
                column,
                numbers.as_deref(),
            ));
        }
        self.suppressed = distances
            .iter()
            .zip(manager.hierarchies())
            .map(|(levels, hierarchy)| {
                levels[hierarchy.max_level()]
                    .values()
                    .copied()
                    .fold(0.0, f64::max)
            })
            .collect();
        self.distances = distances;
        self.aggregated = config
            .microaggregation
            .iter()
            .map(|(attribute, &function)| aggregated(manager, attribute, function))
            .collect::<MetricResult<_>>()?;

        let dimensions = self.dimensions();
        let total = self.suppressed.iter().sum::<f64>()
            + self.aggregated.iter().map(|a| a.suppressed).sum::<f64>();
        let max = if dimensions == 0 {
            0.0
        } else {
            round(total / dimensions as f64)
        };
        self.state.initialize(manager, 0.0, max);
        debug!(
            "{NAME}: suppression distances {:?}, {} microaggregated attributes",
            self.suppressed,
            self.aggregated.len()
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
        let mut loss = 0.0;
        let mut bound = 0.0;
        for class in classes.iter().filter(|c| c.count > 0) {
            let (released, suppressed) = self.contribution(transformation, class)?;
            if class.is_not_outlier {
                loss += released;
            } else {
                loss += suppressed;
            }
            bound += released.min(suppressed);
        }
        Ok(LossWithBound::new(
            InformationLoss::single(self.normalize(loss)),
            Some(InformationLoss::single(self.normalize(bound))),
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

fn aggregated(
    manager: &DataManager,
    attribute: &str,
    function: MicroaggregationFunction,
) -> MetricResult<Aggregated> {
    let column = manager
        .index_of_analyzed(attribute)
        .ok_or_else(|| DataError::UnknownAttribute(attribute.to_string()))?;
    let data_type = manager.definition().data_type(attribute);
    let numbers = if function.is_numeric() {
        if !data_type.is_ratio_scaled() {
            return Err(MetricError::Configuration(format!(
                "{function:?} needs a numeric attribute, '{attribute}' is not"
            )));
        }
        let values = manager.analyzed_dictionaries()[column].values();
        Some(
            values
                .iter()
                .map(|value| data_type.parse(value).map_err(MetricError::from))
                .collect::<MetricResult<Vec<f64>>>()?,
        )
    } else {
        None
    };

    let data = manager.data_analyzed();
    let mut whole = Distribution::new();
    for row in (0..manager.rows()).filter(|&r| manager.is_included(r)) {
        whole.add(data.get(row, column), 1);
    }
    let range = numbers.as_deref().map_or(0.0, |numbers| {
        let (min, max) = whole
            .iter()
            .map(|(code, _)| numbers[code as usize])
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
                (lo.min(x), hi.max(x))
            });
        if min.is_finite() && max.is_finite() {
            max - min
        } else {
            0.0
        }
    });
    let mut aggregated = Aggregated {
        attribute: attribute.to_string(),
        column,
        function,
        numbers,
        range,
        suppressed: 0.0,
    };
    let rows = whole.total();
    if rows > 0 {
        aggregated.suppressed = aggregated.error(&whole) / rows as f64;
    }
    Ok(aggregated)
}

/// Numeric values of the leaves of a ratio-scaled attribute, indexed by code.
fn leaf_numbers(
    manager: &DataManager,
    column: usize,
    hierarchy: &GeneralizationHierarchy,
    data_type: DataType,
) -> MetricResult<Vec<f64>> {
    let dictionary = &manager.dictionaries()[column];
    dictionary.values()[..hierarchy.leaves()]
        .iter()
        .map(|value| data_type.parse(value).map_err(MetricError::from))
        .collect()
}
