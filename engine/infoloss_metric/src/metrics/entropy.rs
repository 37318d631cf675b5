//! Monotonic non-uniform entropy.
//!
//! For every attribute the loss is `sum over rows of log2(b / a)`, where `a` is the
//! frequency of the row's original value and `b` the frequency of its generalized value.
//! Suppressed rows are treated as generalized, which keeps the metric monotonic.

use std::sync::OnceLock;

use log::{debug, trace};

use infoloss_data::{
    AnonymizationConfig, DataError, DataManager, EquivalenceClasses, GeneralizationHierarchy, Transformation,
};
use infoloss_domain::{Cardinalities, CardinalitiesGeneric};
use infoloss_value::{InformationLoss, LossWithBound};

use crate::base::{round, MultiDimensionalState};
use crate::config::MetricConfiguration;
use crate::description::MetricDescription;
use crate::error::{MetricError, MetricResult};
use crate::metric::Metric;
use crate::precomputed::PotentiallyPrecomputed;

pub(crate) const NAME: &str = "Non-uniform entropy";

pub(crate) const DESCRIPTION: MetricDescription = MetricDescription::named(NAME)
    .with_monotonic_variant()
    .with_attribute_weights()
    .with_precomputation()
    .with_aggregate_function();

/// `sum of a * log2(a)` over the frequencies of the original values of one column.
fn frequency_constant(leaves: &[(i32, usize)]) -> f64 {
    leaves
        .iter()
        .map(|&(_, a)| {
            let a = a as f64;
            a * a.log2()
        })
        .sum()
}

/// Frequencies and cached per-level entropies of every column.
#[derive(Debug)]
pub(crate) struct EntropyTables {
    rows: f64,
    hierarchies: Vec<GeneralizationHierarchy>,
    cardinalities: Cardinalities,
    /// Leaf codes that occur in the data, with their frequency, in code order.
    leaves: Vec<Vec<(i32, usize)>>,
    cache: Vec<Vec<OnceLock<f64>>>,
}

impl EntropyTables {
    pub fn new(manager: &DataManager) -> Self {
        let cardinalities = Cardinalities::from_manager(manager);
        let hierarchies = manager.hierarchies().to_vec();
        let leaves = hierarchies
            .iter()
            .enumerate()
            .map(|(column, h)| {
                (0..h.leaves() as i32)
                    .map(|leaf| (leaf, cardinalities.get(column, leaf, 0)))
                    .filter(|&(_, count)| count > 0)
                    .collect()
            })
            .collect();
        let cache = hierarchies
            .iter()
            .map(|h| (0..h.height()).map(|_| OnceLock::new()).collect())
            .collect();
        EntropyTables {
            rows: manager.effective_rows() as f64,
            hierarchies,
            cardinalities,
            leaves,
            cache,
        }
    }

    /// Entropy of `column` generalized to `level`, computed on first use.
    ///
    /// Concurrent first calls may both compute the value; only one result is stored and
    /// every caller observes the stored one.
    pub fn entropy(&self, column: usize, level: usize) -> f64 {
        *self.cache[column][level].get_or_init(|| {
            let mut sum = 0.0;
            for &(leaf, a) in &self.leaves[column] {
                let b = self.cardinalities.get(column, leaf, level) as f64;
                let a = a as f64;
                sum += a * (a / b).log2();
            }
            round(-sum)
        })
    }

    /// Entropy of `column` when every row is generalized to one group.
    pub fn maximum(&self, column: usize) -> f64 {
        if self.rows <= 0.0 {
            return 0.0;
        }
        round(self.rows * self.rows.log2() - frequency_constant(&self.leaves[column]))
    }

    pub fn constant(&self, column: usize) -> f64 {
        frequency_constant(&self.leaves[column])
    }

    pub fn cardinality(&self, column: usize, value: i32, level: usize) -> usize {
        self.cardinalities.get(column, value, level)
    }

    pub fn columns(&self) -> usize {
        self.hierarchies.len()
    }

    pub fn height(&self, column: usize) -> usize {
        self.hierarchies[column].height()
    }

    pub fn rows(&self) -> f64 {
        self.rows
    }
}

/// Monotonic entropy computed from the frequencies of generalized values in the classes.
#[derive(Debug)]
pub struct EntropyMetric {
    configuration: MetricConfiguration,
    state: MultiDimensionalState,
    constants: Vec<f64>,
}

impl EntropyMetric {
    pub fn new(configuration: MetricConfiguration) -> Self {
        EntropyMetric {
            state: MultiDimensionalState::new(NAME, &configuration),
            configuration: configuration.with_monotonic(true),
            constants: Vec::new(),
        }
    }

    pub fn potentially_precomputed(
        configuration: MetricConfiguration,
    ) -> MetricResult<Box<dyn Metric>> {
        if !configuration.precomputed {
            return Ok(Box::new(EntropyMetric::new(configuration)));
        }
        let threshold = configuration.precomputation_threshold;
        Ok(Box::new(PotentiallyPrecomputed::new(
            Box::new(EntropyMetric::new(configuration.clone())),
            Box::new(EntropyMetricPrecomputed::new(configuration)),
            threshold,
        )?))
    }
}

impl Metric for EntropyMetric {
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
        self.state.initialize(manager, config);
        let tables = EntropyTables::new(manager);
        self.constants = (0..tables.columns()).map(|c| tables.constant(c)).collect();
        let maximum = (0..tables.columns()).map(|c| tables.maximum(c)).collect();
        self.state
            .set_min_max(vec![0.0; tables.columns()], maximum)?;
        debug!("{NAME}: {} dimensions, computed on the fly", tables.columns());
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
        let frequencies = CardinalitiesGeneric::from_classes(classes, dimensions);
        let values: Vec<f64> = (0..dimensions)
            .map(|d| {
                let generalized: f64 = frequencies
                    .iter(d)
                    .map(|(_, b)| {
                        let b = b as f64;
                        b * b.log2()
                    })
                    .sum();
                round(generalized - self.constants[d])
            })
            .collect();
        let loss = self.state.create_loss(values)?;
        Ok(LossWithBound::new(loss.clone(), Some(loss)))
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

/// Monotonic entropy read from per-level tables; independent of the classes.
#[derive(Debug)]
pub struct EntropyMetricPrecomputed {
    configuration: MetricConfiguration,
    state: MultiDimensionalState,
    tables: Option<EntropyTables>,
}

impl EntropyMetricPrecomputed {
    pub fn new(configuration: MetricConfiguration) -> Self {
        EntropyMetricPrecomputed {
            state: MultiDimensionalState::new(NAME, &configuration),
            configuration: configuration.with_monotonic(true),
            tables: None,
        }
    }

    fn tables(&self) -> MetricResult<&EntropyTables> {
        self.tables.as_ref().ok_or(MetricError::NotInitialized(NAME))
    }

    /// Entropy of one column on one level.
    pub fn entropy(&self, column: usize, level: usize) -> MetricResult<f64> {
        let tables = self.tables()?;
        if column >= tables.columns() || level >= tables.height(column) {
            return Err(DataError::InvalidTransformation(format!(
                "no entropy for column {column} on level {level}"
            ))
            .into());
        }
        Ok(tables.entropy(column, level))
    }

    fn values(&self, transformation: &Transformation) -> MetricResult<Vec<f64>> {
        self.state.check(transformation)?;
        let tables = self.tables()?;
        Ok((0..tables.columns())
            .map(|d| tables.entropy(d, transformation.level(d)))
            .collect())
    }
}

impl Metric for EntropyMetricPrecomputed {
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
        self.state.initialize(manager, config);
        let tables = EntropyTables::new(manager);
        let maximum = (0..tables.columns()).map(|c| tables.maximum(c)).collect();
        self.state
            .set_min_max(vec![0.0; tables.columns()], maximum)?;
        debug!("{NAME}: {} dimensions, precomputed", tables.columns());
        self.tables = Some(tables);
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.tables.is_some()
    }

    fn information_loss(
        &self,
        transformation: &Transformation,
        _classes: &EquivalenceClasses,
    ) -> MetricResult<LossWithBound> {
        let loss = self.state.create_loss(self.values(transformation)?)?;
        Ok(LossWithBound::new(loss.clone(), Some(loss)))
    }

    fn lower_bound(&self, transformation: &Transformation) -> MetricResult<Option<InformationLoss>> {
        Ok(Some(self.state.create_loss(self.values(transformation)?)?))
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

    fn is_precomputed(&self) -> bool {
        true
    }
}
