//! Static loss: a user-defined loss per attribute and generalization level.

use std::collections::BTreeMap;

use log::debug;

use infoloss_data::{
    AnonymizationConfig, DataManager, EquivalenceClass, EquivalenceClasses, Transformation,
};
use infoloss_value::{InformationLoss, LossWithBound};

use crate::base::MultiDimensionalState;
use crate::config::MetricConfiguration;
use crate::description::MetricDescription;
use crate::error::{MetricError, MetricResult};
use crate::metric::Metric;

const NAME: &str = "Static";

const DESCRIPTION: MetricDescription = MetricDescription::named(NAME)
    .with_attribute_weights()
    .with_aggregate_function();

/// Loss per attribute name, one entry per hierarchy level.
pub type StaticTables = BTreeMap<String, Vec<f64>>;

#[derive(Debug)]
pub struct StaticMetric {
    configuration: MetricConfiguration,
    state: MultiDimensionalState,
    definitions: StaticTables,
    /// Tables in quasi-identifier order, set by `initialize`.
    tables: Vec<Vec<f64>>,
}

impl StaticMetric {
    /// Fails if a table decreases from one level to the next.
    pub fn new(configuration: MetricConfiguration, definitions: StaticTables) -> MetricResult<Self> {
        for (attribute, table) in &definitions {
            if table.windows(2).any(|w| w[1] < w[0]) {
                return Err(MetricError::Configuration(format!(
                    "static loss of '{attribute}' must not decrease with the level"
                )));
            }
        }
        Ok(StaticMetric {
            state: MultiDimensionalState::new(NAME, &configuration),
            configuration,
            definitions,
            tables: Vec::new(),
        })
    }

    fn values(&self, transformation: &Transformation) -> MetricResult<Vec<f64>> {
        self.state.check(transformation)?;
        Ok(self
            .tables
            .iter()
            .enumerate()
            .map(|(d, table)| table[transformation.level(d)])
            .collect())
    }
}

impl Metric for StaticMetric {
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
        let mut tables = Vec::with_capacity(manager.hierarchies().len());
        for hierarchy in manager.hierarchies() {
            let attribute = hierarchy.attribute();
            let table = self.definitions.get(attribute).ok_or_else(|| {
                MetricError::Configuration(format!("no static loss defined for '{attribute}'"))
            })?;
            if table.len() != hierarchy.height() {
                return Err(MetricError::Configuration(format!(
                    "static loss of '{attribute}' has {} levels, hierarchy has {}",
                    table.len(),
                    hierarchy.height()
                )));
            }
            tables.push(table.clone());
        }
        self.state.initialize(manager, config);
        let min = tables.iter().map(|t| t[0]).collect();
        let max = tables.iter().map(|t| t[t.len() - 1]).collect();
        self.state.set_min_max(min, max)?;
        debug!("{NAME}: {tables:?}");
        self.tables = tables;
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
        let loss = self.state.create_loss(self.values(transformation)?)?;
        Ok(LossWithBound::new(loss.clone(), Some(loss)))
    }

    fn information_loss_of_class(
        &self,
        transformation: &Transformation,
        class: &EquivalenceClass,
    ) -> MetricResult<LossWithBound> {
        let count = class.count as f64;
        let values = self
            .values(transformation)?
            .into_iter()
            .map(|v| count * v)
            .collect();
        let loss = self.state.create_loss(values)?;
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
}
