//! Non-monotonic non-uniform entropy and its normalized form.
//!
//! Released rows contribute `log2(b / a)` as in the monotonic variant; suppressed rows
//! are generalized to a single group of all rows and contribute `log2(rows / a)`.

use log::{debug, trace};

use infoloss_data::{AnonymizationConfig, DataManager, EquivalenceClasses, Transformation};
use infoloss_value::{InformationLoss, LossWithBound};

use crate::base::{round, MultiDimensionalState};
use crate::config::MetricConfiguration;
use crate::description::MetricDescription;
use crate::error::{MetricError, MetricResult};
use crate::matcher::TupleMatcher;
use crate::metric::Metric;
use crate::metrics::entropy::{EntropyTables, DESCRIPTION};
use crate::precomputed::PotentiallyPrecomputed;

const NORMALIZED_NAME: &str = "Normalized non-uniform entropy";

const NORMALIZED_DESCRIPTION: MetricDescription = MetricDescription::named(NORMALIZED_NAME)
    .with_attribute_weights()
    .with_precomputation()
    .with_aggregate_function();

fn describe(normalized: bool) -> MetricDescription {
    if normalized {
        NORMALIZED_DESCRIPTION
    } else {
        DESCRIPTION
    }
}

fn name(normalized: bool) -> &'static str {
    describe(normalized).name
}

/// Divides by the per-column maximum when normalizing, and rounds.
fn finish(values: &mut [f64], maximum: &[f64], normalized: bool) {
    for (value, &max) in values.iter_mut().zip(maximum) {
        *value = if !normalized {
            round(*value)
        } else if max > 0.0 {
            round(*value / max).min(1.0)
        } else {
            0.0
        };
    }
}

fn extrema(
    state: &mut MultiDimensionalState,
    tables: &EntropyTables,
    normalized: bool,
) -> MetricResult<Vec<f64>> {
    let maximum: Vec<f64> = (0..tables.columns()).map(|c| tables.maximum(c)).collect();
    let upper = if normalized {
        vec![1.0; maximum.len()]
    } else {
        maximum.clone()
    };
    state.set_min_max(vec![0.0; maximum.len()], upper)?;
    Ok(maximum)
}

/// Evaluates every input row against the classes it is matched to.
#[derive(Debug)]
pub struct NonMonotonicEntropyMetric {
    configuration: MetricConfiguration,
    state: MultiDimensionalState,
    normalized: bool,
    matcher: Option<TupleMatcher>,
    tables: Option<EntropyTables>,
    included: Vec<usize>,
    maximum: Vec<f64>,
}

impl NonMonotonicEntropyMetric {
    pub fn new(configuration: MetricConfiguration) -> Self {
        Self::with_normalization(configuration, false)
    }

    /// The variant whose per-attribute values are divided by their maximum.
    pub fn normalized(configuration: MetricConfiguration) -> Self {
        Self::with_normalization(configuration, true)
    }

    fn with_normalization(configuration: MetricConfiguration, normalized: bool) -> Self {
        NonMonotonicEntropyMetric {
            state: MultiDimensionalState::new(name(normalized), &configuration),
            configuration: configuration.with_monotonic(false),
            normalized,
            matcher: None,
            tables: None,
            included: Vec::new(),
            maximum: Vec::new(),
        }
    }

    pub fn potentially_precomputed(
        configuration: MetricConfiguration,
        normalized: bool,
    ) -> MetricResult<Box<dyn Metric>> {
        if !configuration.precomputed {
            return Ok(Box::new(Self::with_normalization(configuration, normalized)));
        }
        let threshold = configuration.precomputation_threshold;
        Ok(Box::new(PotentiallyPrecomputed::new(
            Box::new(Self::with_normalization(configuration.clone(), normalized)),
            Box::new(NonMonotonicEntropyMetricPrecomputed::with_normalization(
                configuration,
                normalized,
            )),
            threshold,
        )?))
    }
}

impl Metric for NonMonotonicEntropyMetric {
    fn description(&self) -> MetricDescription {
        describe(self.normalized)
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
        self.maximum = extrema(&mut self.state, &tables, self.normalized)?;
        self.included = (0..manager.rows())
            .filter(|&row| manager.is_included(row))
            .collect();
        self.matcher = Some(TupleMatcher::new(manager));
        self.tables = Some(tables);
        debug!(
            "{}: {} dimensions over {} rows, row-level evaluation",
            self.name(),
            self.state.dimensions(),
            self.included.len()
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
        let (Some(matcher), Some(tables)) = (&self.matcher, &self.tables) else {
            return Err(MetricError::NotInitialized(self.name()));
        };
        trace!(
            "{}: evaluating {transformation} over {} rows",
            self.name(),
            self.included.len()
        );
        let dimensions = self.state.dimensions();
        let rows = tables.rows();
        let mut loss = vec![0.0; dimensions];
        let mut bound = vec![0.0; dimensions];
        for &row in &self.included {
            let released = matcher
                .get_class(row, transformation, classes)
                .map_or(false, |class| class.is_not_outlier);
            for d in 0..dimensions {
                let value = matcher.value(row, d);
                let a = tables.cardinality(d, value, 0) as f64;
                let b = tables.cardinality(d, value, transformation.level(d)) as f64;
                let generalized = (b / a).log2();
                bound[d] += generalized;
                loss[d] += if released { generalized } else { (rows / a).log2() };
            }
        }
        finish(&mut loss, &self.maximum, self.normalized);
        finish(&mut bound, &self.maximum, self.normalized);
        Ok(LossWithBound::new(
            self.state.create_loss(loss)?,
            Some(self.state.create_loss(bound)?),
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

/// Starts from the cached monotonic entropy and corrects it for suppressed classes only.
#[derive(Debug)]
pub struct NonMonotonicEntropyMetricPrecomputed {
    configuration: MetricConfiguration,
    state: MultiDimensionalState,
    normalized: bool,
    tables: Option<EntropyTables>,
    maximum: Vec<f64>,
}

impl NonMonotonicEntropyMetricPrecomputed {
    pub fn new(configuration: MetricConfiguration) -> Self {
        Self::with_normalization(configuration, false)
    }

    pub fn normalized(configuration: MetricConfiguration) -> Self {
        Self::with_normalization(configuration, true)
    }

    fn with_normalization(configuration: MetricConfiguration, normalized: bool) -> Self {
        NonMonotonicEntropyMetricPrecomputed {
            state: MultiDimensionalState::new(name(normalized), &configuration),
            configuration: configuration.with_monotonic(false),
            normalized,
            tables: None,
            maximum: Vec::new(),
        }
    }

    fn tables(&self) -> MetricResult<&EntropyTables> {
        self.tables
            .as_ref()
            .ok_or(MetricError::NotInitialized(self.name()))
    }

    fn monotonic(&self, transformation: &Transformation) -> MetricResult<Vec<f64>> {
        self.state.check(transformation)?;
        let tables = self.tables()?;
        Ok((0..tables.columns())
            .map(|d| tables.entropy(d, transformation.level(d)))
            .collect())
    }
}

impl Metric for NonMonotonicEntropyMetricPrecomputed {
    fn description(&self) -> MetricDescription {
        describe(self.normalized)
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
        self.maximum = extrema(&mut self.state, &tables, self.normalized)?;
        debug!(
            "{}: {} dimensions, precomputed",
            self.name(),
            tables.columns()
        );
        self.tables = Some(tables);
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.tables.is_some()
    }

    fn information_loss(
        &self,
        transformation: &Transformation,
        classes: &EquivalenceClasses,
    ) -> MetricResult<LossWithBound> {
        let mut bound = self.monotonic(transformation)?;
        let tables = self.tables()?;
        let rows = tables.rows();
        let mut loss = bound.clone();
        for class in classes.iter().filter(|c| !c.is_not_outlier && c.count > 0) {
            let count = class.count as f64;
            for (d, value) in loss.iter_mut().enumerate() {
                let b = tables.cardinality(d, class.key[d], transformation.level(d));
                if b > 0 {
                    *value += count * (rows / b as f64).log2();
                }
            }
        }
        finish(&mut loss, &self.maximum, self.normalized);
        finish(&mut bound, &self.maximum, self.normalized);
        Ok(LossWithBound::new(
            self.state.create_loss(loss)?,
            Some(self.state.create_loss(bound)?),
        ))
    }

    fn lower_bound(&self, transformation: &Transformation) -> MetricResult<Option<InformationLoss>> {
        let mut bound = self.monotonic(transformation)?;
        finish(&mut bound, &self.maximum, self.normalized);
        Ok(Some(self.state.create_loss(bound)?))
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

    fn is_precomputed(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{group, zip_manager};
    use approx::assert_relative_eq;

    fn both(normalized: bool) -> (NonMonotonicEntropyMetric, NonMonotonicEntropyMetricPrecomputed) {
        let manager = zip_manager();
        let config = AnonymizationConfig::default();
        let mut rows = NonMonotonicEntropyMetric::with_normalization(MetricConfiguration::default(), normalized);
        rows.initialize(&manager, &config).unwrap();
        let mut precomputed = NonMonotonicEntropyMetricPrecomputed::with_normalization(
            MetricConfiguration::default(),
            normalized,
        );
        precomputed.initialize(&manager, &config).unwrap();
        (rows, precomputed)
    }

    #[test]
    fn test_suppressed_rows_are_generalized_to_everything() {
        let manager = zip_manager();
        let (rows, precomputed) = both(false);
        let bottom = Transformation::new(vec![0]);
        // 47678 occurs once and is suppressed: log2(8 / 1) bits.
        let classes = group(&manager, &bottom, 2);
        for metric in [&rows as &dyn Metric, &precomputed] {
            let loss = metric.information_loss(&bottom, &classes).unwrap();
            assert_relative_eq!(loss.information_loss.value(), 3.0, epsilon = 1e-9);
            assert_eq!(loss.lower_bound.map(|b| b.value()), Some(0.0));
        }
        assert!(!rows.is_monotonic(0.1));
    }

    #[test]
    fn test_normalized_variant() {
        let manager = zip_manager();
        let (rows, precomputed) = both(true);
        assert_eq!(rows.name(), "Normalized non-uniform entropy");
        let max = 24.0 - (3.0 * 3f64.log2() + 4.0);
        for level in 0..3 {
            let transformation = Transformation::new(vec![level]);
            let classes = group(&manager, &transformation, 2);
            let a = rows.information_loss(&transformation, &classes).unwrap();
            let b = precomputed.information_loss(&transformation, &classes).unwrap();
            assert_relative_eq!(
                a.information_loss.value(),
                b.information_loss.value(),
                epsilon = 1e-9
            );
            assert!(a.information_loss.value() <= 1.0);
        }
        let bottom = Transformation::new(vec![0]);
        let loss = precomputed
            .information_loss(&bottom, &group(&manager, &bottom, 2))
            .unwrap();
        assert_relative_eq!(loss.information_loss.value(), 3.0 / max, epsilon = 1e-9);
        assert_eq!(precomputed.maximal_information_loss().unwrap().value(), 1.0);
    }
}
