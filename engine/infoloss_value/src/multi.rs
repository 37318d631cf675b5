//! Weighted vector-valued information loss.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::aggregate::AggregateFunction;
use crate::error::{LossError, LossResult};
use crate::single::relative;

/// One loss value per quasi-identifier together with the attribute weights and the
/// function that reduces them.
///
/// The aggregate is computed once at construction; the value is immutable afterwards,
/// so instances can be shared freely between threads.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiDimensionalLoss {
    values: Vec<f64>,
    weights: Arc<[f64]>,
    function: AggregateFunction,
    aggregate: f64,
    ranked: Vec<f64>,
}

impl MultiDimensionalLoss {
    pub fn new(
        values: Vec<f64>,
        weights: Arc<[f64]>,
        function: AggregateFunction,
    ) -> LossResult<Self> {
        if values.len() != weights.len() {
            return Err(LossError::DimensionMismatch {
                expected: weights.len(),
                actual: values.len(),
            });
        }
        let aggregate = function.aggregate(&values, &weights);
        let ranked = match function {
            AggregateFunction::Rank => AggregateFunction::ranked(&values, &weights),
            _ => Vec::new(),
        };
        Ok(MultiDimensionalLoss {
            values,
            weights,
            function,
            aggregate,
            ranked,
        })
    }

    /// The unweighted per-attribute values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn function(&self) -> AggregateFunction {
        self.function
    }

    pub fn dimensions(&self) -> usize {
        self.values.len()
    }

    /// The scalar the vector reduces to.
    pub fn aggregate(&self) -> f64 {
        self.aggregate
    }

    fn check_compatible(&self, other: &Self) -> LossResult<()> {
        if self.function != other.function {
            return Err(LossError::IncompatibleClass {
                expected: self.function.name(),
                actual: other.function.name(),
            });
        }
        if self.values.len() != other.values.len() {
            return Err(LossError::DimensionMismatch {
                expected: self.values.len(),
                actual: other.values.len(),
            });
        }
        Ok(())
    }

    pub fn compare(&self, other: &Self) -> LossResult<Ordering> {
        self.check_compatible(other)?;
        Ok(match self.function {
            AggregateFunction::Rank => AggregateFunction::compare_ranked(&self.ranked, &other.ranked),
            _ => self.aggregate.total_cmp(&other.aggregate),
        })
    }

    /// Per-dimension minimum of two vectors, aggregated anew.
    pub fn min(&self, other: &Self) -> LossResult<Self> {
        self.pointwise(other, f64::min)
    }

    /// Per-dimension maximum of two vectors, aggregated anew.
    pub fn max(&self, other: &Self) -> LossResult<Self> {
        self.pointwise(other, f64::max)
    }

    fn pointwise(&self, other: &Self, pick: fn(f64, f64) -> f64) -> LossResult<Self> {
        self.check_compatible(other)?;
        let values = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(&a, &b)| pick(a, b))
            .collect();
        MultiDimensionalLoss::new(values, Arc::clone(&self.weights), self.function)
    }

    pub fn relative_to(&self, min: &Self, max: &Self) -> LossResult<f64> {
        self.check_compatible(min)?;
        self.check_compatible(max)?;
        if self.compare(min)? == Ordering::Equal {
            return Ok(0.0);
        }
        if self.compare(max)? == Ordering::Equal {
            return Ok(1.0);
        }
        Ok(relative(self.aggregate, min.aggregate, max.aggregate))
    }
}

impl fmt::Display for MultiDimensionalLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self.values.iter().map(|v| format!("{v}")).collect();
        write!(f, "{} ({}: [{}])", self.aggregate, self.function, values.join(", "))
    }
}
