//! Reduction of weighted per-attribute losses to one comparable value.

use std::cmp::Ordering;
use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

/// How a vector of per-attribute losses is reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AggregateFunction {
    #[default]
    Sum,
    Maximum,
    ArithmeticMean,
    /// Geometric mean of `value + 1`, minus one, so that zero losses are admissible.
    GeometricMean,
    /// Lexicographic comparison of the values sorted in descending order.
    Rank,
}

impl AggregateFunction {
    pub const ALL: [AggregateFunction; 5] = [
        AggregateFunction::Sum,
        AggregateFunction::Maximum,
        AggregateFunction::ArithmeticMean,
        AggregateFunction::GeometricMean,
        AggregateFunction::Rank,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunction::Sum => "Sum",
            AggregateFunction::Maximum => "Maximum",
            AggregateFunction::ArithmeticMean => "Arithmetic mean",
            AggregateFunction::GeometricMean => "Geometric mean",
            AggregateFunction::Rank => "Rank",
        }
    }

    /// Reduces `values` weighted by `weights` to a scalar.
    ///
    /// Rank uses the arithmetic mean as its scalar; ordering uses [`Self::ranked`].
    /// Non-finite results are replaced by `f64::MAX`.
    pub fn aggregate(&self, values: &[f64], weights: &[f64]) -> f64 {
        let weighted = values.iter().zip(weights).map(|(v, w)| v * w);
        let n = values.len() as f64;
        let result = match self {
            AggregateFunction::Sum => weighted.sum(),
            AggregateFunction::Maximum => weighted.fold(0.0, f64::max),
            AggregateFunction::ArithmeticMean | AggregateFunction::Rank => {
                if values.is_empty() {
                    0.0
                } else {
                    weighted.sum::<f64>() / n
                }
            }
            AggregateFunction::GeometricMean => {
                if values.is_empty() {
                    0.0
                } else {
                    weighted.fold(1.0, |acc, v| acc * (v + 1.0).powf(1.0 / n)) - 1.0
                }
            }
        };
        if result.is_finite() {
            result
        } else {
            warn!("{} aggregation produced {result}, clamping", self.name());
            f64::MAX
        }
    }

    /// Weighted values sorted in descending order, the ordering key of `Rank`.
    pub fn ranked(values: &[f64], weights: &[f64]) -> Vec<f64> {
        let mut ranked: Vec<f64> = values.iter().zip(weights).map(|(v, w)| v * w).collect();
        ranked.sort_by(|a, b| b.total_cmp(a));
        ranked
    }

    /// Lexicographic comparison of two ranked vectors.
    pub fn compare_ranked(a: &[f64], b: &[f64]) -> Ordering {
        for (x, y) in a.iter().zip(b) {
            match x.total_cmp(y) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        a.len().cmp(&b.len())
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_aggregates() {
        let values = [0.5, 1.0, 0.0];
        let weights = [1.0, 0.5, 1.0];
        assert_abs_diff_eq!(AggregateFunction::Sum.aggregate(&values, &weights), 1.0);
        assert_abs_diff_eq!(AggregateFunction::Maximum.aggregate(&values, &weights), 0.5);
        assert_abs_diff_eq!(
            AggregateFunction::ArithmeticMean.aggregate(&values, &weights),
            1.0 / 3.0
        );
        // (1.5 * 1.5 * 1.0)^(1/3) - 1
        assert_abs_diff_eq!(
            AggregateFunction::GeometricMean.aggregate(&values, &weights),
            2.25f64.powf(1.0 / 3.0) - 1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_geometric_mean_of_zeros_is_zero() {
        assert_eq!(
            AggregateFunction::GeometricMean.aggregate(&[0.0, 0.0], &[1.0, 1.0]),
            0.0
        );
    }

    #[test]
    fn test_overflow_is_clamped() {
        let values = [f64::MAX, f64::MAX];
        assert_eq!(AggregateFunction::Sum.aggregate(&values, &[1.0, 1.0]), f64::MAX);
        let nan = [f64::NAN];
        assert_eq!(AggregateFunction::Sum.aggregate(&nan, &[1.0]), f64::MAX);
    }

    #[test]
    fn test_rank_ordering() {
        let a = AggregateFunction::ranked(&[0.2, 0.9], &[1.0, 1.0]);
        let b = AggregateFunction::ranked(&[0.8, 0.8], &[1.0, 1.0]);
        assert_eq!(a, vec![0.9, 0.2]);
        assert_eq!(AggregateFunction::compare_ranked(&a, &b), Ordering::Greater);
    }
}
