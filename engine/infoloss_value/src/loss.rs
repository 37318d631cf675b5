//! The information-loss value every metric returns.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use num_rational::BigRational;

use crate::aggregate::AggregateFunction;
use crate::error::{LossError, LossResult};
use crate::multi::MultiDimensionalLoss;
use crate::score::{ReliableScoreLoss, ScoreLoss};
use crate::single::SingleDimensionalLoss;

/// An information-loss value of one of the supported kinds.
///
/// Values of different kinds are never comparable: mixing them is a programming error
/// within one search and is reported as [`LossError::IncompatibleClass`].
#[derive(Debug, Clone, PartialEq)]
pub enum InformationLoss {
    SingleDimensional(SingleDimensionalLoss),
    MultiDimensional(MultiDimensionalLoss),
    Score(ScoreLoss),
    ReliableScore(ReliableScoreLoss),
}

impl InformationLoss {
    pub fn single(value: f64) -> Self {
        InformationLoss::SingleDimensional(SingleDimensionalLoss::new(value))
    }

    pub fn multi(
        values: Vec<f64>,
        weights: Arc<[f64]>,
        function: AggregateFunction,
    ) -> LossResult<Self> {
        MultiDimensionalLoss::new(values, weights, function).map(InformationLoss::MultiDimensional)
    }

    pub fn score(value: f64) -> Self {
        InformationLoss::Score(ScoreLoss::new(value))
    }

    pub fn reliable_score(value: BigRational) -> Self {
        InformationLoss::ReliableScore(ReliableScoreLoss::new(value))
    }

    /// Name of the concrete kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            InformationLoss::SingleDimensional(_) => "single-dimensional",
            InformationLoss::MultiDimensional(_) => "multi-dimensional",
            InformationLoss::Score(_) => "score",
            InformationLoss::ReliableScore(_) => "reliable score",
        }
    }

    pub fn is_score(&self) -> bool {
        matches!(
            self,
            InformationLoss::Score(_) | InformationLoss::ReliableScore(_)
        )
    }

    /// The scalar representation: the value itself, or the aggregate of a vector.
    pub fn value(&self) -> f64 {
        match self {
            InformationLoss::SingleDimensional(l) => l.value(),
            InformationLoss::MultiDimensional(l) => l.aggregate(),
            InformationLoss::Score(l) => l.value(),
            InformationLoss::ReliableScore(l) => l.to_f64(),
        }
    }

    fn incompatible(&self, other: &Self) -> LossError {
        LossError::IncompatibleClass {
            expected: self.kind(),
            actual: other.kind(),
        }
    }

    /// Total order in which larger means more loss (for scores: lower score).
    pub fn compare(&self, other: &Self) -> LossResult<Ordering> {
        match (self, other) {
            (InformationLoss::SingleDimensional(a), InformationLoss::SingleDimensional(b)) => {
                Ok(a.compare(b))
            }
            (InformationLoss::MultiDimensional(a), InformationLoss::MultiDimensional(b)) => {
                a.compare(b)
            }
            (InformationLoss::Score(a), InformationLoss::Score(b)) => Ok(a.compare(b)),
            (InformationLoss::ReliableScore(a), InformationLoss::ReliableScore(b)) => {
                Ok(a.compare(b))
            }
            _ => Err(self.incompatible(other)),
        }
    }

    /// Relative position between `min` and `max` in `[0, 1]`.
    pub fn relative_to(&self, min: &Self, max: &Self) -> LossResult<f64> {
        match (self, min, max) {
            (
                InformationLoss::SingleDimensional(v),
                InformationLoss::SingleDimensional(lo),
                InformationLoss::SingleDimensional(hi),
            ) => Ok(v.relative_to(lo, hi)),
            (
                InformationLoss::MultiDimensional(v),
                InformationLoss::MultiDimensional(lo),
                InformationLoss::MultiDimensional(hi),
            ) => v.relative_to(lo, hi),
            (InformationLoss::Score(v), InformationLoss::Score(lo), InformationLoss::Score(hi)) => {
                Ok(v.relative_to(lo, hi))
            }
            (
                InformationLoss::ReliableScore(v),
                InformationLoss::ReliableScore(lo),
                InformationLoss::ReliableScore(hi),
            ) => Ok(v.relative_to(lo, hi)),
            (_, lo, hi) => {
                if std::mem::discriminant(self) != std::mem::discriminant(lo) {
                    Err(self.incompatible(lo))
                } else {
                    Err(self.incompatible(hi))
                }
            }
        }
    }

    /// The smaller of two values of the same kind; vectors are merged per dimension.
    pub fn min(&self, other: &Self) -> LossResult<Self> {
        if let (InformationLoss::MultiDimensional(a), InformationLoss::MultiDimensional(b)) =
            (self, other)
        {
            return a.min(b).map(InformationLoss::MultiDimensional);
        }
        Ok(match self.compare(other)? {
            Ordering::Greater => other.clone(),
            _ => self.clone(),
        })
    }

    /// The larger of two values of the same kind; vectors are merged per dimension.
    pub fn max(&self, other: &Self) -> LossResult<Self> {
        if let (InformationLoss::MultiDimensional(a), InformationLoss::MultiDimensional(b)) =
            (self, other)
        {
            return a.max(b).map(InformationLoss::MultiDimensional);
        }
        Ok(match self.compare(other)? {
            Ordering::Less => other.clone(),
            _ => self.clone(),
        })
    }
}

impl fmt::Display for InformationLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InformationLoss::SingleDimensional(l) => l.fmt(f),
            InformationLoss::MultiDimensional(l) => l.fmt(f),
            InformationLoss::Score(l) => l.fmt(f),
            InformationLoss::ReliableScore(l) => l.fmt(f),
        }
    }
}

/// An information loss together with an optional lower bound for pruning.
///
/// An absent bound means "do not prune on this value", never zero.
#[derive(Debug, Clone, PartialEq)]
pub struct LossWithBound {
    pub information_loss: InformationLoss,
    pub lower_bound: Option<InformationLoss>,
}

impl LossWithBound {
    pub fn new(information_loss: InformationLoss, lower_bound: Option<InformationLoss>) -> Self {
        LossWithBound {
            information_loss,
            lower_bound,
        }
    }

    pub fn without_bound(information_loss: InformationLoss) -> Self {
        LossWithBound {
            information_loss,
            lower_bound: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_kinds_fail() {
        let a = InformationLoss::single(1.0);
        let b = InformationLoss::score(1.0);
        assert_eq!(
            a.compare(&b),
            Err(LossError::IncompatibleClass {
                expected: "single-dimensional",
                actual: "score"
            })
        );
        assert!(a.max(&b).is_err());
        assert!(a.relative_to(&a, &b).is_err());
    }

    #[test]
    fn test_min_max_are_pure() {
        let a = InformationLoss::single(1.0);
        let b = InformationLoss::single(2.0);
        assert_eq!(a.max(&b).unwrap(), b);
        assert_eq!(a.min(&b).unwrap(), a);
        assert_eq!(a, InformationLoss::single(1.0));
    }

    #[test]
    fn test_vectors_merge_per_dimension() {
        let weights: Arc<[f64]> = vec![1.0, 1.0].into();
        let a = InformationLoss::multi(vec![1.0, 0.0], weights.clone(), AggregateFunction::Sum)
            .unwrap();
        let b = InformationLoss::multi(vec![0.0, 1.0], weights.clone(), AggregateFunction::Sum)
            .unwrap();
        let expected =
            InformationLoss::multi(vec![1.0, 1.0], weights.clone(), AggregateFunction::Sum)
                .unwrap();
        assert_eq!(a.max(&b).unwrap(), expected);
        let expected =
            InformationLoss::multi(vec![0.0, 0.0], weights, AggregateFunction::Sum).unwrap();
        assert_eq!(a.min(&b).unwrap(), expected);
        assert!(a.min(&InformationLoss::single(0.0)).is_err());
    }

    #[test]
    fn test_score_max_is_lowest_score() {
        let a = InformationLoss::score(5.0);
        let b = InformationLoss::score(1.0);
        assert_eq!(a.max(&b).unwrap(), b);
    }
}
