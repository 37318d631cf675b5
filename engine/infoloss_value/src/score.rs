//! Scores for differentially private selection: higher is better.
//!
//! Scores live in the same ordering as information loss, so their comparison is
//! inverted: a higher score compares as less loss.

use std::cmp::Ordering;
use std::fmt;

use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};

use crate::single::relative;

/// A score computed in floating point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreLoss {
    value: f64,
}

impl ScoreLoss {
    pub fn new(value: f64) -> Self {
        ScoreLoss { value }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn compare(&self, other: &Self) -> Ordering {
        other.value.total_cmp(&self.value)
    }

    pub fn relative_to(&self, min: &Self, max: &Self) -> f64 {
        relative(self.value, min.value, max.value)
    }
}

impl fmt::Display for ScoreLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A score computed with exact rational arithmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReliableScoreLoss {
    value: BigRational,
}

impl ReliableScoreLoss {
    pub fn new(value: BigRational) -> Self {
        ReliableScoreLoss { value }
    }

    pub fn value(&self) -> &BigRational {
        &self.value
    }

    /// Nearest double, saturating at the extremes.
    pub fn to_f64(&self) -> f64 {
        self.value.to_f64().unwrap_or(if self.value < BigRational::zero() {
            f64::MIN
        } else {
            f64::MAX
        })
    }

    pub fn compare(&self, other: &Self) -> Ordering {
        other.value.cmp(&self.value)
    }

    /// Computed exactly and converted to a double at the end.
    pub fn relative_to(&self, min: &Self, max: &Self) -> f64 {
        let range = &max.value - &min.value;
        if range.is_zero() {
            return 0.0;
        }
        let r = (&self.value - &min.value) / range;
        r.to_f64().map(|r| r.clamp(0.0, 1.0)).unwrap_or(0.0)
    }
}

impl fmt::Display for ReliableScoreLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn ratio(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn test_higher_score_is_less_loss() {
        let good = ScoreLoss::new(10.0);
        let bad = ScoreLoss::new(2.0);
        assert_eq!(good.compare(&bad), Ordering::Less);
        assert_eq!(bad.compare(&good), Ordering::Greater);
    }

    #[test]
    fn test_reliable_relative_is_exact() {
        let best = ReliableScoreLoss::new(ratio(1, 3));
        let worst = ReliableScoreLoss::new(ratio(-2, 3));
        let mid = ReliableScoreLoss::new(ratio(-1, 6));
        assert_eq!(best.relative_to(&best, &worst), 0.0);
        assert_eq!(worst.relative_to(&best, &worst), 1.0);
        assert_eq!(mid.relative_to(&best, &worst), 0.5);
        assert_eq!(best.compare(&worst), Ordering::Less);
    }
}
