//! Number types scores are accumulated in.
//!
//! Floating point is used by default; exact fractions when the configuration requests
//! reliable computation, so that the sensitivity a score is calibrated for cannot be
//! exceeded through rounding.

use std::ops::{Add, Div, Mul, Neg, Sub};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};

use infoloss_value::InformationLoss;

pub trait ScoreNumber:
    Clone
    + PartialOrd
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    fn from_count(count: usize) -> Self;

    /// `numerator / denominator` for counts.
    fn ratio(numerator: usize, denominator: usize) -> Self {
        Self::from_count(numerator) / Self::from_count(denominator)
    }

    fn into_loss(self) -> InformationLoss;
}

impl ScoreNumber for f64 {
    fn from_count(count: usize) -> Self {
        count as f64
    }

    fn into_loss(self) -> InformationLoss {
        InformationLoss::score(self)
    }
}

impl ScoreNumber for BigRational {
    fn from_count(count: usize) -> Self {
        BigRational::from_integer(BigInt::from(count))
    }

    fn into_loss(self) -> InformationLoss {
        InformationLoss::reliable_score(self)
    }
}
