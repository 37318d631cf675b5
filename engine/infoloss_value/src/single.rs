use std::cmp::Ordering;
use std::fmt;

/// Position of `value` inside `[min, max]`, clamped to `[0, 1]`; a degenerate range maps to 0.
pub(crate) fn relative(value: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if range == 0.0 || !range.is_finite() {
        return 0.0;
    }
    let r = (value - min) / range;
    if r.is_nan() {
        0.0
    } else {
        r.clamp(0.0, 1.0)
    }
}

/// A scalar information loss; larger means more loss.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SingleDimensionalLoss {
    value: f64,
}

impl SingleDimensionalLoss {
    pub fn new(value: f64) -> Self {
        SingleDimensionalLoss { value }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn compare(&self, other: &Self) -> Ordering {
        self.value.total_cmp(&other.value)
    }

    pub fn relative_to(&self, min: &Self, max: &Self) -> f64 {
        relative(self.value, min.value, max.value)
    }
}

impl fmt::Display for SingleDimensionalLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
