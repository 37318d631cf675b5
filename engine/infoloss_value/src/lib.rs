//! Information-loss values shared by all metrics.
//!
//! A value is either a scalar, a weighted vector reduced by an [`AggregateFunction`], or a
//! score (floating point or exact rational) used for differentially private selection.

pub mod aggregate;
pub mod error;
pub mod loss;
pub mod multi;
pub mod score;
pub mod single;

pub use aggregate::AggregateFunction;
pub use error::{LossError, LossResult};
pub use loss::{InformationLoss, LossWithBound};
pub use multi::MultiDimensionalLoss;
pub use score::{ReliableScoreLoss, ScoreLoss};
pub use single::SingleDimensionalLoss;
