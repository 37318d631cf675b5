//! Input data model of the information-loss metric engine.
//!
//! Everything here is produced outside the engine (by data loading, hierarchy construction
//! and the grouping stage) and consumed read-only by the metrics.

#![warn(missing_debug_implementations)]

pub mod config;
pub mod definition;
pub mod dictionary;
pub mod error;
pub mod functional;
pub mod groupify;
pub mod hierarchy;
pub mod manager;
pub mod transformation;

pub use config::{
    AnonymizationConfig, DifferentialPrivacy, MicroaggregationFunction, PrivacyParameters,
};
pub use definition::DataDefinition;
pub use dictionary::Dictionary;
pub use error::{DataError, DataResult};
pub use functional::{
    DataType, FunctionalHierarchy, Interval, IntervalHierarchy, IntervalKind, RedactionHierarchy,
    RedactionOrder, ANY_VALUE,
};
pub use groupify::{Distribution, EquivalenceClass, EquivalenceClasses};
pub use hierarchy::{GeneralizationHierarchy, Hierarchy};
pub use manager::{DataManager, DataMatrix, RowSet};
pub use transformation::Transformation;
