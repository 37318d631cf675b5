//! Domain shares and value frequencies.
//!
//! Both are derived once from the encoded dataset and its hierarchies when a metric is
//! initialized, and are read-only afterwards.

#![warn(missing_debug_implementations)]

pub mod cardinalities;
pub mod error;
pub mod factory;
pub mod interval;
pub mod io;
pub mod materialized;
pub mod redaction;
pub mod reliable;
pub mod share;

pub use cardinalities::{Cardinalities, CardinalitiesGeneric};
pub use error::{DomainError, DomainResult};
pub use factory::{create_domain_shares, create_reliable_shares};
pub use interval::DomainShareInterval;
pub use io::{load, save, ShareValue, FORMAT_VERSION};
pub use materialized::DomainShareMaterialized;
pub use redaction::DomainShareRedaction;
pub use reliable::DomainShareReliable;
pub use share::{share_key, DomainShare, ShareTable};
