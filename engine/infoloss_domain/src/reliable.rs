use num_rational::BigRational;
use num_traits::{One, ToPrimitive};
use serde::{Deserialize, Serialize};

use infoloss_data::{Dictionary, Hierarchy};

use crate::error::DomainResult;
use crate::materialized::leaf_share_table;
use crate::share::{DomainShare, ShareTable};

/// Materialized shares as exact fractions, for scores with provable sensitivity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainShareReliable {
    domain_size: usize,
    table: ShareTable<BigRational>,
}

impl DomainShareReliable {
    pub fn new(hierarchy: &Hierarchy, dictionary: &Dictionary) -> DomainResult<Self> {
        let domain_size = hierarchy.rows().len();
        let table = leaf_share_table(hierarchy, dictionary)?;
        Ok(DomainShareReliable { domain_size, table })
    }

    /// The exact share; codes without a stored share represent the whole domain.
    pub fn share_exact(&self, value: i32, level: usize) -> BigRational {
        self.table
            .get(value, level)
            .cloned()
            .unwrap_or_else(BigRational::one)
    }

    pub fn domain_size_exact(&self) -> usize {
        self.domain_size
    }
}

impl DomainShare for DomainShareReliable {
    fn share(&self, value: i32, level: usize) -> f64 {
        self.share_exact(value, level).to_f64().unwrap_or(1.0)
    }

    fn domain_size(&self) -> f64 {
        self.domain_size as f64
    }
}
