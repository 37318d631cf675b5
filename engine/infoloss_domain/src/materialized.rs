use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use infoloss_data::{Dictionary, Hierarchy};

use crate::error::{DomainError, DomainResult};
use crate::io::ShareValue;
use crate::share::{DomainShare, ShareTable};

/// Shares of every label of `hierarchy` on every level, as the fraction of leaves that
/// generalize to it.
pub(crate) fn leaf_share_table<V: ShareValue>(
    hierarchy: &Hierarchy,
    dictionary: &Dictionary,
) -> DomainResult<ShareTable<V>> {
    let rows = hierarchy.rows();
    let mut table = ShareTable::new(dictionary.len());
    for level in 0..hierarchy.height() {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for row in rows {
            *counts.entry(row[level].as_str()).or_insert(0) += 1;
        }
        for (label, count) in counts {
            let code = dictionary.code(label).ok_or_else(|| {
                DomainError::Inconsistent(format!(
                    "'{label}' on level {level} is missing from the dictionary"
                ))
            })?;
            table.put(code, level, V::fraction(count, rows.len()));
        }
    }
    Ok(table)
}

/// Shares derived from an explicit hierarchy table.
///
/// The share of a generalized value on a level is the number of leaves that generalize
/// to it, divided by the number of leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainShareMaterialized {
    domain_size: f64,
    table: ShareTable<f64>,
}

impl DomainShareMaterialized {
    /// Builds the shares of one column. `dictionary` must be the dictionary the hierarchy
    /// was encoded with.
    pub fn new(hierarchy: &Hierarchy, dictionary: &Dictionary) -> DomainResult<Self> {
        let domain_size = hierarchy.rows().len() as f64;
        let table = leaf_share_table(hierarchy, dictionary)?;
        Ok(DomainShareMaterialized { domain_size, table })
    }

    /// Number of codes that carry a level-specific share.
    pub fn overrides(&self) -> usize {
        self.table.overrides()
    }
}

impl DomainShare for DomainShareMaterialized {
    fn share(&self, value: i32, level: usize) -> f64 {
        self.table.get(value, level).copied().unwrap_or(1.0)
    }

    fn domain_size(&self) -> f64 {
        self.domain_size
    }
}
