//! Selection of the share derivation per quasi-identifier.

use log::debug;

use infoloss_data::{DataManager, FunctionalHierarchy};

use crate::error::DomainResult;
use crate::interval::DomainShareInterval;
use crate::materialized::DomainShareMaterialized;
use crate::redaction::DomainShareRedaction;
use crate::reliable::DomainShareReliable;
use crate::share::DomainShare;

/// One share table per quasi-identifier, analytic where the attribute carries a
/// functional hierarchy and materialized otherwise.
pub fn create_domain_shares(manager: &DataManager) -> DomainResult<Vec<Box<dyn DomainShare>>> {
    let mut shares: Vec<Box<dyn DomainShare>> = Vec::with_capacity(manager.hierarchies().len());
    for (index, hierarchy) in manager.hierarchies().iter().enumerate() {
        let table = &manager.hierarchy_tables()[index];
        let dictionary = &manager.dictionaries()[index];
        let share: Box<dyn DomainShare> = match manager.functional_hierarchy(index) {
            Some(FunctionalHierarchy::Interval(functional)) => Box::new(DomainShareInterval::new(
                functional, hierarchy, dictionary,
            )?),
            Some(FunctionalHierarchy::Redaction(redaction)) => {
                let leaves: Vec<String> = table.leaves().map(str::to_string).collect();
                Box::new(DomainShareRedaction::from_hierarchy(redaction, &leaves))
            }
            None => Box::new(DomainShareMaterialized::new(table, dictionary)?),
        };
        debug!(
            "domain of '{}' has {} values",
            hierarchy.attribute(),
            share.domain_size()
        );
        shares.push(share);
    }
    Ok(shares)
}

/// Exact shares of every quasi-identifier.
pub fn create_reliable_shares(manager: &DataManager) -> DomainResult<Vec<DomainShareReliable>> {
    manager
        .hierarchy_tables()
        .iter()
        .zip(manager.dictionaries())
        .map(|(table, dictionary)| DomainShareReliable::new(table, dictionary))
        .collect()
}
