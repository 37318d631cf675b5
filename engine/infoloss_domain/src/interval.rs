use serde::{Deserialize, Serialize};

use infoloss_data::{Dictionary, GeneralizationHierarchy, IntervalHierarchy};

use crate::error::{DomainError, DomainResult};
use crate::share::{DomainShare, ShareTable};

/// Shares derived from an interval hierarchy: the width of a range relative to the width
/// of the coded domain.
///
/// Bottom- and top-coded groups and the `*` group represent the whole domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainShareInterval {
    domain_size: f64,
    table: ShareTable<f64>,
}

impl DomainShareInterval {
    pub fn new(
        functional: &IntervalHierarchy,
        hierarchy: &GeneralizationHierarchy,
        dictionary: &Dictionary,
    ) -> DomainResult<Self> {
        let data_type = functional.data_type();
        if !data_type.is_ratio_scaled() {
            return Err(DomainError::UnknownDataType(data_type));
        }
        if functional.height() != hierarchy.height() {
            return Err(DomainError::Inconsistent(format!(
                "interval hierarchy of '{}' has {} levels, encoded hierarchy {}",
                hierarchy.attribute(),
                functional.height(),
                hierarchy.height()
            )));
        }

        let domain_size = hierarchy.leaves() as f64;
        let minimum = 1.0 / domain_size;
        let width = functional.domain_width();
        let mut table = ShareTable::new(dictionary.len());

        for leaf in 0..hierarchy.leaves() as i32 {
            let label = dictionary.value(leaf).ok_or_else(|| {
                DomainError::Inconsistent(format!("leaf code {leaf} is missing from the dictionary"))
            })?;
            let x = data_type.parse(label)?;
            table.put(leaf, 0, minimum);
            for level in 1..hierarchy.height() {
                let interval = functional.interval(level, x)?;
                let share = if level == hierarchy.max_level() || interval.is_out_of_bound() {
                    1.0
                } else if width > 0.0 {
                    (interval.width() / width).clamp(minimum, 1.0)
                } else {
                    1.0
                };
                table.put(hierarchy.get(leaf, level), level, share);
            }
        }

        Ok(DomainShareInterval { domain_size, table })
    }
}

impl DomainShare for DomainShareInterval {
    fn share(&self, value: i32, level: usize) -> f64 {
        self.table.get(value, level).copied().unwrap_or(1.0)
    }

    fn domain_size(&self) -> f64 {
        self.domain_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infoloss_data::DataType;

    fn ages() -> Vec<String> {
        ["5", "15", "35", "-2", "120"].iter().map(|s| s.to_string()).collect()
    }

    fn build(functional: &IntervalHierarchy) -> (GeneralizationHierarchy, DomainShareInterval) {
        let table = functional.build(&ages()).unwrap();
        let (h, dictionary) = GeneralizationHierarchy::encode("age", &table).unwrap();
        let shares = DomainShareInterval::new(functional, &h, &dictionary).unwrap();
        (h, shares)
    }

    #[test]
    fn test_share_is_relative_width() {
        let functional = IntervalHierarchy::uniform(DataType::Integer, 0.0, 100.0, &[10.0, 50.0]);
        let (h, shares) = build(&functional);
        assert_eq!(shares.domain_size(), 5.0);
        assert_eq!(shares.share(0, 0), 0.2);
        // [0, 10[ is a tenth of the domain but never less than one leaf.
        assert_eq!(shares.share(h.get(0, 1), 1), 0.2);
        assert_eq!(shares.share(h.get(0, 2), 2), 0.5);
        assert_eq!(shares.share(h.get(3, 1), 1), 1.0);
        assert_eq!(shares.share(h.get(4, 2), 2), 1.0);
        assert_eq!(shares.share(h.get(2, 3), 3), 1.0);
    }

    #[test]
    fn test_string_type_is_rejected() {
        let functional = IntervalHierarchy::uniform(DataType::Integer, 0.0, 100.0, &[10.0]);
        let (h, _) = build(&functional);
        let strings = IntervalHierarchy::uniform(DataType::String, 0.0, 100.0, &[10.0]);
        let table = functional.build(&ages()).unwrap();
        let (_, dictionary) = GeneralizationHierarchy::encode("age", &table).unwrap();
        let err = DomainShareInterval::new(&strings, &h, &dictionary).unwrap_err();
        assert!(matches!(err, DomainError::UnknownDataType(DataType::String)));
    }

    #[test]
    fn test_serde_round_trip_preserves_shares() {
        let functional = IntervalHierarchy::uniform(DataType::Integer, 0.0, 100.0, &[10.0, 50.0]);
        let (h, shares) = build(&functional);
        let json = serde_json::to_string(&shares).unwrap();
        let restored: DomainShareInterval = serde_json::from_str(&json).unwrap();
        for leaf in 0..h.leaves() as i32 {
            for level in 0..h.height() {
                let code = h.get(leaf, level);
                assert_eq!(restored.share(code, level), shares.share(code, level));
            }
        }
    }
}
