//! The domain-share contract and the table backing materialized shares.

use std::collections::HashMap;
use std::fmt::Debug;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DomainError, DomainResult};
use crate::io::{read_map, write_map, PersistedMap, ShareValue, FORMAT_VERSION};

/// Fraction of an attribute's domain a generalized value represents.
pub trait DomainShare: Send + Sync + Debug {
    /// Share of `value` (a generalized code) on `level`, in `(0, 1]`.
    fn share(&self, value: i32, level: usize) -> f64;

    /// Number of distinct level-0 values.
    fn domain_size(&self) -> f64;
}

/// Key of the override map: the code in the upper, the level in the lower half.
#[inline]
pub fn share_key(value: i32, level: usize) -> u64 {
    ((value as u32 as u64) << 32) | (level as u32 as u64)
}

/// Per-code storage state.
#[derive(Debug, Clone, PartialEq)]
enum Slot<T> {
    Unset,
    /// The share of this code on every level it occurs on.
    Single(T),
    /// The share on the first level it was stored for; other levels may differ and are
    /// kept in the override map.
    Overridden(T),
}

/// Shares indexed by code, with an override map for codes that occur on several levels
/// with different shares.
///
/// The common case stores one share inline per code; only codes whose share depends on
/// the level pay for a map entry keyed by [`share_key`].
#[derive(Debug, Clone, PartialEq)]
pub struct ShareTable<T> {
    slots: Vec<Slot<T>>,
    overrides: HashMap<u64, T>,
}

impl<T: ShareValue> ShareTable<T> {
    pub fn new(size: usize) -> Self {
        ShareTable {
            slots: vec![Slot::Unset; size],
            overrides: HashMap::new(),
        }
    }

    pub fn put(&mut self, value: i32, level: usize, share: T) {
        let slot = &mut self.slots[value as usize];
        match slot {
            Slot::Unset => *slot = Slot::Single(share),
            Slot::Single(existing) => {
                if *existing != share {
                    let first = existing.clone();
                    *slot = Slot::Overridden(first);
                    self.overrides.insert(share_key(value, level), share);
                }
            }
            Slot::Overridden(existing) => {
                if *existing != share {
                    self.overrides.insert(share_key(value, level), share);
                }
            }
        }
    }

    /// The stored share, or `None` for a code that was never stored.
    pub fn get(&self, value: i32, level: usize) -> Option<&T> {
        match self.slots.get(value as usize)? {
            Slot::Unset => None,
            Slot::Single(share) => Some(share),
            Slot::Overridden(share) => Some(
                self.overrides
                    .get(&share_key(value, level))
                    .unwrap_or(share),
            ),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of (code, level) pairs stored in the override map.
    pub fn overrides(&self) -> usize {
        self.overrides.len()
    }

    fn to_persisted(&self) -> PersistedTable<T::Persisted> {
        PersistedTable {
            version: FORMAT_VERSION,
            defaults: self
                .slots
                .iter()
                .map(|s| match s {
                    Slot::Unset => None,
                    Slot::Single(v) | Slot::Overridden(v) => Some(v.persist()),
                })
                .collect(),
            overrides: write_map(&self.overrides),
        }
    }

    fn from_persisted(persisted: PersistedTable<T::Persisted>) -> DomainResult<Self> {
        if persisted.version != FORMAT_VERSION {
            return Err(DomainError::Serialization(format!(
                "unsupported share table version {}",
                persisted.version
            )));
        }
        let overrides: HashMap<u64, T> = read_map(persisted.overrides)?;
        let mut slots = Vec::with_capacity(persisted.defaults.len());
        for default in persisted.defaults {
            slots.push(match default {
                None => Slot::Unset,
                Some(v) => Slot::Single(T::restore(v)?),
            });
        }
        for key in overrides.keys() {
            let value = (key >> 32) as usize;
            match slots.get_mut(value) {
                Some(slot @ Slot::Single(_)) => {
                    if let Slot::Single(v) = std::mem::replace(slot, Slot::Unset) {
                        *slot = Slot::Overridden(v);
                    }
                }
                Some(Slot::Overridden(_)) => {}
                _ => {
                    return Err(DomainError::Serialization(format!(
                        "override for code {value} without a default share"
                    )))
                }
            }
        }
        Ok(ShareTable { slots, overrides })
    }
}

#[derive(Serialize, Deserialize)]
struct PersistedTable<P> {
    version: u32,
    defaults: Vec<Option<P>>,
    overrides: PersistedMap<P>,
}

impl<T: ShareValue> Serialize for ShareTable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_persisted().serialize(serializer)
    }
}

impl<'de, T: ShareValue> Deserialize<'de> for ShareTable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let persisted = PersistedTable::<T::Persisted>::deserialize(deserializer)?;
        ShareTable::from_persisted(persisted).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_only_when_share_differs() {
        let mut table = ShareTable::new(3);
        table.put(0, 0, 0.25);
        table.put(0, 1, 0.25);
        assert_eq!(table.overrides(), 0);
        table.put(0, 2, 1.0);
        assert_eq!(table.overrides(), 1);
        assert_eq!(table.get(0, 0), Some(&0.25));
        assert_eq!(table.get(0, 1), Some(&0.25));
        assert_eq!(table.get(0, 2), Some(&1.0));
        assert_eq!(table.get(1, 0), None);
        assert_eq!(table.get(9, 0), None);
    }

    #[test]
    fn test_table_serde_round_trip() {
        let mut table = ShareTable::new(2);
        table.put(0, 0, 0.5);
        table.put(0, 1, 1.0);
        table.put(1, 0, 0.5);
        let json = serde_json::to_string(&table).unwrap();
        let restored: ShareTable<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, table);
    }

    #[test]
    fn test_key_layout() {
        assert_eq!(share_key(1, 2), (1u64 << 32) | 2);
    }
}
