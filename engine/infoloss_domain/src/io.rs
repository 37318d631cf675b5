//! Persistence of the value maps used by domain shares.
//!
//! Maps from `u64` keys to share values are written as three parallel arrays
//! (`allocated`, `keys`, `values`) tagged with a format version. Readers skip slots whose
//! allocation flag is unset, so tables written from an open-addressing layout with empty
//! slots load as well as the dense tables this crate writes.

use std::collections::HashMap;
use std::fmt::Debug;
use std::io::{Read, Write};
use std::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Version of the parallel-array layout.
pub const FORMAT_VERSION: u32 = 1;

/// A share value that can be persisted.
pub trait ShareValue: Clone + PartialEq + Debug + Send + Sync {
    type Persisted: Serialize + DeserializeOwned;

    fn persist(&self) -> Self::Persisted;

    fn restore(persisted: Self::Persisted) -> DomainResult<Self>;

    /// `count / total`.
    fn fraction(count: usize, total: usize) -> Self;
}

impl ShareValue for f64 {
    type Persisted = f64;

    fn persist(&self) -> f64 {
        *self
    }

    fn restore(persisted: f64) -> DomainResult<Self> {
        Ok(persisted)
    }

    fn fraction(count: usize, total: usize) -> Self {
        count as f64 / total as f64
    }
}

/// Fractions are written as `numerator/denominator` strings.
impl ShareValue for BigRational {
    type Persisted = String;

    fn persist(&self) -> String {
        format!("{}/{}", self.numer(), self.denom())
    }

    fn restore(persisted: String) -> DomainResult<Self> {
        BigRational::from_str(&persisted)
            .map_err(|e| DomainError::Serialization(format!("fraction '{persisted}': {e}")))
    }

    fn fraction(count: usize, total: usize) -> Self {
        BigRational::new(BigInt::from(count), BigInt::from(total))
    }
}

/// A `u64 -> V` map in parallel-array layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedMap<P> {
    pub version: u32,
    pub allocated: Vec<bool>,
    pub keys: Vec<u64>,
    pub values: Vec<P>,
}

/// Lays out a map densely, ordered by key so the output is deterministic.
pub fn write_map<V: ShareValue>(map: &HashMap<u64, V>) -> PersistedMap<V::Persisted> {
    let mut keys: Vec<u64> = map.keys().copied().collect();
    keys.sort_unstable();
    let values = keys.iter().map(|k| map[k].persist()).collect();
    PersistedMap {
        version: FORMAT_VERSION,
        allocated: vec![true; keys.len()],
        keys,
        values,
    }
}

pub fn read_map<V: ShareValue>(persisted: PersistedMap<V::Persisted>) -> DomainResult<HashMap<u64, V>> {
    if persisted.version != FORMAT_VERSION {
        return Err(DomainError::Serialization(format!(
            "unsupported map format version {}",
            persisted.version
        )));
    }
    let len = persisted.allocated.len();
    if persisted.keys.len() != len || persisted.values.len() != len {
        return Err(DomainError::Serialization(format!(
            "array lengths differ: {} flags, {} keys, {} values",
            len,
            persisted.keys.len(),
            persisted.values.len()
        )));
    }
    let mut map = HashMap::with_capacity(len);
    for ((allocated, key), value) in persisted
        .allocated
        .into_iter()
        .zip(persisted.keys)
        .zip(persisted.values)
    {
        if allocated {
            map.insert(key, V::restore(value)?);
        }
    }
    Ok(map)
}

/// Writes any persistable structure as JSON.
pub fn save<T: Serialize, W: Write>(value: &T, writer: W) -> DomainResult<()> {
    serde_json::to_writer(writer, value)?;
    Ok(())
}

/// Reads a structure written by [`save`].
pub fn load<T: DeserializeOwned, R: Read>(reader: R) -> DomainResult<T> {
    Ok(serde_json::from_reader(reader)?)
}
