//! Generalization hierarchies in string form and in encoded form.
//!
//! A [`Hierarchy`] is the user-facing table: one row per leaf value, one column per
//! generalization level, level 0 being the original value. Encoding it with
//! [`GeneralizationHierarchy::encode`] yields the dictionary of the column plus an
//! integer map `map[leaf][level]` that the metrics work on.

use std::collections::HashSet;

use crate::dictionary::Dictionary;
use crate::error::{DataError, DataResult};

/// A generalization hierarchy as a table of strings.
#[derive(Debug, Clone, PartialEq)]
pub struct Hierarchy {
    table: Vec<Vec<String>>,
}

impl Hierarchy {
    pub fn new(table: Vec<Vec<String>>) -> Self {
        Hierarchy { table }
    }

    /// Convenience constructor from string slices, mostly for tests and fixtures.
    pub fn from_rows<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let table = rows
            .into_iter()
            .map(|row| row.into_iter().map(|s| s.as_ref().to_string()).collect())
            .collect();
        Hierarchy { table }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.table
    }

    /// Number of levels, including the original values.
    pub fn height(&self) -> usize {
        self.table.first().map(|r| r.len()).unwrap_or(0)
    }

    pub fn leaves(&self) -> impl Iterator<Item = &str> {
        self.table.iter().filter_map(|r| r.first().map(|s| s.as_str()))
    }

    /// Checks that the table is non-empty, rectangular and has distinct leaves.
    pub fn validate(&self, attribute: &str) -> DataResult<()> {
        let malformed = |reason: String| DataError::MalformedHierarchy {
            attribute: attribute.to_string(),
            reason,
        };
        let height = self.height();
        if self.table.is_empty() || height == 0 {
            return Err(malformed("no levels".to_string()));
        }
        let mut seen = HashSet::new();
        for (i, row) in self.table.iter().enumerate() {
            if row.len() != height {
                return Err(malformed(format!(
                    "row {i} has {} levels, expected {height}",
                    row.len()
                )));
            }
            if !seen.insert(row[0].as_str()) {
                return Err(malformed(format!("duplicate leaf '{}'", row[0])));
            }
        }
        Ok(())
    }
}

/// The encoded form of a [`Hierarchy`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeneralizationHierarchy {
    attribute: String,
    map: Vec<Vec<i32>>,
    distinct_values: Vec<usize>,
}

impl GeneralizationHierarchy {
    /// Encodes a hierarchy, returning the encoded map together with the column dictionary.
    ///
    /// Leaves are registered first, so the leaf in row `i` receives code `i`.
    pub fn encode(attribute: &str, hierarchy: &Hierarchy) -> DataResult<(Self, Dictionary)> {
        hierarchy.validate(attribute)?;
        let mut dictionary = Dictionary::new();
        for leaf in hierarchy.leaves() {
            dictionary.register(leaf);
        }

        let height = hierarchy.height();
        let mut map = Vec::with_capacity(hierarchy.rows().len());
        for row in hierarchy.rows() {
            let encoded: Vec<i32> = row.iter().map(|v| dictionary.register(v)).collect();
            map.push(encoded);
        }

        let distinct_values = (0..height)
            .map(|level| {
                map.iter()
                    .map(|row: &Vec<i32>| row[level])
                    .collect::<HashSet<_>>()
                    .len()
            })
            .collect();

        Ok((
            GeneralizationHierarchy {
                attribute: attribute.to_string(),
                map,
                distinct_values,
            },
            dictionary,
        ))
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// The generalized code of leaf `value` at `level`.
    #[inline]
    pub fn get(&self, value: i32, level: usize) -> i32 {
        self.map[value as usize][level]
    }

    /// The generalization path of a leaf value, from level 0 upwards.
    pub fn path(&self, value: i32) -> &[i32] {
        &self.map[value as usize]
    }

    /// Number of levels, including level 0.
    pub fn height(&self) -> usize {
        self.distinct_values.len()
    }

    /// The highest level, i.e. `height - 1`.
    pub fn max_level(&self) -> usize {
        self.height().saturating_sub(1)
    }

    /// Number of leaf values.
    pub fn leaves(&self) -> usize {
        self.map.len()
    }

    /// Number of distinct generalized values on `level`.
    pub fn distinct_values(&self, level: usize) -> usize {
        self.distinct_values[level]
    }

    pub fn map(&self) -> &[Vec<i32>] {
        &self.map
    }
}
