use std::fmt;

use crate::error::{DataError, DataResult};
use crate::hierarchy::GeneralizationHierarchy;

/// The generalization level of every quasi-identifier for one lattice node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transformation {
    levels: Vec<usize>,
}

impl Transformation {
    pub fn new(levels: Vec<usize>) -> Self {
        Transformation { levels }
    }

    /// The bottom of the lattice: every attribute on level 0.
    pub fn bottom(dimensions: usize) -> Self {
        Transformation {
            levels: vec![0; dimensions],
        }
    }

    /// The top of the lattice for the given hierarchies.
    pub fn top(hierarchies: &[GeneralizationHierarchy]) -> Self {
        Transformation {
            levels: hierarchies.iter().map(|h| h.max_level()).collect(),
        }
    }

    pub fn generalization(&self) -> &[usize] {
        &self.levels
    }

    #[inline]
    pub fn level(&self, dimension: usize) -> usize {
        self.levels[dimension]
    }

    pub fn dimensions(&self) -> usize {
        self.levels.len()
    }

    /// Sum of all levels.
    pub fn total_level(&self) -> usize {
        self.levels.iter().sum()
    }

    /// Checks that every level exists in the corresponding hierarchy.
    pub fn validate(&self, hierarchies: &[GeneralizationHierarchy]) -> DataResult<()> {
        if self.levels.len() != hierarchies.len() {
            return Err(DataError::InvalidTransformation(format!(
                "{} levels for {} quasi-identifiers",
                self.levels.len(),
                hierarchies.len()
            )));
        }
        for (level, h) in self.levels.iter().zip(hierarchies) {
            if *level >= h.height() {
                return Err(DataError::InvalidTransformation(format!(
                    "level {level} exceeds height {} of '{}'",
                    h.height(),
                    h.attribute()
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let levels: Vec<String> = self.levels.iter().map(|l| l.to_string()).collect();
        write!(f, "[{}]", levels.join(", "))
    }
}

impl From<Vec<usize>> for Transformation {
    fn from(levels: Vec<usize>) -> Self {
        Transformation::new(levels)
    }
}
