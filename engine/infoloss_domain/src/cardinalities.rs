//! Value frequencies per column and generalization level.

use std::collections::HashMap;

use log::debug;

use infoloss_data::{DataManager, EquivalenceClasses};

/// Dense frequencies built from the encoded rows.
///
/// For a leaf code `v`, `get(column, v, level)` is the number of included rows whose
/// value generalizes on `level` to the same group as `v`. For a generalized code `g`
/// that does not also occur as a leaf, it is the number of rows generalized to `g` on
/// `level`.
#[derive(Debug, Clone, PartialEq)]
pub struct Cardinalities {
    heights: Vec<usize>,
    columns: Vec<Vec<usize>>,
}

impl Cardinalities {
    pub fn from_manager(manager: &DataManager) -> Self {
        let data = manager.data_generalized();
        let hierarchies = manager.hierarchies();
        let mut heights = Vec::with_capacity(hierarchies.len());
        let mut columns = Vec::with_capacity(hierarchies.len());

        for (column, (hierarchy, dictionary)) in hierarchies
            .iter()
            .zip(manager.dictionaries())
            .enumerate()
        {
            let height = hierarchy.height();
            let mut counts = vec![0usize; dictionary.len() * height];

            for row in 0..data.rows() {
                if manager.is_included(row) {
                    counts[data.get(row, column) as usize * height] += 1;
                }
            }

            // Generalized codes first, so that leaves keep their own semantics if a label
            // occurs both as a leaf and as a group.
            let mut group = vec![0usize; dictionary.len()];
            for level in 1..height {
                group.iter_mut().for_each(|c| *c = 0);
                for leaf in 0..hierarchy.leaves() as i32 {
                    group[hierarchy.get(leaf, level) as usize] += counts[leaf as usize * height];
                }
                for (code, &count) in group.iter().enumerate() {
                    if count > 0 {
                        counts[code * height + level] = count;
                    }
                }
                for leaf in 0..hierarchy.leaves() as i32 {
                    counts[leaf as usize * height + level] =
                        group[hierarchy.get(leaf, level) as usize];
                }
            }

            heights.push(height);
            columns.push(counts);
        }

        debug!(
            "built cardinalities for {} columns over {} rows",
            columns.len(),
            manager.effective_rows()
        );

        Cardinalities { heights, columns }
    }

    /// Frequency of `value` on `level` in `column`; zero for codes that never occur.
    #[inline]
    pub fn get(&self, column: usize, value: i32, level: usize) -> usize {
        let height = self.heights[column];
        self.columns[column]
            .get(value as usize * height + level)
            .copied()
            .unwrap_or(0)
    }

    pub fn columns(&self) -> usize {
        self.columns.len()
    }
}

/// Frequencies of generalized values, collected from equivalence classes.
///
/// Values are kept in the order they are first seen, so iteration follows the class
/// order of the grouping stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardinalitiesGeneric {
    columns: Vec<GenericColumn>,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct GenericColumn {
    index: HashMap<i32, usize>,
    counts: Vec<(i32, usize)>,
}

impl GenericColumn {
    fn add(&mut self, value: i32, count: usize) {
        match self.index.get(&value) {
            Some(&i) => self.counts[i].1 += count,
            None => {
                self.index.insert(value, self.counts.len());
                self.counts.push((value, count));
            }
        }
    }
}

impl CardinalitiesGeneric {
    /// Sums the class counts per generalized value of every column, suppressed classes
    /// included.
    pub fn from_classes(classes: &EquivalenceClasses, dimensions: usize) -> Self {
        let mut columns = vec![GenericColumn::default(); dimensions];
        for class in classes {
            for (column, &value) in class.key.iter().enumerate().take(dimensions) {
                columns[column].add(value, class.count);
            }
        }
        CardinalitiesGeneric { columns }
    }

    #[inline]
    pub fn get(&self, column: usize, value: i32) -> usize {
        let column = &self.columns[column];
        column
            .index
            .get(&value)
            .map(|&i| column.counts[i].1)
            .unwrap_or(0)
    }

    /// Pairs of generalized value and frequency of one column.
    pub fn iter(&self, column: usize) -> impl Iterator<Item = (i32, usize)> + '_ {
        self.columns[column].counts.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infoloss_data::{DataDefinition, EquivalenceClass, Hierarchy, RowSet};
    use pretty_assertions::assert_eq;

    fn manager() -> DataManager {
        let header = vec!["zip".to_string()];
        let rows: Vec<Vec<String>> = ["47677", "47602", "47677", "47905", "47678"]
            .iter()
            .map(|z| vec![z.to_string()])
            .collect();
        let mut hierarchies = std::collections::HashMap::new();
        hierarchies.insert(
            "zip".to_string(),
            Hierarchy::from_rows([
                ["47677", "4767*", "*"],
                ["47602", "4760*", "*"],
                ["47678", "4767*", "*"],
                ["47905", "4790*", "*"],
            ]),
        );
        let definition = DataDefinition::new().with_quasi_identifier("zip");
        DataManager::new(&header, &rows, definition, hierarchies).unwrap()
    }

    #[test]
    fn test_leaf_cardinalities_follow_groups() {
        let manager = manager();
        let cards = Cardinalities::from_manager(&manager);
        // 47677 twice, 47678 once: both in 4767*
        assert_eq!(cards.get(0, 0, 0), 2);
        assert_eq!(cards.get(0, 0, 1), 3);
        assert_eq!(cards.get(0, 2, 1), 3);
        assert_eq!(cards.get(0, 1, 1), 1);
        assert_eq!(cards.get(0, 3, 2), 5);
        let group = manager.hierarchies()[0].get(0, 1);
        assert_eq!(cards.get(0, group, 1), 3);
    }

    #[test]
    fn test_level_zero_sums_to_rows() {
        let manager = manager();
        let cards = Cardinalities::from_manager(&manager);
        let total: usize = (0..4).map(|v| cards.get(0, v, 0)).sum();
        assert_eq!(total, manager.rows());
    }

    #[test]
    fn test_subset_restricts_counts() {
        let manager = manager().with_subset(RowSet::from_indices(5, &[0, 3]).unwrap());
        let cards = Cardinalities::from_manager(&manager);
        assert_eq!(cards.get(0, 0, 0), 1);
        assert_eq!(cards.get(0, 0, 1), 1);
        assert_eq!(cards.get(0, 3, 2), 2);
    }

    #[test]
    fn test_generic_cardinalities_keep_first_seen_order() {
        let classes: EquivalenceClasses = vec![
            EquivalenceClass::new(vec![7, 1], 2),
            EquivalenceClass::new(vec![5, 1], 3),
            EquivalenceClass::new(vec![7, 2], 1).suppressed(),
        ]
        .into_iter()
        .collect();
        let cards = CardinalitiesGeneric::from_classes(&classes, 2);
        assert_eq!(cards.get(0, 7), 3);
        assert_eq!(cards.get(1, 1), 5);
        assert_eq!(cards.get(1, 9), 0);
        assert_eq!(cards.iter(0).collect::<Vec<_>>(), vec![(7, 3), (5, 3)]);
    }
}
