use infoloss_data::{
    DataManager, DataMatrix, EquivalenceClass, EquivalenceClasses, GeneralizationHierarchy,
    Transformation,
};

/// Finds the equivalence class an input row ends up in under a transformation.
#[derive(Debug, Clone)]
pub struct TupleMatcher {
    hierarchies: Vec<GeneralizationHierarchy>,
    data: DataMatrix,
}

impl TupleMatcher {
    pub fn new(manager: &DataManager) -> Self {
        TupleMatcher {
            hierarchies: manager.hierarchies().to_vec(),
            data: manager.data_generalized().clone(),
        }
    }

    /// The generalized key of `row`.
    pub fn key(&self, row: usize, transformation: &Transformation) -> Vec<i32> {
        self.data
            .row(row)
            .iter()
            .zip(&self.hierarchies)
            .enumerate()
            .map(|(dimension, (&value, hierarchy))| {
                hierarchy.get(value, transformation.level(dimension))
            })
            .collect()
    }

    pub fn get_class<'a>(
        &self,
        row: usize,
        transformation: &Transformation,
        classes: &'a EquivalenceClasses,
    ) -> Option<&'a EquivalenceClass> {
        classes.get(&self.key(row, transformation))
    }

    /// The level-0 code of `row` in `column`.
    #[inline]
    pub fn value(&self, row: usize, column: usize) -> i32 {
        self.data.get(row, column)
    }

    pub fn rows(&self) -> usize {
        self.data.rows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infoloss_data::{DataDefinition, Hierarchy};
    use std::collections::HashMap;

    #[test]
    fn test_row_is_matched_to_its_class() {
        let header = vec!["zip".to_string()];
        let rows = vec![vec!["111".to_string()], vec!["112".to_string()]];
        let mut hierarchies = HashMap::new();
        hierarchies.insert(
            "zip".to_string(),
            Hierarchy::from_rows([["111", "11*", "*"], ["112", "11*", "*"]]),
        );
        let manager = DataManager::new(
            &header,
            &rows,
            DataDefinition::new().with_quasi_identifier("zip"),
            hierarchies,
        )
        .unwrap();
        let matcher = TupleMatcher::new(&manager);
        let transformation = Transformation::new(vec![1]);
        let group = manager.hierarchies()[0].get(0, 1);
        let classes: EquivalenceClasses = vec![EquivalenceClass::new(vec![group], 2)]
            .into_iter()
            .collect();

        assert_eq!(matcher.key(1, &transformation), vec![group]);
        assert_eq!(matcher.get_class(0, &transformation, &classes).map(|c| c.count), Some(2));
        assert!(matcher
            .get_class(0, &Transformation::new(vec![0]), &classes)
            .is_none());
    }
}
