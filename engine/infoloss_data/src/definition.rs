use std::collections::HashMap;

use crate::functional::{DataType, FunctionalHierarchy};

/// Describes the role of each attribute of a dataset.
///
/// Quasi-identifiers are generalized; analyzed attributes are carried along unchanged and
/// their per-class value distributions are tracked by the grouping stage. Response
/// variables (used by the classification metric) may be either.
#[derive(Debug, Clone, Default)]
pub struct DataDefinition {
    quasi_identifiers: Vec<String>,
    analyzed: Vec<String>,
    response_variables: Vec<String>,
    data_types: HashMap<String, DataType>,
    functional: HashMap<String, FunctionalHierarchy>,
}

impl DataDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quasi_identifier(mut self, attribute: &str) -> Self {
        if !self.quasi_identifiers.iter().any(|a| a == attribute) {
            self.quasi_identifiers.push(attribute.to_string());
        }
        self
    }

    pub fn with_analyzed_attribute(mut self, attribute: &str) -> Self {
        if !self.analyzed.iter().any(|a| a == attribute) {
            self.analyzed.push(attribute.to_string());
        }
        self
    }

    /// Marks an attribute as response variable. A response variable that is not a
    /// quasi-identifier is tracked as an analyzed attribute by the data manager.
    pub fn with_response_variable(mut self, attribute: &str) -> Self {
        if !self.response_variables.iter().any(|a| a == attribute) {
            self.response_variables.push(attribute.to_string());
        }
        self
    }

    pub fn with_data_type(mut self, attribute: &str, data_type: DataType) -> Self {
        self.data_types.insert(attribute.to_string(), data_type);
        self
    }

    pub fn with_functional_hierarchy(mut self, attribute: &str, h: FunctionalHierarchy) -> Self {
        self.functional.insert(attribute.to_string(), h);
        self
    }

    pub fn quasi_identifiers(&self) -> &[String] {
        &self.quasi_identifiers
    }

    pub fn analyzed_attributes(&self) -> &[String] {
        &self.analyzed
    }

    pub fn response_variables(&self) -> &[String] {
        &self.response_variables
    }

    pub fn is_quasi_identifier(&self, attribute: &str) -> bool {
        self.quasi_identifiers.iter().any(|a| a == attribute)
    }

    /// Data type of an attribute, `String` unless configured otherwise.
    pub fn data_type(&self, attribute: &str) -> DataType {
        self.data_types
            .get(attribute)
            .copied()
            .unwrap_or(DataType::String)
    }

    pub fn functional_hierarchy(&self, attribute: &str) -> Option<&FunctionalHierarchy> {
        self.functional.get(attribute)
    }
}
