//! The encoded input handed to metrics during initialization.

use std::collections::HashMap;

use log::debug;

use crate::definition::DataDefinition;
use crate::dictionary::Dictionary;
use crate::error::{DataError, DataResult};
use crate::functional::FunctionalHierarchy;
use crate::hierarchy::{GeneralizationHierarchy, Hierarchy};

/// Row-major matrix of integer codes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataMatrix {
    rows: usize,
    columns: usize,
    data: Vec<i32>,
}

impl DataMatrix {
    pub fn new(rows: usize, columns: usize) -> Self {
        DataMatrix {
            rows,
            columns,
            data: vec![0; rows * columns],
        }
    }

    /// Builds a matrix from rows of equal width.
    pub fn from_rows(rows: &[Vec<i32>]) -> Self {
        let columns = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * columns);
        for row in rows {
            data.extend_from_slice(row);
        }
        DataMatrix {
            rows: rows.len(),
            columns,
            data,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    #[inline]
    pub fn get(&self, row: usize, column: usize) -> i32 {
        self.data[row * self.columns + column]
    }

    #[inline]
    pub fn set(&mut self, row: usize, column: usize, value: i32) {
        self.data[row * self.columns + column] = value;
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[i32] {
        &self.data[row * self.columns..(row + 1) * self.columns]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[i32]> {
        (0..self.rows).map(move |r| self.row(r))
    }
}

/// A subset of rows, e.g. the research sample.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSet {
    members: Vec<bool>,
    size: usize,
}

impl RowSet {
    pub fn new(rows: usize) -> Self {
        RowSet {
            members: vec![false; rows],
            size: 0,
        }
    }

    pub fn from_indices(rows: usize, indices: &[usize]) -> DataResult<Self> {
        let mut set = Self::new(rows);
        for &i in indices {
            set.add(i)?;
        }
        Ok(set)
    }

    pub fn add(&mut self, row: usize) -> DataResult<()> {
        let rows = self.members.len();
        let member = self
            .members
            .get_mut(row)
            .ok_or(DataError::RowOutOfRange { row, rows })?;
        if !*member {
            *member = true;
            self.size += 1;
        }
        Ok(())
    }

    #[inline]
    pub fn contains(&self, row: usize) -> bool {
        self.members.get(row).copied().unwrap_or(false)
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

/// Encoded dataset, hierarchies and dictionaries of one anonymization problem.
#[derive(Debug, Clone)]
pub struct DataManager {
    definition: DataDefinition,
    quasi_identifiers: Vec<String>,
    hierarchy_tables: Vec<Hierarchy>,
    hierarchies: Vec<GeneralizationHierarchy>,
    dictionaries: Vec<Dictionary>,
    generalized: DataMatrix,
    analyzed_attributes: Vec<String>,
    analyzed_dictionaries: Vec<Dictionary>,
    analyzed: DataMatrix,
    subset: Option<RowSet>,
}

impl DataManager {
    /// Encodes string rows according to the definition.
    ///
    /// Quasi-identifiers take their hierarchy from `hierarchies` or, if absent, from the
    /// functional hierarchy registered in the definition.
    pub fn new(
        header: &[String],
        rows: &[Vec<String>],
        definition: DataDefinition,
        hierarchies: HashMap<String, Hierarchy>,
    ) -> DataResult<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != header.len() {
                return Err(DataError::RowWidth {
                    row: i,
                    expected: header.len(),
                    actual: row.len(),
                });
            }
        }
        let column_of = |attribute: &str| {
            header
                .iter()
                .position(|h| h == attribute)
                .ok_or_else(|| DataError::UnknownAttribute(attribute.to_string()))
        };

        let quasi_identifiers = definition.quasi_identifiers().to_vec();
        let mut hierarchy_tables = Vec::with_capacity(quasi_identifiers.len());
        let mut encoded_hierarchies = Vec::with_capacity(quasi_identifiers.len());
        let mut dictionaries = Vec::with_capacity(quasi_identifiers.len());
        let mut generalized = DataMatrix::new(rows.len(), quasi_identifiers.len());

        for (index, attribute) in quasi_identifiers.iter().enumerate() {
            let column = column_of(attribute)?;
            let table = match (hierarchies.get(attribute), definition.functional_hierarchy(attribute)) {
                (Some(table), _) => table.clone(),
                (None, Some(functional)) => {
                    functional.build(&distinct_in_order(rows, column))?
                }
                (None, None) => return Err(DataError::MissingHierarchy(attribute.clone())),
            };
            let (hierarchy, dictionary) = GeneralizationHierarchy::encode(attribute, &table)?;
            for (r, row) in rows.iter().enumerate() {
                let value = &row[column];
                match dictionary.code(value) {
                    Some(code) if (code as usize) < hierarchy.leaves() => {
                        generalized.set(r, index, code)
                    }
                    _ => {
                        return Err(DataError::ValueNotInHierarchy {
                            attribute: attribute.clone(),
                            value: value.clone(),
                        })
                    }
                }
            }
            hierarchy_tables.push(table);
            encoded_hierarchies.push(hierarchy);
            dictionaries.push(dictionary);
        }

        let mut analyzed_attributes: Vec<String> = definition.analyzed_attributes().to_vec();
        for response in definition.response_variables() {
            if !definition.is_quasi_identifier(response) && !analyzed_attributes.contains(response) {
                analyzed_attributes.push(response.clone());
            }
        }
        let mut analyzed = DataMatrix::new(rows.len(), analyzed_attributes.len());
        let mut analyzed_dictionaries = Vec::with_capacity(analyzed_attributes.len());
        for (index, attribute) in analyzed_attributes.iter().enumerate() {
            let column = column_of(attribute)?;
            let mut dictionary = Dictionary::new();
            for (r, row) in rows.iter().enumerate() {
                analyzed.set(r, index, dictionary.register(&row[column]));
            }
            analyzed_dictionaries.push(dictionary);
        }

        debug!(
            "encoded {} rows with {} quasi-identifiers and {} analyzed attributes",
            rows.len(),
            quasi_identifiers.len(),
            analyzed_attributes.len()
        );

        Ok(DataManager {
            definition,
            quasi_identifiers,
            hierarchy_tables,
            hierarchies: encoded_hierarchies,
            dictionaries,
            generalized,
            analyzed_attributes,
            analyzed_dictionaries,
            analyzed,
            subset: None,
        })
    }

    /// Restricts metric statistics to a research subset.
    pub fn with_subset(mut self, subset: RowSet) -> Self {
        self.subset = Some(subset);
        self
    }

    pub fn definition(&self) -> &DataDefinition {
        &self.definition
    }

    pub fn quasi_identifiers(&self) -> &[String] {
        &self.quasi_identifiers
    }

    pub fn hierarchies(&self) -> &[GeneralizationHierarchy] {
        &self.hierarchies
    }

    pub fn hierarchy_tables(&self) -> &[Hierarchy] {
        &self.hierarchy_tables
    }

    /// Dictionaries of the quasi-identifiers, in quasi-identifier order.
    pub fn dictionaries(&self) -> &[Dictionary] {
        &self.dictionaries
    }

    /// The encoded quasi-identifier columns.
    pub fn data_generalized(&self) -> &DataMatrix {
        &self.generalized
    }

    pub fn analyzed_attributes(&self) -> &[String] {
        &self.analyzed_attributes
    }

    pub fn analyzed_dictionaries(&self) -> &[Dictionary] {
        &self.analyzed_dictionaries
    }

    pub fn data_analyzed(&self) -> &DataMatrix {
        &self.analyzed
    }

    pub fn subset(&self) -> Option<&RowSet> {
        self.subset.as_ref()
    }

    /// Total number of encoded rows.
    pub fn rows(&self) -> usize {
        self.generalized.rows()
    }

    /// Number of rows statistics are computed over: the subset size if a subset is set.
    pub fn effective_rows(&self) -> usize {
        self.subset.as_ref().map(|s| s.size()).unwrap_or_else(|| self.rows())
    }

    /// Whether `row` contributes to statistics.
    #[inline]
    pub fn is_included(&self, row: usize) -> bool {
        self.subset.as_ref().map(|s| s.contains(row)).unwrap_or(true)
    }

    pub fn index_of_quasi_identifier(&self, attribute: &str) -> Option<usize> {
        self.quasi_identifiers.iter().position(|a| a == attribute)
    }

    pub fn index_of_analyzed(&self, attribute: &str) -> Option<usize> {
        self.analyzed_attributes.iter().position(|a| a == attribute)
    }

    /// Functional hierarchy of the quasi-identifier at `index`, if any.
    pub fn functional_hierarchy(&self, index: usize) -> Option<&FunctionalHierarchy> {
        self.definition
            .functional_hierarchy(&self.quasi_identifiers[index])
    }
}

fn distinct_in_order(rows: &[Vec<String>], column: usize) -> Vec<String> {
    let mut dictionary = Dictionary::new();
    for row in rows {
        dictionary.register(&row[column]);
    }
    dictionary.values().to_vec()
}
