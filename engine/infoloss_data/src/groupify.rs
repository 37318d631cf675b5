//! Equivalence classes as produced by the grouping stage.
//!
//! The metric engine never groups data itself. It receives the classes of one
//! transformation and iterates them in the order the grouping stage inserted them; all
//! metrics honour that order so repeated evaluations produce bit-identical results.

use std::collections::HashMap;

/// Frequencies of the values of one analyzed attribute inside a class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Distribution {
    counts: Vec<(i32, usize)>,
}

impl Distribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_counts(counts: &[(i32, usize)]) -> Self {
        let mut d = Self::new();
        for &(value, count) in counts {
            d.add(value, count);
        }
        d
    }

    pub fn add(&mut self, value: i32, count: usize) {
        match self.counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, c)) => *c += count,
            None => self.counts.push((value, count)),
        }
    }

    pub fn get(&self, value: i32) -> usize {
        self.counts
            .iter()
            .find(|(v, _)| *v == value)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    /// The most frequent value and its frequency; ties go to the smaller code.
    pub fn mode(&self) -> Option<(i32, usize)> {
        self.counts
            .iter()
            .copied()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, c)| c).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, usize)> + '_ {
        self.counts.iter().copied()
    }
}

/// One equivalence class.
#[derive(Debug, Clone, PartialEq)]
pub struct EquivalenceClass {
    /// Rows of the research subset in this class.
    pub count: usize,
    /// Rows of the whole population in this class.
    pub pcount: usize,
    /// Whether the class is released (`true`) or suppressed.
    pub is_not_outlier: bool,
    /// Generalized code per quasi-identifier.
    pub key: Vec<i32>,
    /// Value distributions per analyzed attribute.
    pub distributions: Vec<Distribution>,
    /// Index of one row of the class.
    pub representative: usize,
}

impl EquivalenceClass {
    pub fn new(key: Vec<i32>, count: usize) -> Self {
        EquivalenceClass {
            count,
            pcount: count,
            is_not_outlier: true,
            key,
            distributions: Vec::new(),
            representative: 0,
        }
    }

    pub fn suppressed(mut self) -> Self {
        self.is_not_outlier = false;
        self
    }

    pub fn with_pcount(mut self, pcount: usize) -> Self {
        self.pcount = pcount;
        self
    }

    pub fn with_distributions(mut self, distributions: Vec<Distribution>) -> Self {
        self.distributions = distributions;
        self
    }

    pub fn with_representative(mut self, row: usize) -> Self {
        self.representative = row;
        self
    }
}

/// All classes of one transformation, in the stable order of the grouping stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EquivalenceClasses {
    classes: Vec<EquivalenceClass>,
    index: HashMap<Vec<i32>, usize>,
}

impl EquivalenceClasses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a class. Pushing a key that is already present merges the counts and
    /// distributions into the existing class, keeping its position.
    pub fn push(&mut self, class: EquivalenceClass) {
        match self.index.get(&class.key) {
            Some(&i) => {
                let existing = &mut self.classes[i];
                existing.count += class.count;
                existing.pcount += class.pcount;
                existing.is_not_outlier &= class.is_not_outlier;
                for (d, other) in existing.distributions.iter_mut().zip(class.distributions) {
                    for (value, count) in other.iter() {
                        d.add(value, count);
                    }
                }
            }
            None => {
                self.index.insert(class.key.clone(), self.classes.len());
                self.classes.push(class);
            }
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EquivalenceClass> {
        self.classes.iter()
    }

    pub fn get(&self, key: &[i32]) -> Option<&EquivalenceClass> {
        self.index.get(key).map(|&i| &self.classes[i])
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Sum of `count` over all classes.
    pub fn total_count(&self) -> usize {
        self.classes.iter().map(|c| c.count).sum()
    }

    /// Sum of `count` over suppressed classes.
    pub fn suppressed_count(&self) -> usize {
        self.classes
            .iter()
            .filter(|c| !c.is_not_outlier)
            .map(|c| c.count)
            .sum()
    }
}

impl FromIterator<EquivalenceClass> for EquivalenceClasses {
    fn from_iter<T: IntoIterator<Item = EquivalenceClass>>(iter: T) -> Self {
        let mut classes = EquivalenceClasses::new();
        for class in iter {
            classes.push(class);
        }
        classes
    }
}

impl<'a> IntoIterator for &'a EquivalenceClasses {
    type Item = &'a EquivalenceClass;
    type IntoIter = std::slice::Iter<'a, EquivalenceClass>;

    fn into_iter(self) -> Self::IntoIter {
        self.classes.iter()
    }
}
