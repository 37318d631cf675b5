//! Small datasets and a grouping helper for unit tests.

use std::collections::HashMap;

use infoloss_data::{
    DataDefinition, DataManager, Distribution, EquivalenceClass, EquivalenceClasses, Hierarchy,
    Transformation,
};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// One quasi-identifier `zip` with four values over eight rows:
/// 47677 x3, 47678 x1, 47905 x2, 47909 x2. Levels: value, `47x**`, `*`.
pub fn zip_manager() -> DataManager {
    let header = strings(&["zip"]);
    let rows: Vec<Vec<String>> = ["47677", "47677", "47677", "47678", "47905", "47905", "47909", "47909"]
        .iter()
        .map(|v| strings(&[v]))
        .collect();
    let mut hierarchies = HashMap::new();
    hierarchies.insert(
        "zip".to_string(),
        Hierarchy::from_rows([
            ["47677", "476**", "*"],
            ["47678", "476**", "*"],
            ["47905", "479**", "*"],
            ["47909", "479**", "*"],
        ]),
    );
    DataManager::new(
        &header,
        &rows,
        DataDefinition::new().with_quasi_identifier("zip"),
        hierarchies,
    )
    .unwrap()
}

/// Quasi-identifiers `age` (height 3) and `sex` (height 2) with the response variable
/// `disease`, over ten rows.
pub fn people_manager() -> DataManager {
    people_manager_with_response("disease")
}

/// The people data with another response variable.
pub fn people_manager_with_response(response: &str) -> DataManager {
    let header = strings(&["age", "sex", "disease"]);
    let rows: Vec<Vec<String>> = [
        ["21", "male", "flu"],
        ["22", "female", "flu"],
        ["23", "male", "cold"],
        ["24", "female", "flu"],
        ["31", "male", "cold"],
        ["32", "female", "cold"],
        ["33", "male", "flu"],
        ["34", "female", "cold"],
        ["21", "male", "flu"],
        ["31", "female", "cold"],
    ]
    .iter()
    .map(|r| strings(r))
    .collect();
    let mut hierarchies = HashMap::new();
    hierarchies.insert(
        "age".to_string(),
        Hierarchy::from_rows([
            ["21", "20-24", "*"],
            ["22", "20-24", "*"],
            ["23", "20-24", "*"],
            ["24", "20-24", "*"],
            ["31", "30-34", "*"],
            ["32", "30-34", "*"],
            ["33", "30-34", "*"],
            ["34", "30-34", "*"],
        ]),
    );
    hierarchies.insert(
        "sex".to_string(),
        Hierarchy::from_rows([["male", "*"], ["female", "*"]]),
    );
    DataManager::new(
        &header,
        &rows,
        DataDefinition::new()
            .with_quasi_identifier("age")
            .with_quasi_identifier("sex")
            .with_analyzed_attribute("disease")
            .with_response_variable(response),
        hierarchies,
    )
    .unwrap()
}

/// Groups the included rows under `transformation`; classes smaller than `k` are
/// suppressed.
pub fn group(manager: &DataManager, transformation: &Transformation, k: usize) -> EquivalenceClasses {
    let data = manager.data_generalized();
    let analyzed = manager.data_analyzed();
    let mut order: Vec<Vec<i32>> = Vec::new();
    let mut grouped: HashMap<Vec<i32>, EquivalenceClass> = HashMap::new();
    for row in (0..manager.rows()).filter(|&r| manager.is_included(r)) {
        let key: Vec<i32> = manager
            .hierarchies()
            .iter()
            .enumerate()
            .map(|(d, h)| h.get(data.get(row, d), transformation.level(d)))
            .collect();
        let class = grouped.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            EquivalenceClass::new(key, 0)
                .with_representative(row)
                .with_distributions(vec![Distribution::new(); analyzed.columns()])
        });
        class.count += 1;
        class.pcount += 1;
        for (column, distribution) in class.distributions.iter_mut().enumerate() {
            distribution.add(analyzed.get(row, column), 1);
        }
    }
    order
        .into_iter()
        .filter_map(|key| grouped.remove(&key))
        .map(|class| if class.count < k { class.suppressed() } else { class })
        .collect()
}

/// Groups without suppression.
pub fn classes_at(manager: &DataManager, transformation: &Transformation) -> EquivalenceClasses {
    group(manager, transformation, 0)
}
