//! Datasets and a grouping stage shared by the end-to-end tests.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use infoloss_data::{
    DataDefinition, DataManager, Distribution, EquivalenceClass, EquivalenceClasses, Hierarchy,
    Transformation,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One quasi-identifier `value` whose hierarchy generalizes every leaf straight to `*`.
pub fn single_attribute_manager(values: &[&str]) -> DataManager {
    let header = vec!["value".to_string()];
    let rows: Vec<Vec<String>> = values.iter().map(|v| vec![v.to_string()]).collect();
    let mut leaves: Vec<&str> = values.to_vec();
    leaves.sort_unstable();
    leaves.dedup();
    let mut hierarchies = HashMap::new();
    hierarchies.insert(
        "value".to_string(),
        Hierarchy::from_rows(leaves.iter().map(|leaf| [*leaf, "*"])),
    );
    DataManager::new(
        &header,
        &rows,
        DataDefinition::new().with_quasi_identifier("value"),
        hierarchies,
    )
    .expect("valid single-attribute dataset")
}

fn age_hierarchy() -> Hierarchy {
    Hierarchy::from_rows((18..90).map(|a: u32| {
        [a.to_string(), format!("{}-{}", a / 10 * 10, a / 10 * 10 + 9), "*".to_string()]
    }))
}

/// A single random `age` column (levels: value, decade, `*`).
pub fn age_manager(rows: usize, seed: u64) -> DataManager {
    let mut rng = StdRng::seed_from_u64(seed);
    let header = vec!["age".to_string()];
    let data: Vec<Vec<String>> = (0..rows)
        .map(|_| vec![rng.gen_range(18..90).to_string()])
        .collect();
    let mut hierarchies = HashMap::new();
    hierarchies.insert("age".to_string(), age_hierarchy());
    DataManager::new(
        &header,
        &data,
        DataDefinition::new().with_quasi_identifier("age"),
        hierarchies,
    )
    .expect("valid age dataset")
}

/// Random `age` (levels: value, decade, `*`) and `sex` (levels: value, `*`) columns.
pub fn synthetic_manager(rows: usize, seed: u64) -> DataManager {
    let mut rng = StdRng::seed_from_u64(seed);
    let header = vec!["age".to_string(), "sex".to_string()];
    let data: Vec<Vec<String>> = (0..rows)
        .map(|_| {
            let sex = if rng.gen_bool(0.5) { "male" } else { "female" };
            vec![rng.gen_range(18..90).to_string(), sex.to_string()]
        })
        .collect();
    let age = age_hierarchy();
    let sex = Hierarchy::from_rows([["male", "*"], ["female", "*"]]);
    let mut hierarchies = HashMap::new();
    hierarchies.insert("age".to_string(), age);
    hierarchies.insert("sex".to_string(), sex);
    DataManager::new(
        &header,
        &data,
        DataDefinition::new()
            .with_quasi_identifier("age")
            .with_quasi_identifier("sex"),
        hierarchies,
    )
    .expect("valid synthetic dataset")
}

/// Groups the included rows under `transformation` in order of first appearance; classes
/// smaller than `k` are suppressed.
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

/// Every transformation of the generalization lattice, bottom first.
pub fn lattice(manager: &DataManager) -> Vec<Transformation> {
    let mut nodes = vec![Vec::new()];
    for hierarchy in manager.hierarchies() {
        nodes = nodes
            .into_iter()
            .flat_map(|prefix: Vec<usize>| {
                (0..hierarchy.height()).map(move |level| {
                    let mut node = prefix.clone();
                    node.push(level);
                    node
                })
            })
            .collect();
    }
    nodes.into_iter().map(Transformation::new).collect()
}

/// Whether `a` is generalized no further than `b` in every dimension.
pub fn precedes(a: &Transformation, b: &Transformation) -> bool {
    a.generalization()
        .iter()
        .zip(b.generalization())
        .all(|(x, y)| x <= y)
}
