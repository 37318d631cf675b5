use std::collections::HashMap;

use pretty_assertions::assert_eq;

use infoloss_data::{
    AnonymizationConfig, DataDefinition, DataError, DataManager, Distribution, EquivalenceClass,
    EquivalenceClasses, Hierarchy, Transformation,
};

fn manager() -> DataManager {
    let header = vec!["zip".to_string(), "sex".to_string()];
    let rows: Vec<Vec<String>> = [["13053", "m"], ["13068", "f"], ["13053", "f"]]
        .iter()
        .map(|r| r.iter().map(|s| s.to_string()).collect())
        .collect();
    let mut hierarchies = HashMap::new();
    hierarchies.insert(
        "zip".to_string(),
        Hierarchy::from_rows([
            ["13053", "1305*", "130**", "*"],
            ["13068", "1306*", "130**", "*"],
        ]),
    );
    hierarchies.insert("sex".to_string(), Hierarchy::from_rows([["m", "*"], ["f", "*"]]));
    DataManager::new(
        &header,
        &rows,
        DataDefinition::new()
            .with_quasi_identifier("zip")
            .with_quasi_identifier("sex"),
        hierarchies,
    )
    .unwrap()
}

#[test]
fn transformations_are_checked_against_heights() {
    let manager = manager();
    let hierarchies = manager.hierarchies();
    assert!(Transformation::new(vec![3, 1]).validate(hierarchies).is_ok());
    assert!(matches!(
        Transformation::new(vec![4, 0]).validate(hierarchies),
        Err(DataError::InvalidTransformation(_))
    ));
    assert!(Transformation::new(vec![0]).validate(hierarchies).is_err());
    assert_eq!(Transformation::top(hierarchies).generalization(), &[3, 1]);
    assert_eq!(Transformation::bottom(2).total_level(), 0);
}

#[test]
fn levels_share_groups_up_the_hierarchy() {
    let manager = manager();
    let zip = &manager.hierarchies()[0];
    let data = manager.data_generalized();
    let (a, b) = (data.get(0, 0), data.get(1, 0));
    assert_ne!(zip.get(a, 1), zip.get(b, 1));
    assert_eq!(zip.get(a, 2), zip.get(b, 2));
    assert_eq!(zip.distinct_values(0), 2);
    assert_eq!(zip.distinct_values(3), 1);
}

#[test]
fn classes_merge_in_first_seen_order() {
    let mut classes = EquivalenceClasses::new();
    classes.push(
        EquivalenceClass::new(vec![1, 0], 1).with_distributions(vec![Distribution::from_counts(&[(0, 1)])]),
    );
    classes.push(EquivalenceClass::new(vec![0, 0], 2));
    classes.push(
        EquivalenceClass::new(vec![1, 0], 3)
            .suppressed()
            .with_distributions(vec![Distribution::from_counts(&[(0, 1), (2, 2)])]),
    );
    let keys: Vec<&[i32]> = classes.iter().map(|c| c.key.as_slice()).collect();
    assert_eq!(keys, vec![&[1, 0][..], &[0, 0][..]]);
    let merged = classes.get(&[1, 0]).unwrap();
    assert_eq!(merged.count, 4);
    assert!(!merged.is_not_outlier);
    assert_eq!(merged.distributions[0].mode(), Some((0, 2)));
    assert_eq!(classes.total_count(), 6);
    assert_eq!(classes.suppressed_count(), 4);
}

#[test]
fn configuration_round_trips_through_json() {
    let config = AnonymizationConfig::new()
        .with_attribute_weight("zip", 0.5)
        .with_suppression_limit(0.1)
        .with_minimal_class_size(5);
    let json = config.to_json().unwrap();
    assert_eq!(AnonymizationConfig::from_json(&json).unwrap(), config);
    assert_eq!(config.attribute_weight("sex"), 1.0);
    assert!(AnonymizationConfig::from_json(r#"{"suppression_limit": 2.0}"#).is_err());
}
