use std::collections::HashMap;

use approx::assert_abs_diff_eq;
use infoloss_data::{
    DataDefinition, DataManager, DataType, FunctionalHierarchy, Hierarchy, IntervalHierarchy,
    RedactionHierarchy,
};
use infoloss_domain::{
    create_domain_shares, create_reliable_shares, load, save, DomainShare, DomainShareInterval,
    DomainShareReliable,
};
use num_rational::BigRational;
use num_traits::{One, Zero};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn manager() -> DataManager {
    let header = strings(&["age", "zip", "sex"]);
    let rows = vec![
        strings(&["23", "47677", "male"]),
        strings(&["38", "47602", "female"]),
        strings(&["23", "47678", "male"]),
        strings(&["61", "47905", "female"]),
        strings(&["45", "47677", "female"]),
    ];
    let definition = DataDefinition::new()
        .with_quasi_identifier("age")
        .with_quasi_identifier("zip")
        .with_quasi_identifier("sex")
        .with_data_type("age", DataType::Integer)
        .with_functional_hierarchy(
            "age",
            FunctionalHierarchy::Interval(IntervalHierarchy::uniform(
                DataType::Integer,
                0.0,
                100.0,
                &[20.0, 50.0],
            )),
        )
        .with_functional_hierarchy("zip", FunctionalHierarchy::Redaction(RedactionHierarchy::default()));
    let mut hierarchies = HashMap::new();
    hierarchies.insert(
        "sex".to_string(),
        Hierarchy::from_rows([["male", "*"], ["female", "*"]]),
    );
    DataManager::new(&header, &rows, definition, hierarchies).unwrap()
}

#[test]
fn level_zero_shares_sum_to_one_for_every_derivation() {
    let manager = manager();
    let shares = create_domain_shares(&manager).unwrap();
    assert_eq!(shares.len(), 3);
    for (share, hierarchy) in shares.iter().zip(manager.hierarchies()) {
        assert_eq!(share.domain_size(), hierarchy.leaves() as f64);
        let total: f64 = (0..hierarchy.leaves() as i32).map(|v| share.share(v, 0)).sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-12);
        let top = hierarchy.max_level();
        assert_eq!(share.share(hierarchy.get(0, top), top), 1.0);
    }
}

#[test]
fn shares_stay_in_unit_interval() {
    let manager = manager();
    let shares = create_domain_shares(&manager).unwrap();
    for (share, hierarchy) in shares.iter().zip(manager.hierarchies()) {
        for leaf in 0..hierarchy.leaves() as i32 {
            for level in 0..hierarchy.height() {
                let s = share.share(hierarchy.get(leaf, level), level);
                assert!(s > 0.0 && s <= 1.0, "share {s} on level {level}");
            }
        }
    }
}

#[test]
fn reliable_shares_are_exact() {
    let manager = manager();
    for (share, hierarchy) in create_reliable_shares(&manager)
        .unwrap()
        .iter()
        .zip(manager.hierarchies())
    {
        let total = (0..hierarchy.leaves() as i32)
            .fold(BigRational::zero(), |acc, v| acc + share.share_exact(v, 0));
        assert_eq!(total, BigRational::one());
    }
}

#[test]
fn persisted_shares_answer_identically() {
    let manager = manager();
    let FunctionalHierarchy::Interval(functional) = manager.functional_hierarchy(0).unwrap() else {
        panic!("age carries an interval hierarchy");
    };
    let hierarchy = &manager.hierarchies()[0];
    let interval =
        DomainShareInterval::new(functional, hierarchy, &manager.dictionaries()[0]).unwrap();
    let reliable =
        DomainShareReliable::new(&manager.hierarchy_tables()[1], &manager.dictionaries()[1]).unwrap();

    let mut buffer = Vec::new();
    save(&interval, &mut buffer).unwrap();
    let restored: DomainShareInterval = load(buffer.as_slice()).unwrap();
    for leaf in 0..hierarchy.leaves() as i32 {
        for level in 0..hierarchy.height() {
            let code = hierarchy.get(leaf, level);
            assert_eq!(restored.share(code, level), interval.share(code, level));
        }
    }

    let mut buffer = Vec::new();
    save(&reliable, &mut buffer).unwrap();
    let restored: DomainShareReliable = load(buffer.as_slice()).unwrap();
    let zip = &manager.hierarchies()[1];
    for leaf in 0..zip.leaves() as i32 {
        for level in 0..zip.height() {
            let code = zip.get(leaf, level);
            assert_eq!(restored.share_exact(code, level), reliable.share_exact(code, level));
        }
    }
}
