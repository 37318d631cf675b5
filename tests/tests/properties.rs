use proptest::prelude::*;

use infoloss::{AnonymizationConfig, Metric, MetricConfiguration};
use infoloss_data::{DataManager, Transformation};
use infoloss_metric::{AecsMetric, DiscernibilityMetric, LossMetric};
use infoloss_tests::{group, single_attribute_manager};

/// Datasets over at least two distinct values.
fn dataset() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(0u8..6, 0..40).prop_map(|codes| {
        let mut values = vec!["v0".to_string(), "v1".to_string()];
        values.extend(codes.into_iter().map(|c| format!("v{c}")));
        values
    })
}

fn manager(values: &[String]) -> DataManager {
    let values: Vec<&str> = values.iter().map(String::as_str).collect();
    single_attribute_manager(&values)
}

fn initialized<M: Metric>(mut metric: M, manager: &DataManager) -> M {
    metric
        .initialize(manager, &AnonymizationConfig::default())
        .unwrap();
    metric
}

proptest! {
    #[test]
    fn monotonic_discernibility_ignores_suppression(values in dataset(), k in 0usize..6) {
        let manager = manager(&values);
        let metric = initialized(DiscernibilityMetric::monotonic(MetricConfiguration::default()), &manager);
        let bottom = Transformation::new(vec![0]);
        let classes = group(&manager, &bottom, k);
        let expected: f64 = classes.iter().map(|c| (c.count * c.count) as f64).sum();
        let loss = metric.information_loss(&bottom, &classes).unwrap();
        prop_assert_eq!(loss.information_loss.value(), expected);
    }

    #[test]
    fn suppressed_rows_form_one_class(values in dataset(), k in 0usize..6) {
        let manager = manager(&values);
        let metric = initialized(AecsMetric::new(MetricConfiguration::default()), &manager);
        let bottom = Transformation::new(vec![0]);
        let classes = group(&manager, &bottom, k);
        let released = classes.iter().filter(|c| c.is_not_outlier).count();
        let groups = released + usize::from(classes.suppressed_count() > 0);
        let loss = metric.information_loss(&bottom, &classes).unwrap();
        prop_assert!((loss.information_loss.value() - values.len() as f64 / groups as f64).abs() < 1e-9);
    }

    #[test]
    fn loss_stays_normalized(values in dataset(), k in 0usize..6, gs in 0.0f64..=1.0, level in 0usize..2) {
        let manager = manager(&values);
        let metric = initialized(LossMetric::new(MetricConfiguration::default().with_gs_factor(gs)), &manager);
        let transformation = Transformation::new(vec![level]);
        let loss = metric
            .information_loss(&transformation, &group(&manager, &transformation, k))
            .unwrap();
        let value = loss.information_loss.value();
        prop_assert!((0.0..=1.0 + 1e-9).contains(&value), "{}", value);
        if let Some(bound) = loss.lower_bound {
            prop_assert!(bound.value() <= value + 1e-9);
        }
    }
}
