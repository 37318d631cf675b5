//! End-to-end evaluations over complete datasets.

use approx::assert_relative_eq;
use pretty_assertions::assert_eq;

use infoloss::{create_metric, AnonymizationConfig, Metric, MetricConfiguration, MetricKind};
use infoloss_data::Transformation;
use infoloss_metric::{
    AecsMetric, DiscernibilityMetric, EntropyMetric, EntropyMetricPrecomputed, LossMetric,
    LossMetricPrecomputed, NonMonotonicEntropyMetric, NonMonotonicEntropyMetricPrecomputed,
};
use infoloss_tests::{
    age_manager, group, init_logging, lattice, precedes, single_attribute_manager,
    synthetic_manager,
};

fn initialized<M: Metric>(mut metric: M, manager: &infoloss_data::DataManager) -> M {
    metric
        .initialize(manager, &AnonymizationConfig::default())
        .unwrap();
    metric
}

#[test]
fn generalizing_everything_costs_more_than_releasing_the_original() {
    init_logging();
    let manager = synthetic_manager(1000, 11);
    let metric = initialized(
        LossMetric::new(MetricConfiguration::default().with_gs_factor(0.5)),
        &manager,
    );
    let bottom = Transformation::new(vec![0, 0]);
    let top = Transformation::new(vec![2, 1]);
    let low = metric
        .information_loss(&bottom, &group(&manager, &bottom, 0))
        .unwrap()
        .information_loss;
    let high = metric
        .information_loss(&top, &group(&manager, &top, 0))
        .unwrap()
        .information_loss;
    assert!(low.value() < high.value(), "{low} vs {high}");
    assert_relative_eq!(
        high.value(),
        metric.maximal_information_loss().unwrap().value(),
        epsilon = 1e-9
    );
}

#[test]
fn one_attribute_with_three_levels_over_a_thousand_rows() {
    init_logging();
    let manager = age_manager(1000, 5);
    assert_eq!(manager.hierarchies()[0].height(), 3);
    let metric = initialized(LossMetric::new(MetricConfiguration::default()), &manager);
    let bottom = Transformation::new(vec![0]);
    let top = Transformation::new(vec![2]);
    let low = metric
        .information_loss(&bottom, &group(&manager, &bottom, 0))
        .unwrap()
        .information_loss;
    let high = metric
        .information_loss(&top, &group(&manager, &top, 0))
        .unwrap()
        .information_loss;
    assert!(low.value() < high.value(), "{low} vs {high}");

    let raw = metric
        .raw_information_loss(&bottom, &group(&manager, &bottom, usize::MAX))
        .unwrap();
    assert_eq!(raw, vec![1000.0]);
}

#[test]
fn suppressing_every_row_costs_one_per_row() {
    let manager = synthetic_manager(200, 3);
    let metric = initialized(LossMetric::new(MetricConfiguration::default()), &manager);
    let bottom = Transformation::new(vec![0, 0]);
    let raw = metric
        .raw_information_loss(&bottom, &group(&manager, &bottom, usize::MAX))
        .unwrap();
    assert_eq!(raw, vec![200.0, 200.0]);
}

#[test]
fn average_class_size_of_three_classes() {
    let mut values = vec!["a"; 5];
    values.extend(["b"; 5]);
    values.extend(["c"; 10]);
    let manager = single_attribute_manager(&values);
    let metric = initialized(AecsMetric::new(MetricConfiguration::default()), &manager);
    let bottom = Transformation::new(vec![0]);
    let classes = group(&manager, &bottom, 0);
    assert_eq!(
        classes.iter().map(|c| c.count).collect::<Vec<_>>(),
        vec![5, 5, 10]
    );
    let loss = metric.information_loss(&bottom, &classes).unwrap();
    assert_relative_eq!(loss.information_loss.value(), 20.0 / 3.0, epsilon = 1e-9);
}

#[test]
fn monotonic_discernibility_sums_squared_class_sizes() {
    let mut values = vec!["a"; 3];
    values.extend(["b"; 3]);
    values.extend(["c"; 4]);
    let manager = single_attribute_manager(&values);
    let metric = initialized(
        DiscernibilityMetric::monotonic(MetricConfiguration::default()),
        &manager,
    );
    let bottom = Transformation::new(vec![0]);
    for k in [0, 4] {
        let loss = metric
            .information_loss(&bottom, &group(&manager, &bottom, k))
            .unwrap();
        assert_eq!(loss.information_loss.value(), 34.0);
    }
}

#[test]
fn repeated_entropy_evaluations_are_bit_identical() {
    let manager = synthetic_manager(500, 5);
    let metric = initialized(EntropyMetric::new(MetricConfiguration::default()), &manager);
    for transformation in lattice(&manager) {
        let classes = group(&manager, &transformation, 3);
        let first = metric.information_loss(&transformation, &classes).unwrap();
        let second = metric.information_loss(&transformation, &classes).unwrap();
        assert_eq!(
            first.information_loss.value().to_bits(),
            second.information_loss.value().to_bits(),
            "{transformation}"
        );
    }
}

#[test]
fn loss_grows_with_generalization() {
    let manager = synthetic_manager(400, 17);
    let metric = create_metric(MetricKind::Loss, MetricConfiguration::default())
        .and_then(|mut metric| {
            metric.initialize(&manager, &AnonymizationConfig::default())?;
            Ok(metric)
        })
        .unwrap();
    let nodes = lattice(&manager);
    let losses: Vec<f64> = nodes
        .iter()
        .map(|t| {
            metric
                .information_loss(t, &group(&manager, t, 0))
                .unwrap()
                .information_loss
                .value()
        })
        .collect();
    for (i, a) in nodes.iter().enumerate() {
        for (j, b) in nodes.iter().enumerate() {
            if precedes(a, b) {
                assert!(losses[i] <= losses[j] + 1e-12, "{a} -> {b}");
            }
        }
    }
}

#[test]
fn precomputed_variants_agree_with_their_defaults() {
    init_logging();
    let manager = synthetic_manager(300, 23);
    let configuration = MetricConfiguration::default().with_gs_factor(0.4);
    let pairs: Vec<(Box<dyn Metric>, Box<dyn Metric>)> = vec![
        (
            Box::new(LossMetric::new(configuration.clone())),
            Box::new(LossMetricPrecomputed::new(configuration.clone())),
        ),
        (
            Box::new(EntropyMetric::new(configuration.clone())),
            Box::new(EntropyMetricPrecomputed::new(configuration.clone())),
        ),
        (
            Box::new(NonMonotonicEntropyMetric::new(configuration.clone())),
            Box::new(NonMonotonicEntropyMetricPrecomputed::new(configuration.clone())),
        ),
        (
            Box::new(NonMonotonicEntropyMetric::normalized(configuration.clone())),
            Box::new(NonMonotonicEntropyMetricPrecomputed::normalized(configuration)),
        ),
    ];
    for (mut default, mut precomputed) in pairs {
        default
            .initialize(&manager, &AnonymizationConfig::default())
            .unwrap();
        precomputed
            .initialize(&manager, &AnonymizationConfig::default())
            .unwrap();
        for transformation in lattice(&manager) {
            let classes = group(&manager, &transformation, 4);
            let a = default.information_loss(&transformation, &classes).unwrap();
            let b = precomputed.information_loss(&transformation, &classes).unwrap();
            assert_relative_eq!(
                a.information_loss.value(),
                b.information_loss.value(),
                epsilon = 1e-6,
                max_relative = 1e-9
            );
        }
    }
}
