//! Building metrics by kind.

use log::debug;
use serde::{Deserialize, Serialize};

use infoloss_metric::{
    AecsMetric, AmbiguityMetric, ClassificationMetric, DiscernibilityMetric, EntropyBasedMetric,
    EntropyMetric, HeightMetric, KlDivergenceMetric, LossMetric, Metric, MetricConfiguration,
    MetricResult, NonMonotonicEntropyMetric, PayoutConfiguration, PrecisionMetric,
    PublisherPayoutMetric, SseMetric, StaticMetric, StaticTables,
};

/// Every metric the engine provides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "parameters")]
pub enum MetricKind {
    Loss,
    /// Non-uniform entropy; the monotonic flag of the configuration picks the variant.
    NonUniformEntropy,
    NormalizedNonUniformEntropy,
    EntropyBased,
    /// Discernibility; the monotonic flag of the configuration selects DM*.
    Discernibility,
    Precision,
    Height,
    Static(StaticTables),
    AverageClassSize,
    Ambiguity,
    SumOfSquaredErrors,
    KlDivergence,
    Classification,
    PublisherPayout(PayoutConfiguration),
}

impl MetricKind {
    /// Kinds that need no parameters beyond a [`MetricConfiguration`].
    pub fn parameterless() -> Vec<MetricKind> {
        vec![
            MetricKind::Loss,
            MetricKind::NonUniformEntropy,
            MetricKind::NormalizedNonUniformEntropy,
            MetricKind::EntropyBased,
            MetricKind::Discernibility,
            MetricKind::Precision,
            MetricKind::Height,
            MetricKind::AverageClassSize,
            MetricKind::Ambiguity,
            MetricKind::SumOfSquaredErrors,
            MetricKind::KlDivergence,
            MetricKind::Classification,
        ]
    }
}

/// Creates an uninitialized metric.
///
/// Metrics with a precomputed variant are wrapped in a precomputation switch when the
/// configuration enables it.
pub fn create_metric(
    kind: MetricKind,
    configuration: MetricConfiguration,
) -> MetricResult<Box<dyn Metric>> {
    configuration.validate()?;
    let metric: Box<dyn Metric> = match kind {
        MetricKind::Loss => LossMetric::potentially_precomputed(configuration)?,
        MetricKind::NonUniformEntropy if configuration.monotonic => {
            EntropyMetric::potentially_precomputed(configuration)?
        }
        MetricKind::NonUniformEntropy => {
            NonMonotonicEntropyMetric::potentially_precomputed(configuration, false)?
        }
        MetricKind::NormalizedNonUniformEntropy => {
            NonMonotonicEntropyMetric::potentially_precomputed(configuration, true)?
        }
        MetricKind::EntropyBased => Box::new(EntropyBasedMetric::new(configuration)),
        MetricKind::Discernibility if configuration.monotonic => {
            Box::new(DiscernibilityMetric::monotonic(configuration))
        }
        MetricKind::Discernibility => Box::new(DiscernibilityMetric::new(configuration)),
        MetricKind::Precision => Box::new(PrecisionMetric::new(configuration)),
        MetricKind::Height => Box::new(HeightMetric::new(configuration)),
        MetricKind::Static(tables) => Box::new(StaticMetric::new(configuration, tables)?),
        MetricKind::AverageClassSize => Box::new(AecsMetric::new(configuration)),
        MetricKind::Ambiguity => Box::new(AmbiguityMetric::new(configuration)),
        MetricKind::SumOfSquaredErrors => Box::new(SseMetric::new(configuration)),
        MetricKind::KlDivergence => Box::new(KlDivergenceMetric::new(configuration)),
        MetricKind::Classification => Box::new(ClassificationMetric::new(configuration)),
        MetricKind::PublisherPayout(payout) => {
            payout.validate()?;
            Box::new(PublisherPayoutMetric::new(configuration, payout))
        }
    };
    debug!("created metric '{}'", metric.name());
    Ok(metric)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_kind_builds() {
        for kind in MetricKind::parameterless() {
            let metric = create_metric(kind.clone(), MetricConfiguration::default()).unwrap();
            assert!(!metric.is_initialized(), "{kind:?}");
        }
        let mut tables = StaticTables::new();
        tables.insert("age".to_string(), vec![0.0, 0.5, 1.0]);
        let metric = create_metric(MetricKind::Static(tables), MetricConfiguration::default());
        assert!(metric.is_ok());
        let metric = create_metric(
            MetricKind::PublisherPayout(PayoutConfiguration::default()),
            MetricConfiguration::default(),
        );
        assert!(metric.is_ok());
    }

    #[test]
    fn test_monotonic_flag_selects_variant() {
        let monotonic = MetricConfiguration::default().with_monotonic(true);
        let entropy = create_metric(MetricKind::NonUniformEntropy, monotonic.clone()).unwrap();
        assert!(entropy.is_monotonic_with_suppression());
        let entropy =
            create_metric(MetricKind::NonUniformEntropy, MetricConfiguration::default()).unwrap();
        assert!(!entropy.is_monotonic_with_suppression());

        let dm = create_metric(MetricKind::Discernibility, monotonic).unwrap();
        assert!(dm.is_monotonic_with_suppression());
        let dm = create_metric(MetricKind::Discernibility, MetricConfiguration::default()).unwrap();
        assert!(!dm.is_monotonic_with_suppression());
    }

    #[test]
    fn test_invalid_configuration_is_rejected() {
        let configuration = MetricConfiguration::default().with_gs_factor(2.0);
        assert!(create_metric(MetricKind::Loss, configuration).is_err());
        let payout = PayoutConfiguration {
            publisher_benefit: -1.0,
            ..PayoutConfiguration::default()
        };
        assert!(create_metric(MetricKind::PublisherPayout(payout), MetricConfiguration::default())
            .is_err());
    }

    #[test]
    fn test_kind_from_json() {
        let kind: MetricKind =
            serde_json::from_str(r#"{"kind": "Static", "parameters": {"age": [0.0, 1.0]}}"#)
                .unwrap();
        let mut tables = StaticTables::new();
        tables.insert("age".to_string(), vec![0.0, 1.0]);
        assert_eq!(kind, MetricKind::Static(tables));
        let kind: MetricKind = serde_json::from_str(r#"{"kind": "Loss"}"#).unwrap();
        assert_eq!(kind, MetricKind::Loss);
    }
}
