//! Anonymization configuration consulted by metrics during initialization.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DataError, DataResult};

/// Parameters of differential privacy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifferentialPrivacy {
    pub epsilon: f64,
    pub delta: f64,
}

/// Privacy model parameters relevant to metric computation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacyParameters {
    /// Minimal size of released classes (the `k` of k-anonymity).
    pub minimal_class_size: Option<usize>,
    /// Differential privacy, if the search selects transformations privately.
    pub differential_privacy: Option<DifferentialPrivacy>,
}

/// Replaces the values of an analyzed attribute within each released class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MicroaggregationFunction {
    ArithmeticMean,
    Median,
    Mode,
}

impl MicroaggregationFunction {
    /// Whether the function needs numeric values.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, MicroaggregationFunction::Mode)
    }
}

/// Configuration of one anonymization run as seen by the metric engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnonymizationConfig {
    /// Weight per attribute name; unlisted attributes weigh 1.0.
    pub attribute_weights: BTreeMap<String, f64>,
    /// Fraction of rows that may be suppressed.
    pub suppression_limit: f64,
    pub privacy: PrivacyParameters,
    /// Compute scores with exact rational arithmetic.
    pub reliable: bool,
    /// Microaggregation function per analyzed attribute.
    pub microaggregation: BTreeMap<String, MicroaggregationFunction>,
}

impl Default for AnonymizationConfig {
    fn default() -> Self {
        AnonymizationConfig {
            attribute_weights: BTreeMap::new(),
            suppression_limit: 0.0,
            privacy: PrivacyParameters::default(),
            reliable: false,
            microaggregation: BTreeMap::new(),
        }
    }
}

impl AnonymizationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute_weight(mut self, attribute: &str, weight: f64) -> Self {
        self.attribute_weights.insert(attribute.to_string(), weight);
        self
    }

    pub fn with_suppression_limit(mut self, limit: f64) -> Self {
        self.suppression_limit = limit;
        self
    }

    pub fn with_minimal_class_size(mut self, k: usize) -> Self {
        self.privacy.minimal_class_size = Some(k);
        self
    }

    pub fn with_differential_privacy(mut self, epsilon: f64, delta: f64) -> Self {
        self.privacy.differential_privacy = Some(DifferentialPrivacy { epsilon, delta });
        self
    }

    pub fn with_reliable(mut self, reliable: bool) -> Self {
        self.reliable = reliable;
        self
    }

    pub fn with_microaggregation(
        mut self,
        attribute: &str,
        function: MicroaggregationFunction,
    ) -> Self {
        self.microaggregation.insert(attribute.to_string(), function);
        self
    }

    /// Weight of an attribute, defaulting to 1.0.
    pub fn attribute_weight(&self, attribute: &str) -> f64 {
        self.attribute_weights.get(attribute).copied().unwrap_or(1.0)
    }

    pub fn validate(&self) -> DataResult<()> {
        if !(0.0..=1.0).contains(&self.suppression_limit) {
            return Err(DataError::InvalidConfiguration(format!(
                "suppression limit {} is not in [0, 1]",
                self.suppression_limit
            )));
        }
        if let Some((name, weight)) = self
            .attribute_weights
            .iter()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(DataError::InvalidConfiguration(format!(
                "weight {weight} of attribute '{name}' must be finite and non-negative"
            )));
        }
        if self.privacy.minimal_class_size == Some(0) {
            return Err(DataError::InvalidConfiguration(
                "minimal class size must be at least 1".to_string(),
            ));
        }
        if let Some(dp) = self.privacy.differential_privacy {
            if !(dp.epsilon > 0.0) || !(0.0..1.0).contains(&dp.delta) {
                return Err(DataError::InvalidConfiguration(format!(
                    "invalid differential privacy parameters epsilon={} delta={}",
                    dp.epsilon, dp.delta
                )));
            }
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> DataResult<Self> {
        let config: AnonymizationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> DataResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| DataError::ConfigurationFormat(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> DataResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = AnonymizationConfig::from_json(
            r#"{ "attribute_weights": { "age": 0.5 }, "privacy": { "minimal_class_size": 5 } }"#,
        )
        .unwrap();
        assert_eq!(config.attribute_weight("age"), 0.5);
        assert_eq!(config.attribute_weight("zip"), 1.0);
        assert_eq!(config.privacy.minimal_class_size, Some(5));
        assert!(!config.reliable);
    }

    #[test]
    fn test_round_trip() {
        let config = AnonymizationConfig::new()
            .with_attribute_weight("age", 2.0)
            .with_differential_privacy(1.0, 1e-5)
            .with_reliable(true);
        let json = config.to_json().unwrap();
        assert_eq!(AnonymizationConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_microaggregation_assignments() {
        let config = AnonymizationConfig::from_json(
            r#"{ "microaggregation": { "income": "arithmetic_mean", "disease": "mode" } }"#,
        )
        .unwrap();
        assert_eq!(
            config.microaggregation.get("income"),
            Some(&MicroaggregationFunction::ArithmeticMean)
        );
        assert!(!config.microaggregation["disease"].is_numeric());
        let json = config.to_json().unwrap();
        assert_eq!(AnonymizationConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_suppression_limit() {
        let config = AnonymizationConfig::new().with_suppression_limit(1.5);
        assert!(config.validate().is_err());
    }
}
