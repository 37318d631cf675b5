//! Static description of a metric and the key/value report rendered for certificates.

use serde::Serialize;

/// Capabilities of a metric, independent of any configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricDescription {
    pub name: &'static str,
    pub monotonic_variant_supported: bool,
    pub attribute_weights_supported: bool,
    pub gs_factor_supported: bool,
    pub precomputation_supported: bool,
    pub aggregate_function_supported: bool,
    pub score_supported: bool,
    pub microaggregation_supported: bool,
}

impl MetricDescription {
    /// A description with every capability disabled.
    pub const fn named(name: &'static str) -> Self {
        MetricDescription {
            name,
            monotonic_variant_supported: false,
            attribute_weights_supported: false,
            gs_factor_supported: false,
            precomputation_supported: false,
            aggregate_function_supported: false,
            score_supported: false,
            microaggregation_supported: false,
        }
    }

    pub const fn with_monotonic_variant(mut self) -> Self {
        self.monotonic_variant_supported = true;
        self
    }

    pub const fn with_attribute_weights(mut self) -> Self {
        self.attribute_weights_supported = true;
        self
    }

    pub const fn with_gs_factor(mut self) -> Self {
        self.gs_factor_supported = true;
        self
    }

    pub const fn with_precomputation(mut self) -> Self {
        self.precomputation_supported = true;
        self
    }

    pub const fn with_aggregate_function(mut self) -> Self {
        self.aggregate_function_supported = true;
        self
    }

    pub const fn with_score(mut self) -> Self {
        self.score_supported = true;
        self
    }

    pub const fn with_microaggregation(mut self) -> Self {
        self.microaggregation_supported = true;
        self
    }
}

/// A node of a rendered report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementData {
    pub name: String,
    pub properties: Vec<(String, String)>,
    pub children: Vec<ElementData>,
}

impl ElementData {
    pub fn new(name: impl Into<String>) -> Self {
        ElementData {
            name: name.into(),
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.properties.push((key.into(), value.to_string()));
        self
    }

    pub fn with_child(mut self, child: ElementData) -> Self {
        self.children.push(child);
        self
    }

    /// The report as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
