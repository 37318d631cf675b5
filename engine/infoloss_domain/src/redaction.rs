use serde::{Deserialize, Serialize};

use infoloss_data::RedactionHierarchy;

use crate::share::DomainShare;

/// Shares of a redaction hierarchy, computed analytically.
///
/// A value with `level` redacted characters stands for `alphabet^level` of the
/// `alphabet^max_length` possible strings, so the share interpolates log-linearly between
/// one leaf and the whole domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainShareRedaction {
    max_value_length: usize,
    alphabet_size: usize,
    domain_size: f64,
}

impl DomainShareRedaction {
    pub fn new(max_value_length: usize, alphabet_size: usize, domain_size: usize) -> Self {
        DomainShareRedaction {
            max_value_length,
            alphabet_size,
            domain_size: domain_size as f64,
        }
    }

    pub fn from_hierarchy(redaction: &RedactionHierarchy, leaves: &[String]) -> Self {
        Self::new(
            redaction.max_value_length(leaves),
            redaction.alphabet_size(leaves),
            leaves.len(),
        )
    }
}

impl DomainShare for DomainShareRedaction {
    fn share(&self, _value: i32, level: usize) -> f64 {
        let minimum = 1.0 / self.domain_size;
        if level == 0 {
            return minimum;
        }
        if level >= self.max_value_length {
            return 1.0;
        }
        let exponent = level as f64 - self.max_value_length as f64;
        (self.alphabet_size as f64).powf(exponent).clamp(minimum, 1.0)
    }

    fn domain_size(&self) -> f64 {
        self.domain_size
    }
}
