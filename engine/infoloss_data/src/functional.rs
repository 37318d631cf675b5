//! Functional hierarchies: hierarchies described by a rule instead of an explicit table.
//!
//! Both kinds can be materialized into a [`Hierarchy`] for encoding, while their analytic
//! description stays available for computing domain shares without materialization.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{DataError, DataResult};
use crate::hierarchy::Hierarchy;

/// Label used for the fully generalized value.
pub const ANY_VALUE: &str = "*";

/// The scale of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DataType {
    Integer,
    Decimal,
    String,
}

impl DataType {
    /// Whether differences and ratios of values are meaningful.
    pub fn is_ratio_scaled(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Decimal)
    }

    /// Parses a value of this type into a double.
    pub fn parse(&self, value: &str) -> DataResult<f64> {
        let parse_err = |expected| DataError::Parse {
            value: value.to_string(),
            expected,
        };
        match self {
            DataType::Integer => value
                .trim()
                .parse::<i64>()
                .map(|v| v as f64)
                .map_err(|_| parse_err("integer")),
            DataType::Decimal => value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| parse_err("decimal")),
            DataType::String => Err(parse_err("number")),
        }
    }

    fn format(&self, value: f64) -> String {
        match self {
            DataType::Integer => format!("{}", value as i64),
            _ => format!("{value}"),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Integer => "Integer",
            DataType::Decimal => "Decimal",
            DataType::String => "String",
        };
        f.write_str(name)
    }
}

/// Where an interval sits relative to the coding bounds of its hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalKind {
    /// A regular `[min, max[` range inside the bounds.
    Bounded,
    /// Everything below the lower bound (bottom coding).
    BelowLower,
    /// Everything at or above the upper bound (top coding).
    AboveUpper,
    /// The top `*` group.
    Any,
}

/// One group of an interval hierarchy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
    pub kind: IntervalKind,
}

impl Interval {
    pub fn bounded(min: f64, max: f64) -> Self {
        Interval {
            min,
            max,
            kind: IntervalKind::Bounded,
        }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn is_out_of_bound(&self) -> bool {
        matches!(self.kind, IntervalKind::BelowLower | IntervalKind::AboveUpper)
    }

    fn contains(&self, x: f64) -> bool {
        x >= self.min && x < self.max
    }
}

/// A hierarchy that groups numeric values into ranges.
///
/// Level 0 holds the original values, levels `1..=levels.len()` the configured intervals
/// and the last level the `*` group. Values outside `[lower, upper[` are bottom- or
/// top-coded on every intermediate level.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalHierarchy {
    data_type: DataType,
    lower: f64,
    upper: f64,
    levels: Vec<Vec<Interval>>,
}

impl IntervalHierarchy {
    pub fn new(data_type: DataType, lower: f64, upper: f64) -> Self {
        IntervalHierarchy {
            data_type,
            lower,
            upper,
            levels: Vec::new(),
        }
    }

    /// Builds a hierarchy whose level `i` partitions `[lower, upper[` into ranges of `widths[i]`.
    pub fn uniform(data_type: DataType, lower: f64, upper: f64, widths: &[f64]) -> Self {
        let mut h = Self::new(data_type, lower, upper);
        for &width in widths {
            let mut intervals = Vec::new();
            let mut min = lower;
            while min < upper && width > 0.0 {
                let max = (min + width).min(upper);
                intervals.push(Interval::bounded(min, max));
                min = max;
            }
            h.levels.push(intervals);
        }
        h
    }

    /// Appends an intermediate level made of the given `[min, max[` ranges.
    pub fn with_level(mut self, ranges: &[(f64, f64)]) -> Self {
        self.levels
            .push(ranges.iter().map(|&(a, b)| Interval::bounded(a, b)).collect());
        self
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Width of the coded domain.
    pub fn domain_width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Number of levels of the materialized hierarchy.
    pub fn height(&self) -> usize {
        self.levels.len() + 2
    }

    /// The group `value` falls into on `level` (`level >= 1`).
    pub fn interval(&self, level: usize, value: f64) -> DataResult<Interval> {
        if level == 0 || level > self.levels.len() {
            return Ok(Interval {
                min: self.lower,
                max: self.upper,
                kind: IntervalKind::Any,
            });
        }
        if value < self.lower {
            return Ok(Interval {
                min: f64::NEG_INFINITY,
                max: self.lower,
                kind: IntervalKind::BelowLower,
            });
        }
        if value >= self.upper {
            return Ok(Interval {
                min: self.upper,
                max: f64::INFINITY,
                kind: IntervalKind::AboveUpper,
            });
        }
        self.levels[level - 1]
            .iter()
            .find(|i| i.contains(value))
            .copied()
            .ok_or_else(|| DataError::Parse {
                value: self.data_type.format(value),
                expected: "value covered by an interval",
            })
    }

    /// The label used for an interval in the materialized hierarchy.
    pub fn label(&self, interval: &Interval) -> String {
        match interval.kind {
            IntervalKind::Bounded => format!(
                "[{}, {}[",
                self.data_type.format(interval.min),
                self.data_type.format(interval.max)
            ),
            IntervalKind::BelowLower => format!("<{}", self.data_type.format(self.lower)),
            IntervalKind::AboveUpper => format!(">={}", self.data_type.format(self.upper)),
            IntervalKind::Any => ANY_VALUE.to_string(),
        }
    }

    /// Materializes the hierarchy for the given leaf values.
    pub fn build(&self, leaves: &[String]) -> DataResult<Hierarchy> {
        let mut table = Vec::with_capacity(leaves.len());
        for leaf in leaves {
            let x = self.data_type.parse(leaf)?;
            let mut row = Vec::with_capacity(self.height());
            row.push(leaf.clone());
            for level in 1..=self.levels.len() {
                row.push(self.label(&self.interval(level, x)?));
            }
            row.push(ANY_VALUE.to_string());
            table.push(row);
        }
        Ok(Hierarchy::new(table))
    }
}

/// The side from which characters are redacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedactionOrder {
    LeftToRight,
    RightToLeft,
}

/// A hierarchy that masks one more character per level.
#[derive(Debug, Clone, PartialEq)]
pub struct RedactionHierarchy {
    redaction_char: char,
    padding_char: char,
    order: RedactionOrder,
}

impl Default for RedactionHierarchy {
    fn default() -> Self {
        RedactionHierarchy {
            redaction_char: '*',
            padding_char: ' ',
            order: RedactionOrder::RightToLeft,
        }
    }
}

impl RedactionHierarchy {
    pub fn new(redaction_char: char, padding_char: char, order: RedactionOrder) -> Self {
        RedactionHierarchy {
            redaction_char,
            padding_char,
            order,
        }
    }

    pub fn order(&self) -> RedactionOrder {
        self.order
    }

    /// Length of the longest leaf in characters.
    pub fn max_value_length(&self, leaves: &[String]) -> usize {
        leaves.iter().map(|l| l.chars().count()).max().unwrap_or(0)
    }

    /// Number of distinct characters in the padded leaves.
    pub fn alphabet_size(&self, leaves: &[String]) -> usize {
        let max = self.max_value_length(leaves);
        leaves
            .iter()
            .flat_map(|l| self.pad(l, max))
            .collect::<BTreeSet<char>>()
            .len()
    }

    fn pad(&self, value: &str, len: usize) -> Vec<char> {
        let chars: Vec<char> = value.chars().collect();
        let missing = len.saturating_sub(chars.len());
        let padding = std::iter::repeat(self.padding_char).take(missing);
        match self.order {
            // Redacting from the right keeps the prefix, so pad on the left.
            RedactionOrder::RightToLeft => padding.chain(chars).collect(),
            RedactionOrder::LeftToRight => chars.into_iter().chain(padding).collect(),
        }
    }

    fn redact(&self, padded: &[char], level: usize) -> String {
        let len = padded.len();
        padded
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let masked = match self.order {
                    RedactionOrder::RightToLeft => i >= len.saturating_sub(level),
                    RedactionOrder::LeftToRight => i < level,
                };
                if masked {
                    self.redaction_char
                } else {
                    *c
                }
            })
            .collect()
    }

    /// Materializes the hierarchy; it has `max_value_length + 1` levels.
    pub fn build(&self, leaves: &[String]) -> Hierarchy {
        let max = self.max_value_length(leaves);
        let table = leaves
            .iter()
            .map(|leaf| {
                let padded = self.pad(leaf, max);
                let mut row = Vec::with_capacity(max + 1);
                row.push(leaf.clone());
                for level in 1..=max {
                    row.push(self.redact(&padded, level));
                }
                row
            })
            .collect();
        Hierarchy::new(table)
    }
}

/// A functional hierarchy description attached to an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionalHierarchy {
    Interval(IntervalHierarchy),
    Redaction(RedactionHierarchy),
}

impl FunctionalHierarchy {
    pub fn build(&self, leaves: &[String]) -> DataResult<Hierarchy> {
        match self {
            FunctionalHierarchy::Interval(h) => h.build(leaves),
            FunctionalHierarchy::Redaction(h) => Ok(h.build(leaves)),
        }
    }
}
