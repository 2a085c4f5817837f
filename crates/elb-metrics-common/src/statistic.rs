//! CloudWatch statistics
//!
//! The closed set of statistics a metric query may request. Percentiles are
//! CloudWatch "extended statistics" and are spelled `pNN` / `pNN.NN` on the
//! wire.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Statistic applied to a metric over its period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    Sum,
    Average,
    Minimum,
    Maximum,
    SampleCount,
    Percentile(Percentile),
}

/// Percentile rank in `0.0..=100.0`.
///
/// Only built through [`Statistic::percentile`] or parsing, so the value is
/// always finite and in range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Percentile(f64);

// NaN is never stored, so equality is total.
impl Eq for Percentile {}

impl Percentile {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Percentile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Failure to parse a statistic from its wire spelling
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatisticParseError {
    #[error("unknown statistic '{0}' (expected Sum, Average, Minimum, Maximum, SampleCount or pNN)")]
    Unknown(String),

    #[error("percentile out of range in '{0}' (must be between p0 and p100)")]
    PercentileOutOfRange(String),
}

impl Statistic {
    /// Build a percentile statistic, rejecting values outside `0..=100`.
    pub fn percentile(p: f64) -> Result<Self, StatisticParseError> {
        if (0.0..=100.0).contains(&p) {
            Ok(Statistic::Percentile(Percentile(p)))
        } else {
            Err(StatisticParseError::PercentileOutOfRange(format!("p{p}")))
        }
    }

    /// Whether CloudWatch treats this as an extended statistic
    pub fn is_extended(&self) -> bool {
        matches!(self, Statistic::Percentile(_))
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statistic::Sum => f.write_str("Sum"),
            Statistic::Average => f.write_str("Average"),
            Statistic::Minimum => f.write_str("Minimum"),
            Statistic::Maximum => f.write_str("Maximum"),
            Statistic::SampleCount => f.write_str("SampleCount"),
            Statistic::Percentile(p) => write!(f, "{p}"),
        }
    }
}

impl FromStr for Statistic {
    type Err = StatisticParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Sum" => Ok(Statistic::Sum),
            "Average" => Ok(Statistic::Average),
            "Minimum" => Ok(Statistic::Minimum),
            "Maximum" => Ok(Statistic::Maximum),
            "SampleCount" => Ok(Statistic::SampleCount),
            _ => {
                let value = s
                    .strip_prefix('p')
                    .filter(|rest| !rest.is_empty() && !rest.starts_with(['+', '-']))
                    .and_then(|rest| rest.parse::<f64>().ok())
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| StatisticParseError::Unknown(s.to_string()))?;

                Statistic::percentile(value)
                    .map_err(|_| StatisticParseError::PercentileOutOfRange(s.to_string()))
            }
        }
    }
}

impl Serialize for Statistic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
