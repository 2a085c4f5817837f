//! Metric descriptors
//!
//! A [`MetricDescriptor`] is everything a monitoring backend needs to query
//! or alarm on a metric: namespace, name, optional statistic/period/unit and
//! the resolved dimensions. Descriptors are immutable once built.

use crate::change::MetricChange;
use crate::dimensions::{self, DimensionError, Dimensions};
use crate::statistic::Statistic;
use serde::Serialize;
use std::time::Duration;

/// Fully-qualified, dimensioned metric query descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricDescriptor {
    namespace: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    statistic: Option<Statistic>,
    #[serde(
        rename = "period_secs",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_period"
    )]
    period: Option<Duration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
    dimensions: Dimensions,
}

fn serialize_period<S: serde::Serializer>(
    period: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match period {
        Some(p) => serializer.serialize_some(&p.as_secs()),
        None => serializer.serialize_none(),
    }
}

impl MetricDescriptor {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn statistic(&self) -> Option<Statistic> {
        self.statistic
    }

    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    /// Copy of this descriptor with `extra` merged over its dimensions.
    pub fn with_dimensions(&self, extra: Dimensions) -> Self {
        let mut next = self.clone();
        next.dimensions.extend(extra);
        next
    }
}

/// Build a descriptor for `name` in `namespace`.
///
/// Dimensions come from [`dimensions::resolve`]; statistic, period and unit
/// are copied from `change` as given. Resolution errors are returned
/// unchanged.
pub fn create(
    namespace: &str,
    name: &str,
    change: &MetricChange,
) -> Result<MetricDescriptor, DimensionError> {
    let dimensions = dimensions::resolve(change)?;

    Ok(MetricDescriptor {
        namespace: namespace.to_string(),
        name: name.to_string(),
        statistic: change.statistic,
        period: change.period,
        unit: change.unit.clone(),
        dimensions,
    })
}
