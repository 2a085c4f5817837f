//! Conversion of metric descriptors into CloudWatch SDK types
//!
//! Lets a descriptor be handed straight to `GetMetricData`,
//! `PutMetricAlarm` or a dashboard widget builder. No requests are sent here.

use anyhow::{Context, Result};
use aws_sdk_cloudwatch::types::{Dimension, Metric, MetricStat, StandardUnit};
use elb_metrics_common::{Dimensions, MetricDescriptor, Statistic};
use std::time::Duration;

/// Statistic used when a descriptor does not name one (CloudWatch's own default)
const FALLBACK_STATISTIC: Statistic = Statistic::Average;

/// Build the CloudWatch dimension list for resolved dimensions.
pub fn to_cloudwatch_dimensions(dims: &Dimensions) -> Vec<Dimension> {
    dims.iter()
        .map(|(name, value)| Dimension::builder().name(name.as_str()).value(value).build())
        .collect()
}

/// Build the CloudWatch `Metric` (namespace, name, dimensions) for a descriptor.
pub fn to_metric(desc: &MetricDescriptor) -> Metric {
    Metric::builder()
        .namespace(desc.namespace())
        .metric_name(desc.name())
        .set_dimensions(Some(to_cloudwatch_dimensions(desc.dimensions())))
        .build()
}

/// Build a `MetricStat` for a descriptor.
///
/// `default_period` applies when the descriptor has none. CloudWatch needs
/// a whole number of seconds of at least one, and a unit it recognises.
pub fn to_metric_stat(desc: &MetricDescriptor, default_period: Duration) -> Result<MetricStat> {
    let period = desc.period().unwrap_or(default_period);
    if period.subsec_nanos() != 0 {
        anyhow::bail!("Metric period must be whole seconds, got {:?}", period);
    }
    let period_secs = i32::try_from(period.as_secs())
        .with_context(|| format!("Metric period too large: {:?}", period))?;
    if period_secs < 1 {
        anyhow::bail!("Metric period must be at least one second");
    }

    let stat = desc.statistic().unwrap_or(FALLBACK_STATISTIC);

    let mut builder = MetricStat::builder()
        .metric(to_metric(desc))
        .period(period_secs)
        .stat(stat.to_string());

    if let Some(unit) = desc.unit() {
        if !StandardUnit::values().iter().any(|known| *known == unit) {
            anyhow::bail!("Unknown CloudWatch unit '{}'", unit);
        }
        builder = builder.unit(StandardUnit::from(unit));
    }

    Ok(builder.build())
}
