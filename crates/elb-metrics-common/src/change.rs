//! Optional overrides applied when building a metric

use crate::handle::{LoadBalancerHandle, TargetGroupHandle};
use crate::statistic::Statistic;
use std::time::Duration;

/// Change-set for a metric: every field is optional and absence means
/// "no filter" or "no override".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricChange {
    /// Statistic to apply over each period
    pub statistic: Option<Statistic>,
    /// Aggregation period
    pub period: Option<Duration>,
    /// CloudWatch unit name (e.g. "Count", "Seconds")
    pub unit: Option<String>,
    /// Filter by load balancer
    pub load_balancer: Option<LoadBalancerHandle>,
    /// Filter by target group. A raw target group also needs `load_balancer`;
    /// a wrapped one carries its own.
    pub target_group: Option<TargetGroupHandle>,
    /// Filter by availability zone
    pub availability_zone: Option<String>,
}

impl MetricChange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statistic(mut self, statistic: Statistic) -> Self {
        self.statistic = Some(statistic);
        self
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = Some(period);
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_load_balancer(mut self, load_balancer: impl Into<LoadBalancerHandle>) -> Self {
        self.load_balancer = Some(load_balancer.into());
        self
    }

    pub fn with_target_group(mut self, target_group: impl Into<TargetGroupHandle>) -> Self {
        self.target_group = Some(target_group.into());
        self
    }

    pub fn with_availability_zone(mut self, zone: impl Into<String>) -> Self {
        self.availability_zone = Some(zone.into());
        self
    }

    /// Fill in `statistic` only if the caller did not set one.
    pub fn or_default_statistic(mut self, default: Option<Statistic>) -> Self {
        if self.statistic.is_none() {
            self.statistic = default;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::RawHandle;

    #[test]
    fn default_is_empty() {
        let change = MetricChange::new();
        assert!(change.statistic.is_none());
        assert!(change.period.is_none());
        assert!(change.unit.is_none());
        assert!(change.load_balancer.is_none());
        assert!(change.target_group.is_none());
        assert!(change.availability_zone.is_none());
    }

    #[test]
    fn caller_statistic_wins_over_default() {
        let change = MetricChange::new()
            .with_statistic(Statistic::Average)
            .or_default_statistic(Some(Statistic::Sum));
        assert_eq!(change.statistic, Some(Statistic::Average));
    }

    #[test]
    fn default_statistic_fills_gap() {
        let change = MetricChange::new().or_default_statistic(Some(Statistic::Sum));
        assert_eq!(change.statistic, Some(Statistic::Sum));

        let change = MetricChange::new().or_default_statistic(None);
        assert_eq!(change.statistic, None);
    }

    #[test]
    fn builders_set_fields() {
        let change = MetricChange::new()
            .with_period(Duration::from_secs(300))
            .with_unit("Count")
            .with_load_balancer(RawHandle::new("app/lb/1"))
            .with_target_group(RawHandle::new("targetgroup/tg/2"))
            .with_availability_zone("us-east-2a");

        assert_eq!(change.period, Some(Duration::from_secs(300)));
        assert_eq!(change.unit.as_deref(), Some("Count"));
        assert_eq!(
            change.load_balancer,
            Some(LoadBalancerHandle::Raw(RawHandle::new("app/lb/1")))
        );
        assert_eq!(
            change.target_group,
            Some(TargetGroupHandle::Raw(RawHandle::new("targetgroup/tg/2")))
        );
        assert_eq!(change.availability_zone.as_deref(), Some("us-east-2a"));
    }
}
