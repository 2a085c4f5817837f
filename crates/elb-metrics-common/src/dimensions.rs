//! Dimension resolution
//!
//! Turns the resource filters of a [`MetricChange`] into the flat
//! name -> value mapping CloudWatch expects. Pure: no I/O, no side effects.

use crate::change::MetricChange;
use crate::handle::{LoadBalancerHandle, TargetGroupHandle};
use crate::metrics::dimensions;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Dimension names a load balancer metric can be filtered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DimensionName {
    LoadBalancer,
    TargetGroup,
    AvailabilityZone,
}

impl DimensionName {
    pub fn as_str(self) -> &'static str {
        match self {
            DimensionName::LoadBalancer => dimensions::LOAD_BALANCER,
            DimensionName::TargetGroup => dimensions::TARGET_GROUP,
            DimensionName::AvailabilityZone => dimensions::AVAILABILITY_ZONE,
        }
    }
}

impl fmt::Display for DimensionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DimensionName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Resolved dimensions, ordered by name so equal inputs compare and
/// serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Dimensions(BTreeMap<DimensionName, String>);

impl Dimensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a dimension, replacing any previous value.
    pub fn insert(&mut self, name: DimensionName, value: impl Into<String>) {
        self.0.insert(name, value.into());
    }

    pub fn get(&self, name: DimensionName) -> Option<&str> {
        self.0.get(&name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DimensionName, &str)> {
        self.0.iter().map(|(name, value)| (*name, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge `other` into `self`; values from `other` win.
    pub fn extend(&mut self, other: Dimensions) {
        self.0.extend(other.0);
    }
}

impl<V: Into<String>> FromIterator<(DimensionName, V)> for Dimensions {
    fn from_iter<I: IntoIterator<Item = (DimensionName, V)>>(iter: I) -> Self {
        Dimensions(
            iter.into_iter()
                .map(|(name, value)| (name, value.into()))
                .collect(),
        )
    }
}

/// Caller-input errors raised while resolving dimensions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DimensionError {
    /// A raw target group carries no parent load balancer, so one must be given.
    #[error("load_balancer must accompany raw target group '{target_group}'")]
    RawTargetGroupWithoutLoadBalancer { target_group: String },
}

/// Resolve the dimension filters of `change`.
///
/// Fields are applied in order: load balancer, target group, availability
/// zone. A wrapped target group's own load balancer overwrites any explicit
/// `load_balancer`. A raw target group requires an explicit `load_balancer`.
pub fn resolve(change: &MetricChange) -> Result<Dimensions, DimensionError> {
    let mut dims = Dimensions::new();

    if let Some(load_balancer) = &change.load_balancer {
        let value = match load_balancer {
            LoadBalancerHandle::Wrapped(lb) => lb.raw().identifying_string(),
            LoadBalancerHandle::Raw(raw) => raw.identifying_string(),
        };
        dims.insert(DimensionName::LoadBalancer, value);
    }

    if let Some(target_group) = &change.target_group {
        match target_group {
            TargetGroupHandle::Wrapped(tg) => {
                dims.insert(DimensionName::TargetGroup, tg.raw().identifying_string());
                dims.insert(
                    DimensionName::LoadBalancer,
                    tg.load_balancer().raw().identifying_string(),
                );
            }
            TargetGroupHandle::Raw(raw) => {
                if change.load_balancer.is_none() {
                    return Err(DimensionError::RawTargetGroupWithoutLoadBalancer {
                        target_group: raw.identifying_string().to_string(),
                    });
                }
                dims.insert(DimensionName::TargetGroup, raw.identifying_string());
            }
        }
    }

    if let Some(zone) = &change.availability_zone {
        dims.insert(DimensionName::AvailabilityZone, zone.as_str());
    }

    debug!(dimensions = ?dims, "Resolved metric dimensions");

    Ok(dims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::{LoadBalancer, LoadBalancerKind, RawHandle, TargetGroup};
    use std::sync::Arc;

    fn wrapped_lb(suffix: &str) -> Arc<LoadBalancer> {
        Arc::new(LoadBalancer::new(
            LoadBalancerKind::Application,
            RawHandle::new(suffix),
        ))
    }

    fn wrapped_tg(suffix: &str, lb: &Arc<LoadBalancer>) -> Arc<TargetGroup> {
        Arc::new(TargetGroup::new(RawHandle::new(suffix), lb.clone()))
    }

    #[test]
    fn empty_change_yields_empty_mapping() {
        let dims = resolve(&MetricChange::new()).unwrap();
        assert!(dims.is_empty());
    }

    #[test]
    fn raw_load_balancer() {
        let change = MetricChange::new().with_load_balancer(RawHandle::new("lb-1"));
        let dims = resolve(&change).unwrap();
        assert_eq!(dims.get(DimensionName::LoadBalancer), Some("lb-1"));
        assert_eq!(dims.len(), 1);
    }

    #[test]
    fn wrapped_load_balancer_uses_owned_raw_handle() {
        let change = MetricChange::new().with_load_balancer(wrapped_lb("app/lb-1/abc"));
        let dims = resolve(&change).unwrap();
        assert_eq!(dims.get(DimensionName::LoadBalancer), Some("app/lb-1/abc"));
    }

    #[test]
    fn wrapped_target_group_owner_overrides_explicit_load_balancer() {
        let owner = wrapped_lb("lb-1");
        let change = MetricChange::new()
            .with_load_balancer(RawHandle::new("lb-2"))
            .with_target_group(wrapped_tg("tg-1", &owner));

        let dims = resolve(&change).unwrap();
        assert_eq!(dims.get(DimensionName::LoadBalancer), Some("lb-1"));
        assert_eq!(dims.get(DimensionName::TargetGroup), Some("tg-1"));
    }

    #[test]
    fn wrapped_target_group_supplies_load_balancer() {
        let owner = wrapped_lb("lb-1");
        let change = MetricChange::new().with_target_group(wrapped_tg("tg-1", &owner));

        let dims = resolve(&change).unwrap();
        assert_eq!(dims.get(DimensionName::LoadBalancer), Some("lb-1"));
        assert_eq!(dims.get(DimensionName::TargetGroup), Some("tg-1"));
    }

    #[test]
    fn raw_target_group_without_load_balancer_is_rejected() {
        let change = MetricChange::new().with_target_group(RawHandle::new("tg-1"));
        let err = resolve(&change).unwrap_err();
        assert_eq!(
            err,
            DimensionError::RawTargetGroupWithoutLoadBalancer {
                target_group: "tg-1".to_string()
            }
        );
    }

    #[test]
    fn raw_target_group_with_load_balancer() {
        let change = MetricChange::new()
            .with_target_group(RawHandle::new("tg-1"))
            .with_load_balancer(RawHandle::new("lb-1"));

        let dims = resolve(&change).unwrap();
        let expected: Dimensions = [
            (DimensionName::TargetGroup, "tg-1"),
            (DimensionName::LoadBalancer, "lb-1"),
        ]
        .into_iter()
        .collect();
        assert_eq!(dims, expected);
    }

    #[test]
    fn raw_target_group_keeps_wrapped_load_balancer_value() {
        let change = MetricChange::new()
            .with_load_balancer(wrapped_lb("lb-1"))
            .with_target_group(RawHandle::new("tg-1"));

        let dims = resolve(&change).unwrap();
        assert_eq!(dims.get(DimensionName::LoadBalancer), Some("lb-1"));
        assert_eq!(dims.get(DimensionName::TargetGroup), Some("tg-1"));
    }

    #[test]
    fn availability_zone_is_copied_verbatim() {
        let change = MetricChange::new().with_availability_zone("us-east-1a");
        let dims = resolve(&change).unwrap();
        assert_eq!(dims.get(DimensionName::AvailabilityZone), Some("us-east-1a"));
        assert_eq!(dims.len(), 1);
    }

    #[test]
    fn serializes_as_flat_object() {
        let change = MetricChange::new()
            .with_load_balancer(RawHandle::new("lb-1"))
            .with_availability_zone("us-east-1a");
        let dims = resolve(&change).unwrap();
        let json = serde_json::to_string(&dims).unwrap();
        assert_eq!(json, r#"{"LoadBalancer":"lb-1","AvailabilityZone":"us-east-1a"}"#);
    }

    #[test]
    fn extend_prefers_incoming_values() {
        let mut dims: Dimensions = [(DimensionName::LoadBalancer, "lb-1")].into_iter().collect();
        dims.extend(
            [
                (DimensionName::LoadBalancer, "lb-2"),
                (DimensionName::AvailabilityZone, "az"),
            ]
            .into_iter()
            .collect(),
        );
        assert_eq!(dims.get(DimensionName::LoadBalancer), Some("lb-2"));
        assert_eq!(dims.len(), 2);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn suffix() -> impl Strategy<Value = String> {
            "[a-z0-9/-]{1,24}"
        }

        #[derive(Debug, Clone)]
        enum LbInput {
            Raw(String),
            Wrapped(String),
        }

        #[derive(Debug, Clone)]
        enum TgInput {
            Raw(String),
            Wrapped { tg: String, owner: String },
        }

        fn lb_input() -> impl Strategy<Value = Option<LbInput>> {
            prop::option::of(prop_oneof![
                suffix().prop_map(LbInput::Raw),
                suffix().prop_map(LbInput::Wrapped),
            ])
        }

        fn tg_input() -> impl Strategy<Value = Option<TgInput>> {
            prop::option::of(prop_oneof![
                suffix().prop_map(TgInput::Raw),
                (suffix(), suffix()).prop_map(|(tg, owner)| TgInput::Wrapped { tg, owner }),
            ])
        }

        fn build(
            lb: &Option<LbInput>,
            tg: &Option<TgInput>,
            zone: &Option<String>,
        ) -> MetricChange {
            let mut change = MetricChange::new();
            change.load_balancer = lb.as_ref().map(|lb| match lb {
                LbInput::Raw(s) => LoadBalancerHandle::Raw(RawHandle::new(s.clone())),
                LbInput::Wrapped(s) => LoadBalancerHandle::Wrapped(wrapped_lb(s)),
            });
            change.target_group = tg.as_ref().map(|tg| match tg {
                TgInput::Raw(s) => TargetGroupHandle::Raw(RawHandle::new(s.clone())),
                TgInput::Wrapped { tg, owner } => {
                    TargetGroupHandle::Wrapped(wrapped_tg(tg, &wrapped_lb(owner)))
                }
            });
            change.availability_zone = zone.clone();
            change
        }

        proptest! {
            /// Keys appear only for supplied (or derivable) inputs
            #[test]
            fn keys_match_supplied_inputs(
                lb in lb_input(),
                tg in tg_input(),
                zone in prop::option::of("[a-z]{2}-[a-z]+-[0-9][a-z]"),
            ) {
                let change = build(&lb, &tg, &zone);
                match resolve(&change) {
                    Ok(dims) => {
                        let lb_expected = lb.is_some() || matches!(tg, Some(TgInput::Wrapped { .. }));
                        prop_assert_eq!(dims.get(DimensionName::LoadBalancer).is_some(), lb_expected);
                        prop_assert_eq!(dims.get(DimensionName::TargetGroup).is_some(), tg.is_some());
                        prop_assert_eq!(dims.get(DimensionName::AvailabilityZone), zone.as_deref());
                    }
                    Err(DimensionError::RawTargetGroupWithoutLoadBalancer { .. }) => {
                        prop_assert!(lb.is_none());
                        prop_assert!(matches!(tg, Some(TgInput::Raw(_))));
                    }
                }
            }

            /// A wrapped target group's owner is always the LoadBalancer dimension
            #[test]
            fn wrapped_target_group_owner_is_authoritative(
                lb in lb_input(),
                tg in suffix(),
                owner in suffix(),
            ) {
                let tg_in = Some(TgInput::Wrapped { tg, owner: owner.clone() });
                let dims = resolve(&build(&lb, &tg_in, &None)).unwrap();
                prop_assert_eq!(dims.get(DimensionName::LoadBalancer), Some(owner.as_str()));
            }

            /// Resolution is deterministic
            #[test]
            fn resolution_is_deterministic(lb in lb_input(), tg in tg_input()) {
                let change = build(&lb, &tg, &None);
                prop_assert_eq!(resolve(&change), resolve(&change.clone()));
            }
        }
    }
}
