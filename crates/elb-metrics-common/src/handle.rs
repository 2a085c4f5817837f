//! Load balancer and target group handles
//!
//! A metric filter can name a load balancer or target group in two ways:
//!
//! - a [`RawHandle`]: just the provider-side ARN suffix, nothing else known
//! - a wrapper ([`LoadBalancer`] / [`TargetGroup`]) that owns its raw handle and,
//!   for target groups, the load balancer it is attached to
//!
//! [`LoadBalancerHandle`] and [`TargetGroupHandle`] are the sum types callers
//! pass around; dimension resolution matches on them exhaustively.

use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// ARN service segment for Elastic Load Balancing v2
const ELB_SERVICE: &str = "elasticloadbalancing";

/// Resource prefix of a load balancer ARN (stripped from the suffix)
const LOAD_BALANCER_PREFIX: &str = "loadbalancer/";

/// Resource prefix of a target group ARN (kept in the suffix)
const TARGET_GROUP_PREFIX: &str = "targetgroup/";

/// Errors building handles from ARNs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandleError {
    #[error("invalid ELBv2 ARN '{arn}': {reason}")]
    InvalidArn { arn: String, reason: &'static str },

    #[error("unsupported load balancer type in '{0}' (expected app/ or net/)")]
    UnsupportedKind(String),
}

/// Provider-side identity of a load balancer or target group.
///
/// Holds the ARN suffix CloudWatch uses as a dimension value, e.g.
/// `app/my-lb/50dc6c495c0c9188` or `targetgroup/my-tg/73e2d6bc24d8a067`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, derive_more::Deref)]
pub struct RawHandle(String);

impl RawHandle {
    /// Wrap an already-derived ARN suffix.
    pub fn new(arn_suffix: impl Into<String>) -> Self {
        RawHandle(arn_suffix.into())
    }

    /// Derive the ARN suffix from a full load balancer or target group ARN.
    pub fn from_arn(arn: &str) -> Result<Self, HandleError> {
        let invalid = |reason| HandleError::InvalidArn {
            arn: arn.to_string(),
            reason,
        };

        let parts: Vec<&str> = arn.splitn(6, ':').collect();
        let [prefix, _partition, service, _region, _account, resource] = parts[..] else {
            return Err(invalid("expected 6 colon-separated fields"));
        };
        if prefix != "arn" {
            return Err(invalid("missing 'arn' prefix"));
        }
        if service != ELB_SERVICE {
            return Err(invalid("not an elasticloadbalancing ARN"));
        }

        let suffix = if let Some(rest) = resource.strip_prefix(LOAD_BALANCER_PREFIX) {
            rest
        } else if resource.starts_with(TARGET_GROUP_PREFIX) {
            resource
        } else {
            return Err(invalid("resource is neither a load balancer nor a target group"));
        };

        if suffix.split('/').any(str::is_empty) {
            return Err(invalid("empty resource path segment"));
        }

        Ok(RawHandle(suffix.to_string()))
    }

    /// The ARN suffix used as the dimension value
    pub fn identifying_string(&self) -> &str {
        &self.0
    }
}

/// Load balancer flavour; determines the CloudWatch namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadBalancerKind {
    Application,
    Network,
}

impl LoadBalancerKind {
    /// CloudWatch namespace ELB publishes this kind's metrics under
    pub fn namespace(self) -> &'static str {
        match self {
            LoadBalancerKind::Application => crate::metrics::APPLICATION_NAMESPACE,
            LoadBalancerKind::Network => crate::metrics::NETWORK_NAMESPACE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LoadBalancerKind::Application => "application",
            LoadBalancerKind::Network => "network",
        }
    }

    /// Infer the kind from a load balancer ARN suffix (`app/...` or `net/...`).
    pub fn from_arn_suffix(suffix: &str) -> Result<Self, HandleError> {
        if suffix.starts_with("app/") {
            Ok(LoadBalancerKind::Application)
        } else if suffix.starts_with("net/") {
            Ok(LoadBalancerKind::Network)
        } else {
            Err(HandleError::UnsupportedKind(suffix.to_string()))
        }
    }
}

impl FromStr for LoadBalancerKind {
    type Err = HandleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "application" | "app" | "alb" => Ok(LoadBalancerKind::Application),
            "network" | "net" | "nlb" => Ok(LoadBalancerKind::Network),
            other => Err(HandleError::UnsupportedKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for LoadBalancerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Load balancer wrapper: owns its raw handle and knows its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadBalancer {
    raw: RawHandle,
    kind: LoadBalancerKind,
}

impl LoadBalancer {
    pub fn new(kind: LoadBalancerKind, raw: RawHandle) -> Self {
        Self { raw, kind }
    }

    /// Build from a full load balancer ARN, inferring the kind.
    pub fn from_arn(arn: &str) -> Result<Self, HandleError> {
        let raw = RawHandle::from_arn(arn)?;
        let kind = LoadBalancerKind::from_arn_suffix(raw.identifying_string())?;
        Ok(Self { raw, kind })
    }

    pub fn raw(&self) -> &RawHandle {
        &self.raw
    }

    pub fn kind(&self) -> LoadBalancerKind {
        self.kind
    }
}

/// Target group wrapper: owns its raw handle and its parent load balancer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetGroup {
    raw: RawHandle,
    load_balancer: Arc<LoadBalancer>,
}

impl TargetGroup {
    pub fn new(raw: RawHandle, load_balancer: Arc<LoadBalancer>) -> Self {
        Self { raw, load_balancer }
    }

    /// Build from a full target group ARN attached to `load_balancer`.
    pub fn from_arn(arn: &str, load_balancer: Arc<LoadBalancer>) -> Result<Self, HandleError> {
        Ok(Self::new(RawHandle::from_arn(arn)?, load_balancer))
    }

    pub fn raw(&self) -> &RawHandle {
        &self.raw
    }

    /// The load balancer this target group is attached to
    pub fn load_balancer(&self) -> &Arc<LoadBalancer> {
        &self.load_balancer
    }
}

/// A load balancer given either as a raw handle or as a wrapper
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadBalancerHandle {
    Raw(RawHandle),
    Wrapped(Arc<LoadBalancer>),
}

impl LoadBalancerHandle {
    pub fn identifying_string(&self) -> &str {
        match self {
            LoadBalancerHandle::Raw(raw) => raw.identifying_string(),
            LoadBalancerHandle::Wrapped(lb) => lb.raw().identifying_string(),
        }
    }
}

impl From<RawHandle> for LoadBalancerHandle {
    fn from(raw: RawHandle) -> Self {
        LoadBalancerHandle::Raw(raw)
    }
}

impl From<Arc<LoadBalancer>> for LoadBalancerHandle {
    fn from(lb: Arc<LoadBalancer>) -> Self {
        LoadBalancerHandle::Wrapped(lb)
    }
}

impl From<LoadBalancer> for LoadBalancerHandle {
    fn from(lb: LoadBalancer) -> Self {
        LoadBalancerHandle::Wrapped(Arc::new(lb))
    }
}

/// A target group given either as a raw handle or as a wrapper
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetGroupHandle {
    Raw(RawHandle),
    Wrapped(Arc<TargetGroup>),
}

impl TargetGroupHandle {
    pub fn identifying_string(&self) -> &str {
        match self {
            TargetGroupHandle::Raw(raw) => raw.identifying_string(),
            TargetGroupHandle::Wrapped(tg) => tg.raw().identifying_string(),
        }
    }
}

impl From<RawHandle> for TargetGroupHandle {
    fn from(raw: RawHandle) -> Self {
        TargetGroupHandle::Raw(raw)
    }
}

impl From<Arc<TargetGroup>> for TargetGroupHandle {
    fn from(tg: Arc<TargetGroup>) -> Self {
        TargetGroupHandle::Wrapped(tg)
    }
}

impl From<TargetGroup> for TargetGroupHandle {
    fn from(tg: TargetGroup) -> Self {
        TargetGroupHandle::Wrapped(Arc::new(tg))
    }
}
