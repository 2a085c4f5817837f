//! Configuration types for the elb-metrics tool

use elb_metrics_common::defaults::{DEFAULT_LOOKUP_TIMEOUT_SECS, DEFAULT_REGION};
use std::time::Duration;

/// What a zone cache does after a lookup fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Keep the failure; every later call observes the same error
    #[default]
    CacheForever,
    /// Forget the failure; the next call starts a fresh lookup
    Retry,
}

/// Zone cache behaviour
#[derive(Debug, Clone)]
pub struct ZoneCacheConfig {
    /// Upper bound on a single lookup (`None` waits indefinitely)
    pub lookup_timeout: Option<Duration>,
    /// Handling of failed lookups
    pub failure_policy: FailurePolicy,
}

impl Default for ZoneCacheConfig {
    fn default() -> Self {
        Self {
            lookup_timeout: Some(Duration::from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS)),
            failure_policy: FailurePolicy::default(),
        }
    }
}

/// AWS connection configuration
#[derive(Debug, Clone)]
pub struct AwsConfig {
    /// AWS region
    pub region: String,
    /// AWS profile name (overrides default credential resolution)
    pub aws_profile: Option<String>,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            aws_profile: None,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub aws: AwsConfig,
    pub zones: ZoneCacheConfig,
}

impl Config {
    pub fn region(&self) -> &str {
        &self.aws.region
    }
    pub fn aws_profile(&self) -> Option<&str> {
        self.aws.aws_profile.as_deref()
    }
}
