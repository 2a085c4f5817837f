//! Default configuration values shared across elb-metrics components

use std::time::Duration;

/// Default AWS region when none is configured
pub const DEFAULT_REGION: &str = "us-east-2";

/// Period assumed for a descriptor without one when it is checked against
/// CloudWatch's `MetricStat` rules (CloudWatch's own default is one minute)
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(60);

/// Default timeout for a single availability zone lookup, in seconds
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 30;
