//! elb-metrics-common - CloudWatch metric descriptors for ELBv2
//!
//! This crate builds metric query descriptors for Application and Network
//! Load Balancers without any AWS SDK dependencies, so it stays lightweight
//! and fully testable offline.
//!
//! ## Modules
//!
//! - [`statistic`]: Closed set of CloudWatch statistics
//! - [`handle`]: Raw and wrapped load balancer / target group handles
//! - [`change`]: Optional per-metric overrides and filters
//! - [`dimensions`]: Dimension resolution from resource filters
//! - [`descriptor`]: Immutable metric descriptors and the factory
//! - [`catalog`]: Named metrics per load balancer kind with default statistics
//! - [`metrics`]: Namespace and dimension name constants
//! - [`defaults`]: Default configuration values

pub mod catalog;
pub mod change;
pub mod defaults;
pub mod descriptor;
pub mod dimensions;
pub mod handle;
pub mod metrics;
pub mod statistic;

// Re-export commonly used types
pub use catalog::{ApplicationMetric, CatalogMetric, NetworkMetric, UnknownMetric};
pub use change::MetricChange;
pub use descriptor::{MetricDescriptor, create};
pub use dimensions::{DimensionError, DimensionName, Dimensions, resolve};
pub use handle::{
    HandleError, LoadBalancer, LoadBalancerHandle, LoadBalancerKind, RawHandle, TargetGroup,
    TargetGroupHandle,
};
pub use statistic::{Percentile, Statistic, StatisticParseError};
