//! elb-metrics - CloudWatch metric descriptors for ELBv2
//!
//! Builds dimensioned metric descriptors for Application and Network Load
//! Balancers (via `elb-metrics-common`) and converts them into CloudWatch SDK
//! types. Also provides a process-wide, single-flight cache of the region's
//! availability zones.

pub mod aws;
pub mod config;

pub use elb_metrics_common as common;
