//! Shared CloudWatch constants for ELBv2 metrics.
//!
//! Single source of truth for namespaces and dimension names, so descriptors
//! built here match what Elastic Load Balancing actually publishes.
//!
//! NOTE: Conversion into AWS SDK `Dimension` objects lives in the
//! `elb-metrics` crate to keep the AWS SDK out of this crate.

/// Namespace for Application Load Balancer metrics
pub const APPLICATION_NAMESPACE: &str = "AWS/ApplicationELB";

/// Namespace for Network Load Balancer metrics
pub const NETWORK_NAMESPACE: &str = "AWS/NetworkELB";

/// Dimension names ELB publishes metrics under
pub mod dimensions {
    pub const LOAD_BALANCER: &str = "LoadBalancer";
    pub const TARGET_GROUP: &str = "TargetGroup";
    pub const AVAILABILITY_ZONE: &str = "AvailabilityZone";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(APPLICATION_NAMESPACE, "AWS/ApplicationELB");
        assert_eq!(NETWORK_NAMESPACE, "AWS/NetworkELB");
        assert_eq!(dimensions::LOAD_BALANCER, "LoadBalancer");
        assert_eq!(dimensions::TARGET_GROUP, "TargetGroup");
        assert_eq!(dimensions::AVAILABILITY_ZONE, "AvailabilityZone");
    }
}
