//! Availability zone lookups against real AWS
//!
//! These tests are marked `#[ignore]` and only run with:
//! ```
//! AWS_PROFILE=your_profile cargo test --test aws_zones_integration -- --ignored
//! ```

use elb_metrics::aws::{AwsContext, Ec2ZoneClient, ZoneCache, ZoneError, global_zone_cache};
use elb_metrics::config::ZoneCacheConfig;

/// Get the AWS region for tests.
///
/// Checks AWS_REGION, then AWS_DEFAULT_REGION, then falls back to us-east-2.
fn get_test_region() -> String {
    std::env::var("AWS_REGION")
        .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
        .unwrap_or_else(|_| "us-east-2".to_string())
}

#[tokio::test]
#[ignore = "requires AWS credentials"]
async fn test_describe_zones() {
    let region = get_test_region();
    let ctx = AwsContext::new(&region, None).await;
    let client = Ec2ZoneClient::from_context(&ctx);
    assert_eq!(client.region(), region);

    let zones = client.describe_zones().await.expect("Should list zones");
    assert!(!zones.is_empty(), "Region {region} should have zones");
    for zone in &zones {
        assert!(
            zone.starts_with(&region),
            "Zone {zone} should belong to {region}"
        );
    }

    let mut sorted = zones.clone();
    sorted.sort();
    assert_eq!(zones, sorted, "Zones should be sorted by name");
}

#[tokio::test]
#[ignore = "requires AWS credentials"]
async fn test_cache_against_ec2() {
    let region = get_test_region();
    let ctx = AwsContext::new(&region, None).await;
    let cache = ZoneCache::new(Ec2ZoneClient::from_context(&ctx), ZoneCacheConfig::default());

    let zones = cache.zones().await.expect("Should list zones");
    assert_eq!(cache.zone(0).await.expect("First zone"), zones[0]);
    assert!(matches!(
        cache.zone(zones.len()).await,
        Err(ZoneError::OutOfRange { .. })
    ));
    assert_eq!(cache.attempts(), 1);
}

#[tokio::test]
#[ignore = "requires AWS credentials"]
async fn test_global_cache_is_shared() {
    let region = get_test_region();
    let ctx = AwsContext::new(&region, None).await;
    let config = ZoneCacheConfig::default();

    let first = global_zone_cache(&ctx, &config);
    let second = global_zone_cache(&ctx, &config);
    assert!(std::ptr::eq(first, second));

    first.zones().await.expect("Should list zones");
    assert!(second.cached().is_some());
    assert_eq!(second.attempts(), 1);
}
