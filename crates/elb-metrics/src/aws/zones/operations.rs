//! Availability zone enumeration

use crate::aws::context::AwsContext;
use crate::aws::error::classify_anyhow_error;
use anyhow::{Context, Result};
use aws_sdk_ec2::{Client, types::Filter};
use backon::{ExponentialBuilder, Retryable};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Source of availability zone names for the active region.
///
/// Abstracted so the zone cache can be tested without hitting real AWS.
pub trait ZoneOperations: Send + Sync {
    /// List the zone names of the region, in a stable order
    fn list_availability_zones(&self) -> impl Future<Output = Result<Vec<String>>> + Send;
}

/// EC2-backed zone source (`DescribeAvailabilityZones`)
pub struct Ec2ZoneClient {
    client: Client,
    region: String,
}

impl Ec2ZoneClient {
    /// Create a client from a pre-loaded AWS context
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.ec2_client(),
            region: ctx.region().to_string(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Describe the zones currently `available` in the region, sorted by name.
    ///
    /// Throttling is retried with exponential backoff; any other error is
    /// returned to the caller.
    pub async fn describe_zones(&self) -> Result<Vec<String>> {
        let response = (|| async {
            self.client
                .describe_availability_zones()
                .filters(Filter::builder().name("state").values("available").build())
                .send()
                .await
                .context("Failed to describe availability zones")
        })
        .retry(
            ExponentialBuilder::default()
                .with_min_delay(Duration::from_millis(500))
                .with_max_delay(Duration::from_secs(10))
                .with_max_times(5),
        )
        .when(|e| classify_anyhow_error(e).is_retryable())
        .notify(|e, dur| {
            warn!(
                region = %self.region,
                delay = ?dur,
                error = %e,
                "AWS rate limited zone lookup, backing off..."
            );
        })
        .await?;

        let mut zones: Vec<String> = response
            .availability_zones()
            .iter()
            .filter_map(|az| az.zone_name())
            .map(str::to_string)
            .collect();
        zones.sort();

        debug!(region = %self.region, zones = ?zones, "Described availability zones");

        Ok(zones)
    }
}

impl ZoneOperations for Ec2ZoneClient {
    async fn list_availability_zones(&self) -> Result<Vec<String>> {
        Ec2ZoneClient::describe_zones(self).await
    }
}
