//! AWS-facing modules
//!
//! - context: shared SDK configuration
//! - error: typed classification of SDK failures
//! - zones: cached availability zone lookup
//! - cloudwatch: descriptor -> CloudWatch SDK type conversions

pub mod cloudwatch;
pub mod context;
pub mod error;
pub mod zones;

pub use cloudwatch::{to_cloudwatch_dimensions, to_metric, to_metric_stat};
pub use context::AwsContext;
pub use error::{AwsError, classify_anyhow_error, classify_aws_error};
pub use zones::{
    Ec2ZoneClient, ZoneCache, ZoneCacheState, ZoneError, ZoneOperations, Zones, global_zone_cache,
};
