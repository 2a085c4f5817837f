//! Availability zones of the active region
//!
//! [`ZoneCache`] memoizes the zone list behind a single-flight lookup;
//! [`Ec2ZoneClient`] is the EC2-backed source it normally wraps.

mod cache;
mod operations;

pub use cache::{ZoneCache, ZoneCacheState, ZoneError, Zones};
pub use operations::{Ec2ZoneClient, ZoneOperations};

use crate::aws::context::AwsContext;
use crate::config::ZoneCacheConfig;
use std::sync::OnceLock;
use tracing::{debug, warn};

static GLOBAL_ZONES: OnceLock<ZoneCache<Ec2ZoneClient>> = OnceLock::new();

/// Process-wide zone cache.
///
/// The first caller's context and config create it; later callers get the
/// same instance regardless of what they pass. The cache is never reset.
/// Reuse is logged, and a later caller asking for a different region gets a
/// warning since it will see the first region's zones.
pub fn global_zone_cache(
    ctx: &AwsContext,
    config: &ZoneCacheConfig,
) -> &'static ZoneCache<Ec2ZoneClient> {
    let (cache, reused) = get_or_init_tracked(&GLOBAL_ZONES, || {
        ZoneCache::new(Ec2ZoneClient::from_context(ctx), config.clone())
    });

    if reused {
        let cached_region = cache.source().region();
        if cached_region == ctx.region() {
            debug!(region = %cached_region, "Reusing process-wide zone cache");
        } else {
            warn!(
                cached_region = %cached_region,
                requested_region = %ctx.region(),
                "Process-wide zone cache belongs to another region; ignoring requested region"
            );
        }
    }

    cache
}

/// `OnceLock::get_or_init` that also reports whether an existing value was returned.
fn get_or_init_tracked<T>(cell: &OnceLock<T>, init: impl FnOnce() -> T) -> (&T, bool) {
    let mut created = false;
    let value = cell.get_or_init(|| {
        created = true;
        init()
    });
    (value, !created)
}
