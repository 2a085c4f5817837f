//! elb-metrics: CloudWatch metric descriptors for ELBv2 load balancers
//!
//! Prints dimensioned metric descriptors as JSON, lists the metric catalog,
//! and looks up the availability zones of the configured region.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use elb_metrics::aws::{AwsContext, ZoneError, global_zone_cache, to_metric_stat};
use elb_metrics::common::defaults::{DEFAULT_LOOKUP_TIMEOUT_SECS, DEFAULT_PERIOD, DEFAULT_REGION};
use elb_metrics::common::{
    CatalogMetric, LoadBalancer, LoadBalancerKind, MetricChange, RawHandle, Statistic, TargetGroup,
};
use elb_metrics::config::{self, FailurePolicy};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "elb-metrics")]
#[command(about = "CloudWatch metric descriptors for ELBv2 load balancers")]
#[command(version)]
struct Args {
    /// AWS region
    #[arg(long, env = "AWS_REGION", default_value = DEFAULT_REGION, global = true)]
    region: String,

    /// AWS profile to use (overrides AWS_PROFILE env var)
    #[arg(long, global = true)]
    aws_profile: Option<String>,

    /// Availability zone lookup timeout in seconds (0 waits indefinitely)
    #[arg(long, default_value_t = DEFAULT_LOOKUP_TIMEOUT_SECS, global = true)]
    lookup_timeout: u64,

    /// Retry a failed zone lookup on the next request instead of caching the failure
    #[arg(long, global = true)]
    retry_failed_lookups: bool,

    #[command(subcommand)]
    command: Command,
}

impl From<&Args> for config::Config {
    fn from(args: &Args) -> Self {
        Self {
            aws: config::AwsConfig {
                region: args.region.clone(),
                aws_profile: args.aws_profile.clone(),
            },
            zones: config::ZoneCacheConfig {
                lookup_timeout: (args.lookup_timeout > 0)
                    .then(|| Duration::from_secs(args.lookup_timeout)),
                failure_policy: if args.retry_failed_lookups {
                    FailurePolicy::Retry
                } else {
                    FailurePolicy::CacheForever
                },
            },
        }
    }
}

/// Arguments for the metric command (extracted to reduce enum size)
#[derive(clap::Args, Debug)]
struct MetricArgs {
    /// Load balancer kind (application or network)
    kind: LoadBalancerKind,

    /// Metric name, e.g. RequestCount
    name: String,

    /// Full ARN of the load balancer to filter on
    #[arg(long)]
    load_balancer_arn: Option<String>,

    /// Full ARN of the target group to filter on
    #[arg(long)]
    target_group_arn: Option<String>,

    /// Availability zone to filter on
    #[arg(long, conflicts_with = "zone_index")]
    availability_zone: Option<String>,

    /// Filter on the Nth availability zone of the region (sorted by name)
    #[arg(long)]
    zone_index: Option<usize>,

    /// Statistic (Sum, Average, Minimum, Maximum, SampleCount or pNN)
    #[arg(long)]
    statistic: Option<Statistic>,

    /// Period in seconds
    #[arg(long)]
    period: Option<u64>,

    /// CloudWatch unit, e.g. Count or Seconds
    #[arg(long)]
    unit: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the availability zones of the region
    Zones {
        /// Only print the zone at this index
        #[arg(long)]
        index: Option<usize>,
    },

    /// Print the descriptor of a catalog metric as JSON
    Metric(Box<MetricArgs>),

    /// List the metrics of a load balancer kind with their default statistics
    Catalog {
        /// Load balancer kind (application or network)
        kind: LoadBalancerKind,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }

    let hint = e
        .chain()
        .find_map(|cause| cause.downcast_ref::<ZoneError>())
        .and_then(ZoneError::aws_error)
        .and_then(|aws| aws.suggestion());
    if let Some(hint) = hint {
        let _ = writeln!(stderr, "\n\x1b[36mHint:\x1b[0m {hint}");
    }

    if std::env::var("RUST_BACKTRACE").is_err() {
        let _ = writeln!(
            stderr,
            "\n\x1b[2mSet RUST_BACKTRACE=1 for a detailed backtrace\x1b[0m"
        );
    } else {
        let backtrace = e.backtrace();
        if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
            let _ = writeln!(stderr, "\n\x1b[2mBacktrace:\x1b[0m\n{backtrace}");
        }
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = config::Config::from(&args);

    match args.command {
        Command::Zones { index } => handle_zones(&config, index).await?,
        Command::Metric(metric_args) => handle_metric(&config, *metric_args).await?,
        Command::Catalog { kind } => handle_catalog(kind),
    }

    Ok(())
}

async fn aws_context(config: &config::Config) -> AwsContext {
    if let Some(profile) = config.aws_profile() {
        info!(profile = %profile, "Using AWS profile");
    }
    AwsContext::new(config.region(), config.aws_profile()).await
}

/// Handle the zones command
async fn handle_zones(config: &config::Config, index: Option<usize>) -> Result<()> {
    let aws = aws_context(config).await;
    let cache = global_zone_cache(&aws, &config.zones);

    match index {
        Some(index) => {
            let zone = cache
                .zone(index)
                .await
                .with_context(|| format!("No availability zone at index {index}"))?;
            println!("{zone}");
        }
        None => {
            let zones = cache
                .zones()
                .await
                .with_context(|| format!("Failed to list zones of {}", config.region()))?;
            for zone in zones.iter() {
                println!("{zone}");
            }
        }
    }

    Ok(())
}

/// Handle the metric command
async fn handle_metric(config: &config::Config, args: MetricArgs) -> Result<()> {
    let metric = CatalogMetric::lookup(args.kind, &args.name)?;

    let mut change = MetricChange::new();
    if let Some(statistic) = args.statistic {
        change = change.with_statistic(statistic);
    }
    if let Some(period) = args.period {
        change = change.with_period(Duration::from_secs(period));
    }
    if let Some(unit) = args.unit {
        change = change.with_unit(unit);
    }

    let load_balancer = args
        .load_balancer_arn
        .as_deref()
        .map(LoadBalancer::from_arn)
        .transpose()
        .context("Invalid --load-balancer-arn")?
        .map(Arc::new);

    if let Some(lb) = &load_balancer {
        if lb.kind() != args.kind {
            warn!(
                load_balancer = %lb.raw(),
                metric_kind = %args.kind,
                "Load balancer kind does not match metric namespace"
            );
        }
    }

    change = match (load_balancer, args.target_group_arn.as_deref()) {
        (Some(lb), Some(tg_arn)) => {
            let tg = TargetGroup::from_arn(tg_arn, Arc::clone(&lb))
                .context("Invalid --target-group-arn")?;
            change.with_load_balancer(lb).with_target_group(tg)
        }
        (Some(lb), None) => change.with_load_balancer(lb),
        (None, Some(tg_arn)) => change.with_target_group(
            RawHandle::from_arn(tg_arn).context("Invalid --target-group-arn")?,
        ),
        (None, None) => change,
    };

    if let Some(zone) = args.availability_zone {
        change = change.with_availability_zone(zone);
    } else if let Some(index) = args.zone_index {
        let aws = aws_context(config).await;
        let zone = global_zone_cache(&aws, &config.zones)
            .zone(index)
            .await
            .with_context(|| format!("No availability zone at index {index}"))?;
        change = change.with_availability_zone(zone);
    }

    let descriptor = metric
        .metric(&change)
        .with_context(|| format!("Failed to build {} metric {}", args.kind, metric.name()))?;

    // Reject descriptors CloudWatch would refuse (unknown unit, fractional period)
    to_metric_stat(&descriptor, DEFAULT_PERIOD)
        .with_context(|| format!("{} is not a valid CloudWatch query", metric.name()))?;

    println!("{}", serde_json::to_string_pretty(&descriptor)?);

    Ok(())
}

/// Handle the catalog command
fn handle_catalog(kind: LoadBalancerKind) {
    println!("{:<40} {:<18}", "METRIC", "DEFAULT STATISTIC");
    println!("{}", "-".repeat(58));
    for metric in CatalogMetric::all(kind) {
        let statistic = metric
            .default_statistic()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:<40} {:<18}", metric.name(), statistic);
    }
    println!("\nNamespace: {}", kind.namespace());
}
