//! Named ELBv2 metrics and their default statistics
//!
//! See the ELB documentation for what each metric measures:
//! <https://docs.aws.amazon.com/elasticloadbalancing/latest/application/load-balancer-cloudwatch-metrics.html>
//! <https://docs.aws.amazon.com/elasticloadbalancing/latest/network/load-balancer-cloudwatch-metrics.html>
//!
//! Each entry only supplies a name and a default statistic; the caller's
//! [`MetricChange`] always wins over the default.

use crate::change::MetricChange;
use crate::descriptor::{self, MetricDescriptor};
use crate::dimensions::DimensionError;
use crate::handle::LoadBalancerKind;
use crate::metrics::{APPLICATION_NAMESPACE, NETWORK_NAMESPACE};
use crate::statistic::Statistic;
use std::str::FromStr;
use thiserror::Error;

/// Unknown metric name for a load balancer kind
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} load balancer metric '{name}'")]
pub struct UnknownMetric {
    pub kind: LoadBalancerKind,
    pub name: String,
}

/// `AWS/ApplicationELB` metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplicationMetric {
    ActiveConnectionCount,
    ClientTlsNegotiationErrorCount,
    ConsumedLcus,
    HttpFixedResponseCount,
    HttpRedirectCount,
    HttpRedirectUrlLimitExceededCount,
    HttpCodeElb3xxCount,
    HttpCodeElb4xxCount,
    HttpCodeElb5xxCount,
    HttpCodeElb500Count,
    HttpCodeElb502Count,
    HttpCodeElb503Count,
    HttpCodeElb504Count,
    Ipv6ProcessedBytes,
    Ipv6RequestCount,
    NewConnectionCount,
    ProcessedBytes,
    RejectedConnectionCount,
    RequestCount,
    RuleEvaluations,
    // Target group metrics
    HealthyHostCount,
    HttpCodeTarget2xxCount,
    HttpCodeTarget3xxCount,
    HttpCodeTarget4xxCount,
    HttpCodeTarget5xxCount,
    NonStickyRequestCount,
    RequestCountPerTarget,
    TargetConnectionErrorCount,
    TargetResponseTime,
    TargetTlsNegotiationErrorCount,
    UnHealthyHostCount,
}

impl ApplicationMetric {
    pub const ALL: [ApplicationMetric; 31] = [
        ApplicationMetric::ActiveConnectionCount,
        ApplicationMetric::ClientTlsNegotiationErrorCount,
        ApplicationMetric::ConsumedLcus,
        ApplicationMetric::HttpFixedResponseCount,
        ApplicationMetric::HttpRedirectCount,
        ApplicationMetric::HttpRedirectUrlLimitExceededCount,
        ApplicationMetric::HttpCodeElb3xxCount,
        ApplicationMetric::HttpCodeElb4xxCount,
        ApplicationMetric::HttpCodeElb5xxCount,
        ApplicationMetric::HttpCodeElb500Count,
        ApplicationMetric::HttpCodeElb502Count,
        ApplicationMetric::HttpCodeElb503Count,
        ApplicationMetric::HttpCodeElb504Count,
        ApplicationMetric::Ipv6ProcessedBytes,
        ApplicationMetric::Ipv6RequestCount,
        ApplicationMetric::NewConnectionCount,
        ApplicationMetric::ProcessedBytes,
        ApplicationMetric::RejectedConnectionCount,
        ApplicationMetric::RequestCount,
        ApplicationMetric::RuleEvaluations,
        ApplicationMetric::HealthyHostCount,
        ApplicationMetric::HttpCodeTarget2xxCount,
        ApplicationMetric::HttpCodeTarget3xxCount,
        ApplicationMetric::HttpCodeTarget4xxCount,
        ApplicationMetric::HttpCodeTarget5xxCount,
        ApplicationMetric::NonStickyRequestCount,
        ApplicationMetric::RequestCountPerTarget,
        ApplicationMetric::TargetConnectionErrorCount,
        ApplicationMetric::TargetResponseTime,
        ApplicationMetric::TargetTlsNegotiationErrorCount,
        ApplicationMetric::UnHealthyHostCount,
    ];

    /// CloudWatch metric name
    pub fn name(self) -> &'static str {
        use ApplicationMetric::*;
        match self {
            ActiveConnectionCount => "ActiveConnectionCount",
            ClientTlsNegotiationErrorCount => "ClientTLSNegotiationErrorCount",
            ConsumedLcus => "ConsumedLCUs",
            HttpFixedResponseCount => "HTTP_Fixed_Response_Count",
            HttpRedirectCount => "HTTP_Redirect_Count",
            HttpRedirectUrlLimitExceededCount => "HTTP_Redirect_Url_Limit_Exceeded_Count",
            HttpCodeElb3xxCount => "HTTPCode_ELB_3XX_Count",
            HttpCodeElb4xxCount => "HTTPCode_ELB_4XX_Count",
            HttpCodeElb5xxCount => "HTTPCode_ELB_5XX_Count",
            HttpCodeElb500Count => "HTTPCode_ELB_500_Count",
            HttpCodeElb502Count => "HTTPCode_ELB_502_Count",
            HttpCodeElb503Count => "HTTPCode_ELB_503_Count",
            HttpCodeElb504Count => "HTTPCode_ELB_504_Count",
            Ipv6ProcessedBytes => "IPv6ProcessedBytes",
            Ipv6RequestCount => "IPv6RequestCount",
            NewConnectionCount => "NewConnectionCount",
            ProcessedBytes => "ProcessedBytes",
            RejectedConnectionCount => "RejectedConnectionCount",
            RequestCount => "RequestCount",
            RuleEvaluations => "RuleEvaluations",
            HealthyHostCount => "HealthyHostCount",
            HttpCodeTarget2xxCount => "HTTPCode_Target_2XX_Count",
            HttpCodeTarget3xxCount => "HTTPCode_Target_3XX_Count",
            HttpCodeTarget4xxCount => "HTTPCode_Target_4XX_Count",
            HttpCodeTarget5xxCount => "HTTPCode_Target_5XX_Count",
            NonStickyRequestCount => "NonStickyRequestCount",
            RequestCountPerTarget => "RequestCountPerTarget",
            TargetConnectionErrorCount => "TargetConnectionErrorCount",
            TargetResponseTime => "TargetResponseTime",
            TargetTlsNegotiationErrorCount => "TargetTLSNegotiationErrorCount",
            UnHealthyHostCount => "UnHealthyHostCount",
        }
    }

    /// Statistic used when the caller does not pick one
    pub fn default_statistic(self) -> Option<Statistic> {
        use ApplicationMetric::*;
        match self {
            ConsumedLcus | HealthyHostCount | TargetResponseTime | UnHealthyHostCount => None,
            _ => Some(Statistic::Sum),
        }
    }

    /// Build the `AWS/ApplicationELB` descriptor for this metric.
    pub fn metric(self, change: &MetricChange) -> Result<MetricDescriptor, DimensionError> {
        let change = change.clone().or_default_statistic(self.default_statistic());
        descriptor::create(APPLICATION_NAMESPACE, self.name(), &change)
    }
}

impl FromStr for ApplicationMetric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| UnknownMetric {
                kind: LoadBalancerKind::Application,
                name: s.to_string(),
            })
    }
}

/// `AWS/NetworkELB` metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkMetric {
    ActiveFlowCount,
    ActiveFlowCountTls,
    ClientTlsNegotiationErrorCount,
    ConsumedLcus,
    HealthyHostCount,
    NewFlowCount,
    NewFlowCountTls,
    ProcessedBytes,
    ProcessedBytesTls,
    TargetTlsNegotiationErrorCount,
    TcpClientResetCount,
    TcpElbResetCount,
    TcpTargetResetCount,
    UnHealthyHostCount,
}

impl NetworkMetric {
    pub const ALL: [NetworkMetric; 14] = [
        NetworkMetric::ActiveFlowCount,
        NetworkMetric::ActiveFlowCountTls,
        NetworkMetric::ClientTlsNegotiationErrorCount,
        NetworkMetric::ConsumedLcus,
        NetworkMetric::HealthyHostCount,
        NetworkMetric::NewFlowCount,
        NetworkMetric::NewFlowCountTls,
        NetworkMetric::ProcessedBytes,
        NetworkMetric::ProcessedBytesTls,
        NetworkMetric::TargetTlsNegotiationErrorCount,
        NetworkMetric::TcpClientResetCount,
        NetworkMetric::TcpElbResetCount,
        NetworkMetric::TcpTargetResetCount,
        NetworkMetric::UnHealthyHostCount,
    ];

    /// CloudWatch metric name
    pub fn name(self) -> &'static str {
        use NetworkMetric::*;
        match self {
            ActiveFlowCount => "ActiveFlowCount",
            ActiveFlowCountTls => "ActiveFlowCount_TLS",
            ClientTlsNegotiationErrorCount => "ClientTLSNegotiationErrorCount",
            ConsumedLcus => "ConsumedLCUs",
            HealthyHostCount => "HealthyHostCount",
            NewFlowCount => "NewFlowCount",
            NewFlowCountTls => "NewFlowCount_TLS",
            ProcessedBytes => "ProcessedBytes",
            ProcessedBytesTls => "ProcessedBytes_TLS",
            TargetTlsNegotiationErrorCount => "TargetTLSNegotiationErrorCount",
            TcpClientResetCount => "TCP_Client_Reset_Count",
            TcpElbResetCount => "TCP_ELB_Reset_Count",
            TcpTargetResetCount => "TCP_Target_Reset_Count",
            UnHealthyHostCount => "UnHealthyHostCount",
        }
    }

    /// Statistic used when the caller does not pick one
    pub fn default_statistic(self) -> Option<Statistic> {
        use NetworkMetric::*;
        match self {
            ActiveFlowCount | ActiveFlowCountTls | ConsumedLcus => None,
            HealthyHostCount | UnHealthyHostCount => Some(Statistic::Maximum),
            _ => Some(Statistic::Sum),
        }
    }

    /// Build the `AWS/NetworkELB` descriptor for this metric.
    pub fn metric(self, change: &MetricChange) -> Result<MetricDescriptor, DimensionError> {
        let change = change.clone().or_default_statistic(self.default_statistic());
        descriptor::create(NETWORK_NAMESPACE, self.name(), &change)
    }
}

impl FromStr for NetworkMetric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| UnknownMetric {
                kind: LoadBalancerKind::Network,
                name: s.to_string(),
            })
    }
}

/// A catalog metric of either load balancer kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogMetric {
    Application(ApplicationMetric),
    Network(NetworkMetric),
}

impl CatalogMetric {
    /// Look up `name` in the catalog for `kind`.
    pub fn lookup(kind: LoadBalancerKind, name: &str) -> Result<Self, UnknownMetric> {
        match kind {
            LoadBalancerKind::Application => name.parse().map(CatalogMetric::Application),
            LoadBalancerKind::Network => name.parse().map(CatalogMetric::Network),
        }
    }

    /// Every metric published for `kind`
    pub fn all(kind: LoadBalancerKind) -> Vec<Self> {
        match kind {
            LoadBalancerKind::Application => ApplicationMetric::ALL
                .into_iter()
                .map(CatalogMetric::Application)
                .collect(),
            LoadBalancerKind::Network => NetworkMetric::ALL
                .into_iter()
                .map(CatalogMetric::Network)
                .collect(),
        }
    }

    pub fn kind(self) -> LoadBalancerKind {
        match self {
            CatalogMetric::Application(_) => LoadBalancerKind::Application,
            CatalogMetric::Network(_) => LoadBalancerKind::Network,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CatalogMetric::Application(m) => m.name(),
            CatalogMetric::Network(m) => m.name(),
        }
    }

    pub fn default_statistic(self) -> Option<Statistic> {
        match self {
            CatalogMetric::Application(m) => m.default_statistic(),
            CatalogMetric::Network(m) => m.default_statistic(),
        }
    }

    pub fn metric(self, change: &MetricChange) -> Result<MetricDescriptor, DimensionError> {
        match self {
            CatalogMetric::Application(m) => m.metric(change),
            CatalogMetric::Network(m) => m.metric(change),
        }
    }
}
