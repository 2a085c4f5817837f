//! AWS error classification and handling
//!
//! Provides typed errors for AWS SDK operations using the `.code()` method
//! instead of string matching on Debug format.

use thiserror::Error;

/// AWS error categories for retry decisions and user-facing hints
#[derive(Debug, Error)]
pub enum AwsError {
    /// Rate limit exceeded (retryable with backoff)
    #[error("Rate limit exceeded")]
    Throttled,

    /// Credentials missing, expired or lacking permission
    #[error("Access denied: {message}")]
    AccessDenied { code: String, message: String },

    /// Region is unknown or not enabled for this account
    #[error("Region not available: {message}")]
    RegionUnavailable { message: String },

    /// Generic AWS SDK error with code and message
    #[error("AWS error: {message}")]
    Sdk {
        code: Option<String>,
        message: String,
    },
}

impl AwsError {
    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        matches!(self, AwsError::Throttled)
    }

    /// Check if this is a credentials / permissions error
    pub fn is_access_denied(&self) -> bool {
        matches!(self, AwsError::AccessDenied { .. })
    }

    /// Get a user-friendly suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            AwsError::AccessDenied { code, .. } => suggestion_for_code(code),
            AwsError::RegionUnavailable { .. } => suggestion_for_code("OptInRequired"),
            AwsError::Throttled => suggestion_for_code("Throttling"),
            AwsError::Sdk { code: Some(c), .. } => suggestion_for_code(c),
            AwsError::Sdk { code: None, .. } => None,
        }
    }
}

/// Known AWS error codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &["Throttling", "ThrottlingException", "RequestLimitExceeded"];

/// Known AWS error codes for authentication / authorization failures
const ACCESS_DENIED_CODES: &[&str] = &[
    "AuthFailure",
    "UnauthorizedOperation",
    "AccessDenied",
    "AccessDeniedException",
    "ExpiredToken",
    "InvalidClientTokenId",
];

/// Known AWS error codes for unusable regions
const REGION_CODES: &[&str] = &["OptInRequired", "InvalidRegion"];

/// Classify an AWS SDK error using the error code.
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>) -> AwsError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if THROTTLING_CODES.contains(&c) => AwsError::Throttled,
        Some(c) if ACCESS_DENIED_CODES.contains(&c) => AwsError::AccessDenied {
            code: c.to_string(),
            message,
        },
        Some(c) if REGION_CODES.contains(&c) => AwsError::RegionUnavailable { message },
        _ => AwsError::Sdk {
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

/// Classify an error from an anyhow::Error by extracting the AWS error code.
///
/// Walks the error chain looking for the SDK errors this crate produces and
/// reads `.code()` / `.message()` through `ProvideErrorMetadata`. Falls back
/// to scanning the Debug representation if no typed error is found.
pub fn classify_anyhow_error(error: &anyhow::Error) -> AwsError {
    use aws_sdk_ec2::error::ProvideErrorMetadata;

    for cause in error.chain() {
        if let Some(e) = cause.downcast_ref::<aws_sdk_ec2::error::SdkError<
            aws_sdk_ec2::operation::describe_availability_zones::DescribeAvailabilityZonesError,
        >>() {
            let meta = ProvideErrorMetadata::meta(e);
            return classify_aws_error(meta.code(), meta.message());
        }
    }

    let debug_str = format!("{:?}", error);
    if let Some(code) = extract_error_code(&debug_str) {
        return classify_aws_error(Some(&code), Some(&error.to_string()));
    }

    AwsError::Sdk {
        code: None,
        message: error.to_string(),
    }
}

/// Extract an AWS error code from a debug string representation
fn extract_error_code(debug_str: &str) -> Option<String> {
    let known = THROTTLING_CODES
        .iter()
        .chain(ACCESS_DENIED_CODES)
        .chain(REGION_CODES);
    for code in known {
        if debug_str.contains(code) {
            return Some((*code).to_string());
        }
    }

    // Try to extract any code from `code: Some("...")` pattern
    if let Some(start) = debug_str.find("code: Some(\"") {
        let rest = &debug_str[start + 12..];
        if let Some(end) = rest.find('"') {
            return Some(rest[..end].to_string());
        }
    }

    None
}

/// Error code to user-friendly suggestion mapping
const SUGGESTIONS: &[(&str, &str)] = &[
    (
        "AuthFailure",
        "Check that AWS credentials are configured (AWS_PROFILE, env vars or SSO login).",
    ),
    (
        "UnauthorizedOperation",
        "Grant ec2:DescribeAvailabilityZones to the calling identity.",
    ),
    (
        "AccessDenied",
        "Grant ec2:DescribeAvailabilityZones to the calling identity.",
    ),
    (
        "AccessDeniedException",
        "Grant ec2:DescribeAvailabilityZones to the calling identity.",
    ),
    (
        "ExpiredToken",
        "Session credentials expired. Refresh them (e.g. aws sso login) and retry.",
    ),
    (
        "InvalidClientTokenId",
        "The access key is not recognised. Check AWS_ACCESS_KEY_ID or the selected profile.",
    ),
    (
        "OptInRequired",
        "Enable the region for this account or pick another region with --region.",
    ),
    (
        "InvalidRegion",
        "Enable the region for this account or pick another region with --region.",
    ),
    (
        "Throttling",
        "AWS API rate limit hit. The lookup is retried automatically.",
    ),
    (
        "ThrottlingException",
        "AWS API rate limit hit. The lookup is retried automatically.",
    ),
    (
        "RequestLimitExceeded",
        "AWS API rate limit hit. The lookup is retried automatically.",
    ),
];

/// Get a user-friendly suggestion for a known error code.
fn suggestion_for_code(code: &str) -> Option<String> {
    SUGGESTIONS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, s)| (*s).to_string())
}
