//! AWS Client
//!
//! Builds region-scoped service clients on top of one loaded session.

use super::auth::AwsSession;

/// Maximum length of an error message kept in diagnostics
const MAX_ERROR_LENGTH: usize = 300;

/// Factory for region-scoped AWS service clients
#[derive(Clone)]
pub struct AwsClient {
    session: AwsSession,
}

impl AwsClient {
    pub fn new(session: AwsSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &AwsSession {
        &self.session
    }

    pub fn sts(&self, region: &str) -> aws_sdk_sts::Client {
        let config = aws_sdk_sts::config::Builder::from(self.session.sdk_config())
            .region(aws_sdk_sts::config::Region::new(region.to_string()))
            .build();
        aws_sdk_sts::Client::from_conf(config)
    }

    pub fn ec2(&self, region: &str) -> aws_sdk_ec2::Client {
        let config = aws_sdk_ec2::config::Builder::from(self.session.sdk_config())
            .region(aws_sdk_ec2::config::Region::new(region.to_string()))
            .build();
        aws_sdk_ec2::Client::from_conf(config)
    }

    pub fn rds(&self, region: &str) -> aws_sdk_rds::Client {
        let config = aws_sdk_rds::config::Builder::from(self.session.sdk_config())
            .region(aws_sdk_rds::config::Region::new(region.to_string()))
            .build();
        aws_sdk_rds::Client::from_conf(config)
    }

    pub fn ecs(&self, region: &str) -> aws_sdk_ecs::Client {
        let config = aws_sdk_ecs::config::Builder::from(self.session.sdk_config())
            .region(aws_sdk_ecs::config::Region::new(region.to_string()))
            .build();
        aws_sdk_ecs::Client::from_conf(config)
    }

    pub fn lambda(&self, region: &str) -> aws_sdk_lambda::Client {
        let config = aws_sdk_lambda::config::Builder::from(self.session.sdk_config())
            .region(aws_sdk_lambda::config::Region::new(region.to_string()))
            .build();
        aws_sdk_lambda::Client::from_conf(config)
    }

    pub fn cloudwatch(&self, region: &str) -> aws_sdk_cloudwatch::Client {
        let config = aws_sdk_cloudwatch::config::Builder::from(self.session.sdk_config())
            .region(aws_sdk_cloudwatch::config::Region::new(region.to_string()))
            .build();
        aws_sdk_cloudwatch::Client::from_conf(config)
    }
}

/// Format an AWS API error for a diagnostic line
///
/// Well-known error codes get a short hint in front; the (truncated) error
/// chain is always kept so the region log names the actual failure.
pub fn format_aws_error(error: &anyhow::Error) -> String {
    let error_str = format!("{:#}", error);

    let hint = if contains_any(
        &error_str,
        &["AccessDenied", "UnauthorizedOperation", "AuthorizationError", "not authorized"],
    ) {
        Some("Permission denied. Check your IAM permissions.")
    } else if contains_any(&error_str, &["OptInRequired", "AuthFailure"]) {
        Some("Region is not enabled for this account.")
    } else if contains_any(
        &error_str,
        &["ExpiredToken", "InvalidClientTokenId", "UnrecognizedClient", "SignatureDoesNotMatch"],
    ) {
        Some("Credentials were rejected. Refresh your AWS credentials.")
    } else if contains_any(
        &error_str,
        &["Throttling", "RequestLimitExceeded", "TooManyRequests", "Rate exceeded"],
    ) {
        Some("Rate limit exceeded.")
    } else if contains_any(&error_str, &["dispatch failure", "timed out", "timeout"]) {
        Some("Could not reach the service endpoint.")
    } else {
        None
    };

    let detail = truncate(&error_str);
    match hint {
        Some(hint) => format!("{} ({})", hint, detail),
        None => detail,
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn truncate(message: &str) -> String {
    let cleaned: String = message
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    if cleaned.chars().count() > MAX_ERROR_LENGTH {
        let head: String = cleaned.chars().take(MAX_ERROR_LENGTH).collect();
        format!("{}...", head)
    } else {
        cleaned
    }
}
