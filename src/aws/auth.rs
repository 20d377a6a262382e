//! AWS Authentication
//!
//! Credentials come from the SDK's standard provider chain (environment,
//! shared config/profile, SSO, container and instance metadata). Nothing here
//! reads credentials itself; the loaded session is handed to every component.

use crate::resource::{str_at, SdkDispatch};
use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_sts::config::Region;
use serde_json::{json, Value};

/// Region used when neither the caller nor the SDK chain configures one
pub const FALLBACK_REGION: &str = "us-east-1";

/// Loaded SDK configuration: credential provider plus default region
#[derive(Clone)]
pub struct AwsSession {
    sdk_config: SdkConfig,
}

impl AwsSession {
    /// Load the session from the standard chain, optionally pinning the region
    pub async fn load(region_override: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region_override {
            loader = loader.region(Region::new(region.to_string()));
        }

        let sdk_config = loader.load().await;
        tracing::debug!("AWS session loaded, default region: {:?}", sdk_config.region());

        Self { sdk_config }
    }

    /// Region configured for the session, if any
    pub fn default_region(&self) -> Option<String> {
        self.sdk_config.region().map(|r| r.to_string())
    }

    pub fn sdk_config(&self) -> &SdkConfig {
        &self.sdk_config
    }
}

/// Identity returned by STS for the active credentials
#[derive(Debug, Clone, PartialEq)]
pub struct CallerIdentity {
    pub account: String,
    pub arn: String,
    pub user_id: String,
}

impl From<&Value> for CallerIdentity {
    fn from(value: &Value) -> Self {
        Self {
            account: str_at(value, "Account").unwrap_or("-").to_string(),
            arn: str_at(value, "Arn").unwrap_or_default().to_string(),
            user_id: str_at(value, "UserId").unwrap_or("-").to_string(),
        }
    }
}

/// Verify the active credentials against STS
pub async fn verify_identity(dispatch: &dyn SdkDispatch, region: &str) -> Result<CallerIdentity> {
    let response = dispatch
        .invoke("sts", "get_caller_identity", region, &json!({}))
        .await
        .context("Could not authenticate with AWS. Please check your credentials")?;

    let identity = CallerIdentity::from(&response);
    if identity.arn.is_empty() {
        anyhow::bail!("Identity verification returned no caller ARN");
    }

    Ok(identity)
}
