//! AWS Regions
//!
//! Lists the regions enabled for the account. Listing never fails the run:
//! when it does not work, the session's default region stands in.

use super::auth::FALLBACK_REGION;
use super::client::format_aws_error;
use crate::resource::{str_at, SdkDispatch};
use anyhow::Result;
use serde_json::{json, Value};

/// Region the directory call is sent to
pub const ANCHOR_REGION: &str = "us-east-1";

/// List enabled region names in API order
pub async fn list_regions(dispatch: &dyn SdkDispatch, anchor_region: &str) -> Result<Vec<String>> {
    let response = dispatch
        .invoke("ec2", "describe_regions", anchor_region, &json!({}))
        .await?;

    let regions = response
        .get("Regions")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|r| str_at(r, "RegionName"))
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default();

    Ok(regions)
}

/// Resolve the regions to scan; always returns at least one region
pub async fn resolve_regions(
    dispatch: &dyn SdkDispatch,
    anchor_region: &str,
    default_region: Option<&str>,
) -> Vec<String> {
    let fallback = || vec![default_region.unwrap_or(FALLBACK_REGION).to_string()];

    match list_regions(dispatch, anchor_region).await {
        Ok(regions) if !regions.is_empty() => {
            tracing::info!("Loaded {} regions", regions.len());
            regions
        },
        Ok(_) => {
            let regions = fallback();
            tracing::warn!(
                "No regions returned, falling back to default region: {}",
                regions[0]
            );
            regions
        },
        Err(e) => {
            let regions = fallback();
            tracing::error!("Error getting regions: {}", format_aws_error(&e));
            tracing::warn!("Falling back to default region: {}", regions[0]);
            regions
        },
    }
}
