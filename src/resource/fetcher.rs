//! Resource Fetcher
//!
//! Handles fetching resources from AWS APIs based on resource definitions.

use super::registry::{get_resource, ResourceDef};
use super::sdk_dispatch::SdkDispatch;
use anyhow::{Context, Result};
use serde_json::{Map, Value};

/// Result of paginated fetch
pub struct PaginatedResult {
    pub items: Vec<Value>,
    pub next_token: Option<String>,
}

/// Look up a registry entry or fail with the unknown key
pub fn resource_def(resource_key: &str) -> Result<&'static ResourceDef> {
    get_resource(resource_key).with_context(|| format!("Unknown resource: {}", resource_key))
}

/// Fetch all resources of one kind in one region (auto-paginate)
pub async fn fetch_resources(
    resource_key: &str,
    dispatch: &dyn SdkDispatch,
    region: &str,
) -> Result<Vec<Value>> {
    let resource_def = resource_def(resource_key)?;

    let mut all_items = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let result =
            fetch_resources_paginated(resource_def, dispatch, region, page_token.as_deref())
                .await?;
        all_items.extend(result.items);

        match result.next_token {
            // Stop if the service hands back the token we just sent
            Some(token) if page_token.as_deref() != Some(token.as_str()) => {
                page_token = Some(token);
            },
            _ => break,
        }
    }

    tracing::debug!(
        "Fetched {} {} in {}",
        all_items.len(),
        resource_def.display_name,
        region
    );

    Ok(all_items)
}

/// Fetch one page of resources
pub async fn fetch_resources_paginated(
    resource_def: &ResourceDef,
    dispatch: &dyn SdkDispatch,
    region: &str,
    page_token: Option<&str>,
) -> Result<PaginatedResult> {
    let mut params = Map::new();
    if let Some(token) = page_token {
        params.insert(
            resource_def.token_param.clone(),
            Value::String(token.to_string()),
        );
    }

    let response = dispatch
        .invoke(
            &resource_def.service,
            &resource_def.sdk_method,
            region,
            &Value::Object(params),
        )
        .await?;

    let items = extract_items(
        &response,
        &resource_def.response_path,
        resource_def.item_path.as_deref(),
    );

    let next_token = str_at(&response, &resource_def.next_token_path)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    Ok(PaginatedResult { items, next_token })
}

/// Describe identifiers through the resource's detail call, at most
/// `batch_size` identifiers per request
pub async fn describe_in_batches(
    resource_def: &ResourceDef,
    dispatch: &dyn SdkDispatch,
    region: &str,
    ids: &[String],
) -> Result<Vec<Value>> {
    let detail = resource_def
        .detail
        .as_ref()
        .with_context(|| format!("{} has no describe call", resource_def.display_name))?;

    let mut described = Vec::with_capacity(ids.len());

    for batch in ids.chunks(detail.batch_size.max(1)) {
        let mut params = Map::new();
        params.insert(
            detail.id_param.clone(),
            Value::Array(batch.iter().cloned().map(Value::String).collect()),
        );

        let response = dispatch
            .invoke(
                &resource_def.service,
                &detail.sdk_method,
                region,
                &Value::Object(params),
            )
            .await?;

        described.extend(extract_items(&response, &detail.response_path, None));
    }

    Ok(described)
}

/// Extract items from response using the response_path, flattening one
/// nested level when `item_path` is set
pub fn extract_items(response: &Value, path: &str, item_path: Option<&str>) -> Vec<Value> {
    let Some(items) = lookup(response, path).and_then(|v| v.as_array()) else {
        return vec![];
    };

    match item_path {
        None => items.clone(),
        Some(nested) => items
            .iter()
            .filter_map(|outer| lookup(outer, nested).and_then(|v| v.as_array()))
            .flat_map(|inner| inner.iter().cloned())
            .collect(),
    }
}

/// Walk a dot-notation path; numeric segments index into arrays
pub fn lookup<'a>(item: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(item);
    }

    let mut current = item;
    for part in path.split('.') {
        current = match part.parse::<usize>() {
            Ok(idx) => current.get(idx)?,
            Err(_) => current.get(part)?,
        };
    }

    match current {
        Value::Null => None,
        other => Some(other),
    }
}

/// String at a dot path; absent, null and non-string values are `None`
pub fn str_at<'a>(item: &'a Value, path: &str) -> Option<&'a str> {
    lookup(item, path).and_then(|v| v.as_str())
}

/// Integer at a dot path; numeric strings are accepted as well
pub fn i64_at(item: &Value, path: &str) -> Option<i64> {
    match lookup(item, path)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
