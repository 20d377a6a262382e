//! Resource Registry - Load listing definitions from JSON
//!
//! Every inventoried resource kind is described by an embedded JSON entry:
//! which service and SDK method list it, where the records sit in a response
//! page, and how the pagination token travels between requests.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded resource JSON files (compiled into the binary)
const RESOURCE_FILES: &[&str] = &[include_str!("../resources/inventory.json")];

/// Registry key of the CloudWatch namespace listing
pub const CLOUDWATCH_NAMESPACES: &str = "cloudwatch-namespaces";
/// Registry key of the EC2 instance listing
pub const EC2_INSTANCES: &str = "ec2-instances";
/// Registry key of the RDS instance listing
pub const RDS_INSTANCES: &str = "rds-instances";
/// Registry key of the ECS cluster listing
pub const ECS_CLUSTERS: &str = "ecs-clusters";
/// Registry key of the Lambda function listing
pub const LAMBDA_FUNCTIONS: &str = "lambda-functions";

/// Follow-up describe call for listings that only return identifiers
#[derive(Debug, Clone, Deserialize)]
pub struct DetailDef {
    pub sdk_method: String,
    pub response_path: String,
    /// Parameter carrying the batch of identifiers
    pub id_param: String,
    /// Maximum identifiers the service accepts per describe call
    pub batch_size: usize,
}

/// Resource definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDef {
    pub display_name: String,
    pub service: String,
    pub sdk_method: String,
    /// Dot path to the record array inside a response page
    pub response_path: String,
    /// Nested array inside each element of `response_path` (e.g. reservation -> instances)
    #[serde(default)]
    pub item_path: Option<String>,
    /// Request parameter that carries the page token
    pub token_param: String,
    /// Dot path to the next page token in a response
    pub next_token_path: String,
    #[serde(default)]
    pub detail: Option<DetailDef>,
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub resources: HashMap<String, ResourceDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<ResourceConfig> = OnceLock::new();

/// Get the resource registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static ResourceConfig {
    REGISTRY.get_or_init(|| {
        let mut final_config = ResourceConfig {
            resources: HashMap::new(),
        };

        for content in RESOURCE_FILES {
            let partial: ResourceConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded resource JSON: {}", e));
            final_config.resources.extend(partial.resources);
        }

        final_config
    })
}

/// Get a resource definition by key
pub fn get_resource(key: &str) -> Option<&'static ResourceDef> {
    get_registry().resources.get(key)
}
