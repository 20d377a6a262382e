//! SDK Dispatch
//!
//! Maps (service, method) names to region-scoped AWS SDK calls and renders
//! every response as a JSON page in the service's wire field naming.

use crate::aws::client::AwsClient;
use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_ec2::error::DisplayErrorContext;
use aws_sdk_ec2::primitives::{DateTime, DateTimeFormat};
use serde_json::{json, Value};

/// Invokes one provider API operation in one region.
///
/// Implemented by [`AwsClient`] for real accounts; anything that can answer
/// with JSON pages (an in-memory fake in tests) can stand in for it.
#[async_trait]
pub trait SdkDispatch: Send + Sync {
    async fn invoke(
        &self,
        service: &str,
        method: &str,
        region: &str,
        params: &Value,
    ) -> Result<Value>;
}

#[async_trait]
impl SdkDispatch for AwsClient {
    async fn invoke(
        &self,
        service: &str,
        method: &str,
        region: &str,
        params: &Value,
    ) -> Result<Value> {
        tracing::debug!(
            "invoke_sdk: service={}, method={}, region={}",
            service,
            method,
            region
        );

        match service {
            "sts" => invoke_sts(method, self, region).await,
            "ec2" => invoke_ec2(method, self, region, params).await,
            "rds" => invoke_rds(method, self, region, params).await,
            "ecs" => invoke_ecs(method, self, region, params).await,
            "lambda" => invoke_lambda(method, self, region, params).await,
            "cloudwatch" => invoke_cloudwatch(method, self, region, params).await,
            _ => Err(anyhow::anyhow!("Unknown service: {}", service)),
        }
    }
}

// =============================================================================
// STS
// =============================================================================

async fn invoke_sts(method: &str, client: &AwsClient, region: &str) -> Result<Value> {
    match method {
        "get_caller_identity" => {
            let output = client
                .sts(region)
                .get_caller_identity()
                .send()
                .await
                .map_err(|e| sdk_error("sts:GetCallerIdentity", e))?;

            Ok(json!({
                "Account": output.account(),
                "Arn": output.arn(),
                "UserId": output.user_id(),
            }))
        },
        _ => Err(anyhow::anyhow!("Unknown sts method: {}", method)),
    }
}

// =============================================================================
// EC2
// =============================================================================

async fn invoke_ec2(method: &str, client: &AwsClient, region: &str, params: &Value) -> Result<Value> {
    let ec2 = client.ec2(region);

    match method {
        "describe_regions" => {
            let output = ec2
                .describe_regions()
                .send()
                .await
                .map_err(|e| sdk_error("ec2:DescribeRegions", e))?;

            let regions: Vec<Value> = output
                .regions()
                .iter()
                .map(|r| {
                    json!({
                        "RegionName": r.region_name(),
                        "Endpoint": r.endpoint(),
                        "OptInStatus": r.opt_in_status(),
                    })
                })
                .collect();

            Ok(json!({ "Regions": regions }))
        },
        "describe_instances" => {
            let output = ec2
                .describe_instances()
                .set_next_token(get_param_str_opt(params, "NextToken"))
                .send()
                .await
                .map_err(|e| sdk_error("ec2:DescribeInstances", e))?;

            let reservations: Vec<Value> = output
                .reservations()
                .iter()
                .map(|reservation| {
                    let instances: Vec<Value> = reservation
                        .instances()
                        .iter()
                        .map(|instance| {
                            let tags: Vec<Value> = instance
                                .tags()
                                .iter()
                                .map(|tag| json!({ "Key": tag.key(), "Value": tag.value() }))
                                .collect();

                            json!({
                                "InstanceId": instance.instance_id(),
                                "InstanceType": instance.instance_type().map(|t| t.as_str()),
                                "State": {
                                    "Name": instance.state().and_then(|s| s.name()).map(|n| n.as_str()),
                                },
                                "PrivateIpAddress": instance.private_ip_address(),
                                "PublicIpAddress": instance.public_ip_address(),
                                "VpcId": instance.vpc_id(),
                                "LaunchTime": instance.launch_time().and_then(format_timestamp),
                                "Tags": tags,
                            })
                        })
                        .collect();

                    json!({
                        "ReservationId": reservation.reservation_id(),
                        "Instances": instances,
                    })
                })
                .collect();

            Ok(json!({
                "Reservations": reservations,
                "NextToken": output.next_token(),
            }))
        },
        _ => Err(anyhow::anyhow!("Unknown ec2 method: {}", method)),
    }
}

// =============================================================================
// RDS
// =============================================================================

async fn invoke_rds(method: &str, client: &AwsClient, region: &str, params: &Value) -> Result<Value> {
    match method {
        "describe_db_instances" => {
            let output = client
                .rds(region)
                .describe_db_instances()
                .set_marker(get_param_str_opt(params, "Marker"))
                .send()
                .await
                .map_err(|e| sdk_error("rds:DescribeDBInstances", e))?;

            let instances: Vec<Value> = output
                .db_instances()
                .iter()
                .map(|db| {
                    json!({
                        "DBInstanceIdentifier": db.db_instance_identifier(),
                        "Engine": db.engine(),
                        "DBInstanceClass": db.db_instance_class(),
                        "DBInstanceStatus": db.db_instance_status(),
                        "AllocatedStorage": db.allocated_storage(),
                        "Endpoint": {
                            "Address": db.endpoint().and_then(|e| e.address()),
                        },
                    })
                })
                .collect();

            Ok(json!({
                "DBInstances": instances,
                "Marker": output.marker(),
            }))
        },
        _ => Err(anyhow::anyhow!("Unknown rds method: {}", method)),
    }
}

// =============================================================================
// ECS
// =============================================================================

async fn invoke_ecs(method: &str, client: &AwsClient, region: &str, params: &Value) -> Result<Value> {
    let ecs = client.ecs(region);

    match method {
        "list_clusters" => {
            let output = ecs
                .list_clusters()
                .set_next_token(get_param_str_opt(params, "nextToken"))
                .send()
                .await
                .map_err(|e| sdk_error("ecs:ListClusters", e))?;

            Ok(json!({
                "clusterArns": output.cluster_arns(),
                "nextToken": output.next_token(),
            }))
        },
        "describe_clusters" => {
            let cluster_arns = get_param_str_list(params, "clusters");
            let output = ecs
                .describe_clusters()
                .set_clusters(Some(cluster_arns))
                .send()
                .await
                .map_err(|e| sdk_error("ecs:DescribeClusters", e))?;

            for failure in output.failures() {
                tracing::warn!(
                    "ECS could not describe {} in {}: {}",
                    failure.arn().unwrap_or("-"),
                    region,
                    failure.reason().unwrap_or("unknown reason")
                );
            }

            let clusters: Vec<Value> = output
                .clusters()
                .iter()
                .map(|cluster| {
                    json!({
                        "clusterArn": cluster.cluster_arn(),
                        "clusterName": cluster.cluster_name(),
                        "status": cluster.status(),
                        "activeServicesCount": cluster.active_services_count(),
                        "runningTasksCount": cluster.running_tasks_count(),
                        "pendingTasksCount": cluster.pending_tasks_count(),
                        "registeredContainerInstancesCount": cluster.registered_container_instances_count(),
                    })
                })
                .collect();

            Ok(json!({ "clusters": clusters }))
        },
        _ => Err(anyhow::anyhow!("Unknown ecs method: {}", method)),
    }
}

// =============================================================================
// Lambda
// =============================================================================

async fn invoke_lambda(method: &str, client: &AwsClient, region: &str, params: &Value) -> Result<Value> {
    match method {
        "list_functions" => {
            let output = client
                .lambda(region)
                .list_functions()
                .set_marker(get_param_str_opt(params, "Marker"))
                .send()
                .await
                .map_err(|e| sdk_error("lambda:ListFunctions", e))?;

            let functions: Vec<Value> = output
                .functions()
                .iter()
                .map(|function| {
                    json!({
                        "FunctionName": function.function_name(),
                        "Runtime": function.runtime().map(|r| r.as_str()),
                        "MemorySize": function.memory_size(),
                        "Timeout": function.timeout(),
                        "LastModified": function.last_modified(),
                    })
                })
                .collect();

            Ok(json!({
                "Functions": functions,
                "NextMarker": output.next_marker(),
            }))
        },
        _ => Err(anyhow::anyhow!("Unknown lambda method: {}", method)),
    }
}

// =============================================================================
// CloudWatch
// =============================================================================

async fn invoke_cloudwatch(
    method: &str,
    client: &AwsClient,
    region: &str,
    params: &Value,
) -> Result<Value> {
    match method {
        "list_metrics" => {
            let output = client
                .cloudwatch(region)
                .list_metrics()
                .set_next_token(get_param_str_opt(params, "NextToken"))
                .send()
                .await
                .map_err(|e| sdk_error("cloudwatch:ListMetrics", e))?;

            let metrics: Vec<Value> = output
                .metrics()
                .iter()
                .map(|metric| {
                    json!({
                        "Namespace": metric.namespace(),
                        "MetricName": metric.metric_name(),
                    })
                })
                .collect();

            Ok(json!({
                "Metrics": metrics,
                "NextToken": output.next_token(),
            }))
        },
        _ => Err(anyhow::anyhow!("Unknown cloudwatch method: {}", method)),
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Render an SDK error with its service code and message, not just "service error"
fn sdk_error<E: std::error::Error>(operation: &str, err: E) -> anyhow::Error {
    anyhow::anyhow!("{} failed: {}", operation, DisplayErrorContext(&err))
}

fn format_timestamp(timestamp: &DateTime) -> Option<String> {
    timestamp.fmt(DateTimeFormat::DateTime).ok()
}

fn get_param_str_opt(params: &Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn get_param_str_list(params: &Value, key: &str) -> Vec<String> {
    match params.get(key) {
        Some(Value::Array(arr)) => arr
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.to_string())
            .collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}
