//! Shared test fixtures: an in-memory `SdkDispatch` and a workbook reader

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use aws_inventory::resource::SdkDispatch;
use calamine::{open_workbook, Data, Reader, Xlsx};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

pub const TEST_ARN: &str = "arn:aws:iam::123456789012:user/auditor";

/// One recorded `invoke`
#[derive(Debug, Clone)]
pub struct Call {
    pub service: String,
    pub method: String,
    pub region: String,
    pub params: Value,
}

/// Canned JSON pages keyed by (service, method, region); `"*"` matches any
/// region. Page N is served when the request carries token `"N"`.
#[derive(Default)]
pub struct FakeDispatch {
    pages: HashMap<(String, String, String), Vec<Value>>,
    failing: Vec<(String, String, String)>,
    calls: Mutex<Vec<Call>>,
}

impl FakeDispatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity and region directory already answered
    pub fn authenticated(regions: &[&str]) -> Self {
        Self::new().with_identity(TEST_ARN).with_regions(regions)
    }

    pub fn with_identity(self, arn: &str) -> Self {
        self.with_pages(
            "sts",
            "get_caller_identity",
            "*",
            vec![json!({ "Account": "123456789012", "Arn": arn, "UserId": "AIDAEXAMPLE" })],
        )
    }

    pub fn with_regions(self, regions: &[&str]) -> Self {
        let regions: Vec<Value> = regions
            .iter()
            .map(|r| json!({ "RegionName": r, "Endpoint": format!("ec2.{}.amazonaws.com", r) }))
            .collect();
        self.with_pages("ec2", "describe_regions", "*", vec![json!({ "Regions": regions })])
    }

    pub fn with_pages(mut self, service: &str, method: &str, region: &str, pages: Vec<Value>) -> Self {
        self.pages
            .insert((service.into(), method.into(), region.into()), pages);
        self
    }

    /// Make (service, method, region) fail; `"*"` matches anything
    pub fn failing(mut self, service: &str, method: &str, region: &str) -> Self {
        self.failing
            .push((service.into(), method.into(), region.into()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, service: &str, method: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.service == service && c.method == method)
            .collect()
    }

    fn is_failing(&self, service: &str, method: &str, region: &str) -> bool {
        let matches = |pattern: &str, value: &str| pattern == "*" || pattern == value;
        self.failing
            .iter()
            .any(|(s, m, r)| s == service && matches(m, method) && matches(r, region))
    }

    fn pages_for(&self, service: &str, method: &str, region: &str) -> Option<&Vec<Value>> {
        self.pages
            .get(&(service.into(), method.into(), region.into()))
            .or_else(|| self.pages.get(&(service.into(), method.into(), "*".into())))
    }
}

fn page_index(params: &Value) -> usize {
    ["NextToken", "Marker", "nextToken"]
        .iter()
        .find_map(|key| params.get(*key).and_then(Value::as_str))
        .and_then(|token| token.parse().ok())
        .unwrap_or(0)
}

/// Describe every requested ARN as an active cluster named after the ARN suffix
fn describe_clusters(params: &Value) -> Value {
    let clusters: Vec<Value> = params["clusters"]
        .as_array()
        .map(|arns| {
            arns.iter()
                .filter_map(Value::as_str)
                .map(|arn| {
                    json!({
                        "clusterArn": arn,
                        "clusterName": arn.rsplit('/').next().unwrap_or(arn),
                        "status": "ACTIVE",
                        "activeServicesCount": 2,
                        "runningTasksCount": 4,
                        "pendingTasksCount": 0,
                        "registeredContainerInstancesCount": 1
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    json!({ "clusters": clusters })
}

#[async_trait]
impl SdkDispatch for FakeDispatch {
    async fn invoke(
        &self,
        service: &str,
        method: &str,
        region: &str,
        params: &Value,
    ) -> Result<Value> {
        self.calls.lock().unwrap().push(Call {
            service: service.to_string(),
            method: method.to_string(),
            region: region.to_string(),
            params: params.clone(),
        });

        if self.is_failing(service, method, region) {
            anyhow::bail!(
                "{}:{} failed: AccessDeniedException: not authorized in {}",
                service,
                method,
                region
            );
        }

        if service == "ecs" && method == "describe_clusters" {
            return Ok(describe_clusters(params));
        }

        Ok(self
            .pages_for(service, method, region)
            .and_then(|pages| pages.get(page_index(params)))
            .cloned()
            .unwrap_or_else(|| json!({})))
    }
}

/// Split `items` into pages under `items_key`, linking them with numeric tokens
pub fn paged(items_key: &str, token_key: &str, chunks: Vec<Vec<Value>>) -> Vec<Value> {
    let last = chunks.len().saturating_sub(1);
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            let mut page = serde_json::Map::new();
            page.insert(items_key.to_string(), Value::Array(chunk));
            if i < last {
                page.insert(token_key.to_string(), Value::String((i + 1).to_string()));
            }
            Value::Object(page)
        })
        .collect()
}

pub fn metric(namespace: &str, name: &str) -> Value {
    json!({ "Namespace": namespace, "MetricName": name })
}

pub fn instance(id: &str, name: Option<&str>) -> Value {
    let tags: Vec<Value> = name
        .map(|n| vec![json!({ "Key": "Name", "Value": n })])
        .unwrap_or_default();
    json!({
        "InstanceId": id,
        "InstanceType": "t3.micro",
        "State": { "Name": "running" },
        "PrivateIpAddress": "10.0.0.10",
        "VpcId": "vpc-0123",
        "LaunchTime": "2024-02-01T08:00:00Z",
        "Tags": tags
    })
}

pub fn database(id: &str) -> Value {
    json!({
        "DBInstanceIdentifier": id,
        "Engine": "postgres",
        "DBInstanceClass": "db.t3.micro",
        "DBInstanceStatus": "available",
        "AllocatedStorage": 20,
        "Endpoint": { "Address": format!("{}.abc.us-east-1.rds.amazonaws.com", id) }
    })
}

pub fn function(name: &str) -> Value {
    json!({
        "FunctionName": name,
        "Runtime": "python3.12",
        "MemorySize": 256,
        "Timeout": 15,
        "LastModified": "2024-04-01T00:00:00.000+0000"
    })
}

pub fn cluster_arn(region: &str, name: &str) -> String {
    format!("arn:aws:ecs:{}:123456789012:cluster/{}", region, name)
}

/// One resource of every kind in `region`
pub fn with_one_of_each(fake: FakeDispatch, region: &str) -> FakeDispatch {
    fake.with_pages(
        "cloudwatch",
        "list_metrics",
        region,
        vec![json!({ "Metrics": [metric("AWS/EC2", "CPUUtilization")] })],
    )
    .with_pages(
        "ec2",
        "describe_instances",
        region,
        vec![json!({ "Reservations": [{ "Instances": [instance("i-0001", Some("web"))] }] })],
    )
    .with_pages(
        "rds",
        "describe_db_instances",
        region,
        vec![json!({ "DBInstances": [database("orders")] })],
    )
    .with_pages(
        "ecs",
        "list_clusters",
        region,
        vec![json!({ "clusterArns": [cluster_arn(region, "apps")] })],
    )
    .with_pages(
        "lambda",
        "list_functions",
        region,
        vec![json!({ "Functions": [function("resize")] })],
    )
}

/// Sheet name and rows (as display strings) of every sheet, in workbook order
pub fn read_workbook(path: &Path) -> Vec<(String, Vec<Vec<String>>)> {
    let mut workbook: Xlsx<_> = open_workbook(path).expect("workbook should open");
    let names = workbook.sheet_names().to_vec();

    names
        .into_iter()
        .map(|name| {
            let range = workbook
                .worksheet_range(&name)
                .expect("sheet should be readable");
            let rows = range
                .rows()
                .map(|row| {
                    row.iter()
                        .map(|cell| match cell {
                            Data::String(s) => s.clone(),
                            Data::Empty => String::new(),
                            other => other.to_string(),
                        })
                        .collect()
                })
                .collect();
            (name, rows)
        })
        .collect()
}
