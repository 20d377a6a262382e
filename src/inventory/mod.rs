//! Inventory collectors
//!
//! One collector per resource kind. Each walks the regions in order, fetches
//! every page for its listing, and converts the raw records into typed rows.
//! A failing region is logged and skipped by [`collect_per_region`]; it never
//! stops the other regions or the other collectors.

pub mod records;

use crate::aws::client::format_aws_error;
use crate::resource::{
    describe_in_batches, fetch_resources, resource_def, str_at, SdkDispatch,
    CLOUDWATCH_NAMESPACES, EC2_INSTANCES, ECS_CLUSTERS, LAMBDA_FUNCTIONS, RDS_INSTANCES,
};
use anyhow::Result;
use records::{ClusterRecord, DatabaseRecord, FunctionRecord, InstanceRecord, NamespaceRecord};
use std::collections::HashSet;
use std::future::Future;

/// A (collector, region) attempt that failed
#[derive(Debug, Clone, PartialEq)]
pub struct RegionFailure {
    pub kind: &'static str,
    pub region: String,
    pub error: String,
}

/// Output of one collector
#[derive(Debug, Clone)]
pub struct Collected<T> {
    pub records: Vec<T>,
    pub failures: Vec<RegionFailure>,
}

impl<T> Default for Collected<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            failures: Vec::new(),
        }
    }
}

/// Run `attempt` once per region, in order, keeping the records of every
/// region that succeeds and logging the ones that fail
pub async fn collect_per_region<'a, T, F, Fut>(
    kind: &'static str,
    regions: &'a [String],
    mut attempt: F,
) -> Collected<T>
where
    F: FnMut(&'a str) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let mut collected = Collected::default();

    for region in regions {
        match attempt(region.as_str()).await {
            Ok(records) => {
                tracing::debug!("{}: {} records in {}", kind, records.len(), region);
                collected.records.extend(records);
            },
            Err(e) => {
                let error = format_aws_error(&e);
                tracing::error!("Error getting {} inventory in {}: {}", kind, region, error);
                collected.failures.push(RegionFailure {
                    kind,
                    region: region.clone(),
                    error,
                });
            },
        }
    }

    collected
}

/// Everything one run collected, one field per report sheet
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    pub namespaces: Vec<NamespaceRecord>,
    pub instances: Vec<InstanceRecord>,
    pub databases: Vec<DatabaseRecord>,
    pub clusters: Vec<ClusterRecord>,
    pub functions: Vec<FunctionRecord>,
    pub failures: Vec<RegionFailure>,
}

impl Inventory {
    fn absorb<T>(&mut self, collected: Collected<T>) -> Vec<T> {
        self.failures.extend(collected.failures);
        collected.records
    }
}

/// Run the five collectors in report order
pub async fn collect_inventory(dispatch: &dyn SdkDispatch, regions: &[String]) -> Inventory {
    let mut inventory = Inventory::default();

    tracing::info!("--- Getting CloudWatch Namespaces ---");
    let namespaces = collect_namespaces(dispatch, regions).await;
    inventory.namespaces = inventory.absorb(namespaces);

    tracing::info!("--- Getting EC2 Inventory ---");
    let instances = collect_instances(dispatch, regions).await;
    inventory.instances = inventory.absorb(instances);

    tracing::info!("--- Getting RDS Inventory ---");
    let databases = collect_databases(dispatch, regions).await;
    inventory.databases = inventory.absorb(databases);

    tracing::info!("--- Getting ECS Inventory ---");
    let clusters = collect_clusters(dispatch, regions).await;
    inventory.clusters = inventory.absorb(clusters);

    tracing::info!("--- Getting Lambda Inventory ---");
    let functions = collect_functions(dispatch, regions).await;
    inventory.functions = inventory.absorb(functions);

    inventory
}

// =============================================================================
// CloudWatch namespaces
// =============================================================================

pub async fn collect_namespaces(
    dispatch: &dyn SdkDispatch,
    regions: &[String],
) -> Collected<NamespaceRecord> {
    tracing::info!("Scanning CloudWatch Namespaces...");
    let collected = collect_per_region("CloudWatch namespace", regions, |region| {
        namespaces_in_region(dispatch, region)
    })
    .await;
    tracing::info!("Found {} namespaces", collected.records.len());
    collected
}

async fn namespaces_in_region(
    dispatch: &dyn SdkDispatch,
    region: &str,
) -> Result<Vec<NamespaceRecord>> {
    let metrics = fetch_resources(CLOUDWATCH_NAMESPACES, dispatch, region).await?;

    let mut seen = HashSet::new();
    Ok(metrics
        .iter()
        .filter_map(|metric| str_at(metric, "Namespace"))
        .filter(|namespace| seen.insert(namespace.to_string()))
        .map(|namespace| NamespaceRecord::new(region, namespace))
        .collect())
}

// =============================================================================
// EC2 instances
// =============================================================================

pub async fn collect_instances(
    dispatch: &dyn SdkDispatch,
    regions: &[String],
) -> Collected<InstanceRecord> {
    tracing::info!("Scanning EC2 Inventory...");
    let collected = collect_per_region("EC2", regions, |region| {
        instances_in_region(dispatch, region)
    })
    .await;
    tracing::info!("Found {} EC2 instances", collected.records.len());
    collected
}

async fn instances_in_region(
    dispatch: &dyn SdkDispatch,
    region: &str,
) -> Result<Vec<InstanceRecord>> {
    let instances = fetch_resources(EC2_INSTANCES, dispatch, region).await?;
    Ok(instances
        .iter()
        .map(|raw| InstanceRecord::from_raw(region, raw))
        .collect())
}

// =============================================================================
// RDS instances
// =============================================================================

pub async fn collect_databases(
    dispatch: &dyn SdkDispatch,
    regions: &[String],
) -> Collected<DatabaseRecord> {
    tracing::info!("Scanning RDS Inventory...");
    let collected = collect_per_region("RDS", regions, |region| {
        databases_in_region(dispatch, region)
    })
    .await;
    tracing::info!("Found {} RDS instances", collected.records.len());
    collected
}

async fn databases_in_region(
    dispatch: &dyn SdkDispatch,
    region: &str,
) -> Result<Vec<DatabaseRecord>> {
    let databases = fetch_resources(RDS_INSTANCES, dispatch, region).await?;
    Ok(databases
        .iter()
        .map(|raw| DatabaseRecord::from_raw(region, raw))
        .collect())
}

// =============================================================================
// ECS clusters
// =============================================================================

pub async fn collect_clusters(
    dispatch: &dyn SdkDispatch,
    regions: &[String],
) -> Collected<ClusterRecord> {
    tracing::info!("Scanning ECS Inventory...");
    let collected = collect_per_region("ECS", regions, |region| {
        clusters_in_region(dispatch, region)
    })
    .await;
    tracing::info!("Found {} ECS clusters", collected.records.len());
    collected
}

async fn clusters_in_region(
    dispatch: &dyn SdkDispatch,
    region: &str,
) -> Result<Vec<ClusterRecord>> {
    let cluster_arns: Vec<String> = fetch_resources(ECS_CLUSTERS, dispatch, region)
        .await?
        .iter()
        .filter_map(|arn| arn.as_str().map(|s| s.to_string()))
        .collect();

    if cluster_arns.is_empty() {
        return Ok(Vec::new());
    }

    let clusters =
        describe_in_batches(resource_def(ECS_CLUSTERS)?, dispatch, region, &cluster_arns).await?;

    Ok(clusters
        .iter()
        .map(|raw| ClusterRecord::from_raw(region, raw))
        .collect())
}

// =============================================================================
// Lambda functions
// =============================================================================

pub async fn collect_functions(
    dispatch: &dyn SdkDispatch,
    regions: &[String],
) -> Collected<FunctionRecord> {
    tracing::info!("Scanning Lambda Inventory...");
    let collected = collect_per_region("Lambda", regions, |region| {
        functions_in_region(dispatch, region)
    })
    .await;
    tracing::info!("Found {} Lambda functions", collected.records.len());
    collected
}

async fn functions_in_region(
    dispatch: &dyn SdkDispatch,
    region: &str,
) -> Result<Vec<FunctionRecord>> {
    let functions = fetch_resources(LAMBDA_FUNCTIONS, dispatch, region).await?;
    Ok(functions
        .iter()
        .map(|raw| FunctionRecord::from_raw(region, raw))
        .collect())
}
